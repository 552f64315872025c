use std::collections::HashMap;

use apiclient_wire::{ElementKind, RequestTemplate};

use crate::config_key::ConfigKey;

/// What a response decodes into, once an operation's contract is parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeInto {
	Void,
	/// The raw `Response` sentinel — caller owns the body.
	Response,
	/// A normal decoded return, named by simple type.
	Value(String),
	/// An observer's element type.
	Element(ElementKind),
}

/// Immutable record of one operation's request shape and parameter roles,
/// produced by a [`crate::Contract`] and consumed by [`crate::ArgumentBinder`]
/// and [`crate::handler::MethodHandler`].
#[derive(Clone, Debug)]
pub struct MethodMetadata {
	pub config_key: ConfigKey,
	pub template: RequestTemplate,
	pub url_index: Option<usize>,
	pub observer_index: Option<usize>,
	pub body_index: Option<usize>,
	pub form_params: Vec<String>,
	pub index_to_name: HashMap<usize, Vec<String>>,
	pub decode_into: DecodeInto,
}

impl MethodMetadata {
	/// True once an observer parameter is present — selects the streaming
	/// `MethodHandler` variant at factory construction time.
	pub fn is_streaming(&self) -> bool {
		self.observer_index.is_some()
	}
}
