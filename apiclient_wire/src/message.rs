use bytes::Bytes;

use crate::params::OrderedParams;

/// A frozen HTTP request ready to be handed to a transport.
///
/// Produced by [`crate::RequestTemplate::request`] once every placeholder
/// has been resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
	pub method: String,
	pub url: String,
	pub headers: OrderedParams,
	pub body: Option<Bytes>,
}

impl Request {
	pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
		Self {
			method: method.into(),
			url: url.into(),
			headers: OrderedParams::new(),
			body: None,
		}
	}
}

/// An HTTP response as seen by the pipeline, after the body has been fully
/// received and buffered.
#[derive(Clone, Debug)]
pub struct Response {
	pub status: u16,
	pub reason: String,
	pub headers: OrderedParams,
	pub body: Option<Bytes>,
}

impl Response {
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}
