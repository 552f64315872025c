use std::any::Any;
use std::fmt;

/// One positional argument to an operation invocation.
///
/// Rust has no reflection over a caller's argument types, so unlike a
/// dynamically-typed `Object[] argv`, placeholder-bound arguments arrive
/// already stringified — converting to a string happens at the call site,
/// not inside the binder. `Body` carries the raw argument through untouched
/// to a [`crate::collaborators::BodyEncoder`].
pub enum ArgValue {
	Null,
	Str(String),
	Body(Box<dyn Any + Send>),
}

impl ArgValue {
	pub fn as_str(&self) -> Option<&str> {
		match self {
			ArgValue::Str(s) => Some(s),
			_ => None,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, ArgValue::Null)
	}
}

impl fmt::Debug for ArgValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ArgValue::Null => write!(f, "Null"),
			ArgValue::Str(s) => write!(f, "Str({s:?})"),
			ArgValue::Body(_) => write!(f, "Body(..)"),
		}
	}
}

impl From<String> for ArgValue {
	fn from(s: String) -> Self {
		ArgValue::Str(s)
	}
}

impl From<&str> for ArgValue {
	fn from(s: &str) -> Self {
		ArgValue::Str(s.to_string())
	}
}

impl<T: ToString> From<Option<T>> for ArgValue {
	fn from(value: Option<T>) -> Self {
		match value {
			Some(v) => ArgValue::Str(v.to_string()),
			None => ArgValue::Null,
		}
	}
}
