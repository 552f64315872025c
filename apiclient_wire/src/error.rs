/// Errors raised while turning a base URL string into a [`url::Url`].
///
/// Mirrors the shape of `v_exchanges_api_generics::UrlError` — a thin wrapper
/// around the handful of ways a URL string can fail to parse in this runtime.
#[derive(Debug, thiserror::Error)]
pub enum UrlError {
	#[error("failed to parse URL: {0}")]
	Parse(#[from] url::ParseError),
	#[error("base URL {0:?} has no host; targets require an absolute base URL")]
	MissingHost(String),
}

/// Errors raised by [`crate::RequestTemplate`].
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
	/// A `{name}` placeholder survived to `request()`/`render()` with no bound value.
	#[error("template was not fully resolved; placeholders remaining: {0:?}")]
	TemplateNotFullyResolved(Vec<String>),
	/// Both `body` and `body_template` were set, or neither.
	#[error("exactly one of `body` and `body_template` must be set, got body={has_body} body_template={has_body_template}")]
	AmbiguousBody { has_body: bool, has_body_template: bool },
}

/// Errors raised by a [`crate::Target`] turning a template into a request.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
	#[error(transparent)]
	Template(#[from] TemplateError),
	#[error(transparent)]
	Url(#[from] UrlError),
}
