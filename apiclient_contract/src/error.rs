use apiclient_wire::{TargetError, TemplateError};

/// A malformed operation description, raised at `newInstance`/contract-parse
/// time — fatal, bubbled straight to the caller building the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
	#[error("operation has zero or more than one verb marker")]
	MissingOrAmbiguousVerb,
	#[error("operation declares an observer parameter but does not return void")]
	ObserverMethodMustReturnVoid,
	#[error("observer parameter must be the last parameter")]
	ObserverMustBeLast,
	#[error("placeholder {{{0}}} does not resolve to a named parameter")]
	UnresolvedPlaceholder(String),
	#[error("urlIndex, observerIndex and bodyIndex must be pairwise distinct")]
	IndicesNotDisjoint,
	#[error("observer parameter present with no element descriptor supplied")]
	MissingElementDescriptor,
}

/// Raised by [`crate::ArgumentBinder::bind`].
#[derive(Debug, thiserror::Error)]
pub enum BindError {
	#[error("operation has a raw body argument but no BodyEncoder was selected for it")]
	MissingBodyEncoder,
	#[error("operation has form parameters but no FormEncoder was selected for it")]
	MissingFormEncoder,
	#[error(transparent)]
	Template(#[from] TemplateError),
}

/// A transient failure the [`crate::Retryer`] may consume and re-drive the
/// pipeline from.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RetryableError {
	pub message: String,
	pub retry_after: Option<std::time::Duration>,
	#[source]
	pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RetryableError {
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into(), retry_after: None, source: None }
	}

	pub fn with_source(message: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
		Self { message: message.into(), retry_after: None, source: Some(Box::new(source)) }
	}

	pub fn retry_after(mut self, after: std::time::Duration) -> Self {
		self.retry_after = Some(after);
		self
	}
}

/// A terminal failure from within the invocation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum FeignError {
	#[error("error executing {method} {url}: {source}")]
	ErrorExecuting { method: String, url: String, #[source] source: Box<dyn std::error::Error + Send + Sync> },
	#[error("{source} {method} {url}")]
	ErrorReading { method: String, url: String, #[source] source: Box<dyn std::error::Error + Send + Sync> },
	#[error("{status} reading {method} {url}: {message}")]
	Status { status: u16, method: String, url: String, message: String },
	#[error(transparent)]
	Bind(#[from] BindError),
	#[error(transparent)]
	Template(#[from] TemplateError),
	#[error("dispatcher is closed")]
	RuntimeClosed,
}

impl From<TargetError> for FeignError {
	fn from(err: TargetError) -> Self {
		match err {
			TargetError::Template(e) => FeignError::Template(e),
			TargetError::Url(e) => FeignError::ErrorExecuting { method: String::new(), url: String::new(), source: Box::new(e) },
		}
	}
}
