use std::any::Any;
use std::time::Duration;

use apiclient_wire::{Observer, Request, Response, Target};

use crate::{error::RetryableError, metadata::DecodeInto};

/// Per-operation transport timeouts, keyed by `configKey` the same way the
/// teacher's `RequestConfig` overrides are.
#[derive(Clone, Debug)]
pub struct Options {
	pub connect_timeout: Duration,
	pub read_timeout: Duration,
}

impl Default for Options {
	fn default() -> Self {
		Self { connect_timeout: Duration::from_secs(10), read_timeout: Duration::from_secs(60) }
	}
}

/// Executes one request and returns a response, or a classified failure: a
/// [`TransportError::Retryable`] before any response was produced, or a
/// [`TransportError::Terminal`] failure reading an in-flight response —
/// retrying would mean replaying an already-sent request whose effect on the
/// server is unknown, which this runtime never does.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
	async fn execute(&self, request: Request, options: &Options) -> Result<Response, TransportError>;
}

/// The two shapes a [`Transport`] may hand back: a failure before a response
/// was produced (connection refused, TLS handshake failure, a timed-out
/// send) is retryable; a failure reading an already-in-flight response body
/// is terminal.
pub enum TransportError {
	Retryable(RetryableError),
	Terminal(crate::error::FeignError),
}

/// Decodes a response body into the operation's declared return type.
/// `decode_into` names the target type the same way
/// `MethodMetadata::decode_into` does, since this crate has no runtime type
/// to hand the decoder beyond that name.
pub trait Decoder: Send + Sync {
	fn decode(&self, body: &[u8], decode_into: &DecodeInto) -> Result<Box<dyn Any + Send>, DecodeError>;
}

/// Decodes a response body into zero or more elements pushed to `observer`.
pub trait ObserverDecoder: Send + Sync {
	fn decode(&self, body: &[u8], decode_into: &DecodeInto, observer: &mut dyn Observer<Box<dyn Any + Send>, crate::error::FeignError>) -> Result<(), DecodeError>;
}

/// Writes a raw body argument into the template.
pub trait BodyEncoder: Send + Sync {
	fn encode(&self, value: &dyn Any, template: &mut apiclient_wire::RequestTemplate);
}

/// Writes a map of form field values into the template's body template.
pub trait FormEncoder: Send + Sync {
	fn encode(&self, fields: &std::collections::HashMap<String, String>, template: &mut apiclient_wire::RequestTemplate);
}

/// Turns a non-2xx response into an error, optionally retryable.
pub trait ErrorDecoder: Send + Sync {
	fn decode(&self, config_key: &str, response: &Response) -> ClassifiedError;
}

/// The two shapes an [`ErrorDecoder`] may hand back: retry the whole
/// invocation, or fail it terminally.
pub enum ClassifiedError {
	Retryable(RetryableError),
	Terminal(crate::error::FeignError),
}

/// Passive observer of request/response bytes — logging, metrics. May rebuffer the response body; the
/// default implementation does nothing.
pub trait Wire: Send + Sync {
	fn on_request(&self, _target: &dyn Target, _request: &Request) {}
	fn on_response(&self, _target: &dyn Target, response: Response) -> Response {
		response
	}
}

/// A [`Wire`] that does nothing, used when no observation hook is registered.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopWire;

impl Wire for NoopWire {}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
	#[error("{0}")]
	Io(String),
	#[error("{0}")]
	Malformed(String),
}
