use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use apiclient_wire::{Observer, Request, RequestTemplate, Response, Target};
use tracing::{debug, instrument, warn};

use crate::{
	binder::ArgumentBinder,
	collaborators::{BodyEncoder, ClassifiedError, Decoder, DecodeError, ErrorDecoder, FormEncoder, ObserverDecoder, Options, Transport, TransportError, Wire},
	error::{FeignError, RetryableError},
	metadata::{DecodeInto, MethodMetadata},
	retry::{RetryPolicy, Retryer},
	value::ArgValue,
};

/// Accepts a submitted streaming task. The concrete thread-pool-backed
/// implementation lives in the facade crate,
/// which owns process-wide scheduling concerns this crate has no business
/// knowing about.
#[async_trait::async_trait]
pub trait Executor: Send + Sync {
	fn submit(&self, task: Pin<Box<dyn Future<Output = ()> + Send>>);

	/// Stops accepting new streaming work; in-flight tasks run to completion.
	async fn close(&self);
}

/// The synchronous variant's decoded result.
pub enum SyncOutcome {
	Void,
	Response(Response),
	Value(Box<dyn Any + Send>),
}

impl std::fmt::Debug for SyncOutcome {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			SyncOutcome::Void => f.write_str("SyncOutcome::Void"),
			SyncOutcome::Response(response) => f.debug_tuple("SyncOutcome::Response").field(response).finish(),
			SyncOutcome::Value(_) => f.write_str("SyncOutcome::Value(..)"),
		}
	}
}

enum HandlerVariant {
	Sync { decoder: Arc<dyn Decoder> },
	Streaming { observer_decoder: Arc<dyn ObserverDecoder>, executor: Arc<dyn Executor> },
}

/// Orchestrates one operation end to end: bind -> target -> execute ->
/// classify -> decode or observe. Built once per operation by
/// `apiclient::factory::ClientFactory`, shared across every invocation of
/// that operation.
pub struct MethodHandler {
	metadata: MethodMetadata,
	target: Arc<dyn Target>,
	transport: Arc<dyn Transport>,
	wire: Arc<dyn Wire>,
	error_decoder: Arc<dyn ErrorDecoder>,
	body_encoder: Option<Arc<dyn BodyEncoder>>,
	form_encoder: Option<Arc<dyn FormEncoder>>,
	options: Options,
	retry_policy: RetryPolicy,
	variant: HandlerVariant,
}

impl MethodHandler {
	#[allow(clippy::too_many_arguments)]
	pub fn new_sync(
		metadata: MethodMetadata,
		target: Arc<dyn Target>,
		transport: Arc<dyn Transport>,
		wire: Arc<dyn Wire>,
		error_decoder: Arc<dyn ErrorDecoder>,
		body_encoder: Option<Arc<dyn BodyEncoder>>,
		form_encoder: Option<Arc<dyn FormEncoder>>,
		options: Options,
		retry_policy: RetryPolicy,
		decoder: Arc<dyn Decoder>,
	) -> Self {
		Self { metadata, target, transport, wire, error_decoder, body_encoder, form_encoder, options, retry_policy, variant: HandlerVariant::Sync { decoder } }
	}

	#[allow(clippy::too_many_arguments)]
	pub fn new_streaming(
		metadata: MethodMetadata,
		target: Arc<dyn Target>,
		transport: Arc<dyn Transport>,
		wire: Arc<dyn Wire>,
		error_decoder: Arc<dyn ErrorDecoder>,
		body_encoder: Option<Arc<dyn BodyEncoder>>,
		form_encoder: Option<Arc<dyn FormEncoder>>,
		options: Options,
		retry_policy: RetryPolicy,
		observer_decoder: Arc<dyn ObserverDecoder>,
		executor: Arc<dyn Executor>,
	) -> Self {
		Self {
			metadata,
			target,
			transport,
			wire,
			error_decoder,
			body_encoder,
			form_encoder,
			options,
			retry_policy,
			variant: HandlerVariant::Streaming { observer_decoder, executor },
		}
	}

	pub fn metadata(&self) -> &MethodMetadata {
		&self.metadata
	}

	pub fn is_streaming(&self) -> bool {
		matches!(self.variant, HandlerVariant::Streaming { .. })
	}

	/// Runs the synchronous pipeline and decodes the result. Panics if called
	/// on a handler built with `new_streaming` — `apiclient::factory` never
	/// does this, since it selects the variant from `metadata.is_streaming()`
	/// at construction.
	#[instrument(skip_all, fields(config_key = %self.metadata.config_key))]
	pub async fn invoke_sync(&self, argv: Vec<ArgValue>) -> Result<SyncOutcome, FeignError> {
		let HandlerVariant::Sync { decoder } = &self.variant else {
			panic!("invoke_sync called on a streaming MethodHandler");
		};

		let template = ArgumentBinder::bind(&self.metadata, &argv, self.body_encoder.as_deref(), self.form_encoder.as_deref())?;
		let (method, url, response) = run_pipeline(&self.metadata, self.target.as_ref(), self.transport.as_ref(), self.wire.as_ref(), self.error_decoder.as_ref(), &self.options, self.retry_policy.clone(), template).await?;

		match &self.metadata.decode_into {
			DecodeInto::Response => Ok(SyncOutcome::Response(response)),
			DecodeInto::Void => Ok(SyncOutcome::Void),
			DecodeInto::Value(_) => {
				let body = response.body.clone().unwrap_or_default();
				let value = decoder.decode(&body, &self.metadata.decode_into).map_err(|e| decode_error_to_feign(e, &method, &url))?;
				Ok(SyncOutcome::Value(value))
			}
			DecodeInto::Element(_) => unreachable!("a synchronous handler never carries an Element decode target"),
		}
	}

	/// Submits the whole pipeline to the owned executor and returns
	/// immediately. Failures constructing the request template (argument
	/// binding) are raised synchronously, since they predate entering the
	/// task; everything past that point is delivered through `observer`.
	#[instrument(skip_all, fields(config_key = %self.metadata.config_key))]
	pub fn invoke_streaming(self: &Arc<Self>, argv: Vec<ArgValue>, mut observer: Box<dyn Observer<Box<dyn Any + Send>, FeignError>>) -> Result<(), FeignError> {
		let HandlerVariant::Streaming { observer_decoder, executor } = &self.variant else {
			panic!("invoke_streaming called on a synchronous MethodHandler");
		};

		let template = ArgumentBinder::bind(&self.metadata, &argv, self.body_encoder.as_deref(), self.form_encoder.as_deref())?;

		let handler = Arc::clone(self);
		let observer_decoder = Arc::clone(observer_decoder);
		executor.submit(Box::pin(async move {
			let outcome = handler.run_streaming(template, observer_decoder.as_ref(), observer.as_mut()).await;
			match outcome {
				Ok(()) => observer.on_success(),
				Err(err) => observer.on_failure(err),
			}
		}));
		Ok(())
	}

	async fn run_streaming(&self, template: RequestTemplate, observer_decoder: &dyn ObserverDecoder, observer: &mut dyn Observer<Box<dyn Any + Send>, FeignError>) -> Result<(), FeignError> {
		let (method, url, response) = run_pipeline(&self.metadata, self.target.as_ref(), self.transport.as_ref(), self.wire.as_ref(), self.error_decoder.as_ref(), &self.options, self.retry_policy.clone(), template).await?;

		match &self.metadata.decode_into {
			DecodeInto::Response => {
				observer.on_next(Box::new(response));
				Ok(())
			}
			DecodeInto::Void => Ok(()),
			_ => {
				let body = response.body.clone().unwrap_or_default();
				observer_decoder.decode(&body, &self.metadata.decode_into, observer).map_err(|e| decode_error_to_feign(e, &method, &url))
			}
		}
	}
}

fn decode_error_to_feign(error: DecodeError, method: &str, url: &str) -> FeignError {
	FeignError::ErrorReading { method: method.to_string(), url: url.to_string(), source: Box::new(error) }
}

/// The shared loop: hand a resolved template to `target`, execute, classify
/// the response, retry on transient failure. Returns the method/url of the
/// final attempt alongside the successfully classified response, since
/// callers need both for decode-time error messages.
#[allow(clippy::too_many_arguments)]
async fn run_pipeline(
	metadata: &MethodMetadata,
	target: &dyn Target,
	transport: &dyn Transport,
	wire: &dyn Wire,
	error_decoder: &dyn ErrorDecoder,
	options: &Options,
	retry_policy: RetryPolicy,
	template: RequestTemplate,
) -> Result<(String, String, Response), FeignError> {
	let mut retryer = Retryer::new(retry_policy);
	loop {
		let request: Request = target.apply(template.clone())?;
		wire.on_request(target, &request);
		let method = request.method.clone();
		let url = request.url.clone();
		debug!(method = %method, url = %url, "issuing request");

		let response = match transport.execute(request, options).await {
			Ok(response) => response,
			Err(TransportError::Terminal(err)) => return Err(err),
			Err(TransportError::Retryable(retryable)) => match retryer.continue_or_propagate(retryable).await {
				Ok(()) => continue,
				Err(err) => {
					warn!(method = %method, url = %url, attempts = retryer.attempts_made(), "giving up after exhausting retries");
					return Err(FeignError::ErrorExecuting { method, url, source: Box::new(err) });
				}
			},
		};

		let response = wire.on_response(target, response);
		if response.is_success() {
			return Ok((method, url, response));
		}

		match error_decoder.decode(metadata.config_key.as_str(), &response) {
			ClassifiedError::Terminal(err) => return Err(err),
			ClassifiedError::Retryable(retryable) => match retryer.continue_or_propagate(retryable).await {
				Ok(()) => continue,
				Err(err) => return Err(FeignError::Status { status: response.status, method, url, message: err.message }),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicU32, Ordering};

	use apiclient_wire::DefaultTarget;

	use super::*;
	use crate::{
		collaborators::NoopWire,
		contract::{Contract, StandardContract},
		descriptor::{OperationDescriptor, Verb},
	};

	struct CountingErrorDecoder;
	impl ErrorDecoder for CountingErrorDecoder {
		fn decode(&self, _config_key: &str, response: &Response) -> ClassifiedError {
			ClassifiedError::Terminal(FeignError::Status { status: response.status, method: String::new(), url: String::new(), message: "unexpected status".into() })
		}
	}

	struct FlakyTransport {
		calls: AtomicU32,
	}
	#[async_trait::async_trait]
	impl Transport for FlakyTransport {
		async fn execute(&self, _request: Request, _options: &Options) -> Result<Response, TransportError> {
			let call = self.calls.fetch_add(1, Ordering::SeqCst);
			if call == 0 {
				Err(TransportError::Retryable(RetryableError::new("connection reset")))
			} else {
				Ok(Response { status: 200, reason: "OK".into(), headers: apiclient_wire::OrderedParams::new(), body: None })
			}
		}
	}

	#[tokio::test]
	async fn retries_once_then_succeeds() {
		let op = OperationDescriptor::new("Iface", "ping").verb(Verb::Get).path("/ping");
		let metadata = StandardContract.parse(&op).unwrap();
		let transport = Arc::new(FlakyTransport { calls: AtomicU32::new(0) });
		let handler = MethodHandler::new_sync(
			metadata,
			Arc::new(DefaultTarget::new("http://example.test")),
			transport.clone(),
			Arc::new(NoopWire),
			Arc::new(CountingErrorDecoder),
			None,
			None,
			Options::default(),
			RetryPolicy { initial_interval: std::time::Duration::from_millis(1), ..Default::default() },
			Arc::new(NullDecoder),
		);
		let outcome = handler.invoke_sync(vec![]).await.unwrap();
		assert!(matches!(outcome, SyncOutcome::Void));
		assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
	}

	struct NullDecoder;
	impl Decoder for NullDecoder {
		fn decode(&self, _body: &[u8], _decode_into: &DecodeInto) -> Result<Box<dyn Any + Send>, DecodeError> {
			Ok(Box::new(()))
		}
	}
}
