use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use apiclient::{
	ClientFactory, DefaultTarget, ElementKind, JsonDecoder, JsonObserverDecoder, Observer, TokioExecutor,
};
use apiclient_contract::{
	ArgValue, ClassifiedError, ConfigKey, DeclaredReturn, FeignError, OperationDescriptor, Options, ParamDescriptor, ParamRole, RetryableError, SyncOutcome, Transport, TransportError, Verb,
};
use apiclient_wire::{OrderedParams, Request, Response};

struct FakeTransport {
	calls: AtomicU32,
	body: &'static [u8],
	first_call_fails: bool,
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
	async fn execute(&self, request: Request, _options: &Options) -> Result<Response, TransportError> {
		let call = self.calls.fetch_add(1, Ordering::SeqCst);
		if self.first_call_fails && call == 0 {
			return Err(TransportError::Retryable(RetryableError::new("connection reset")));
		}
		assert_eq!(request.method, "GET");
		Ok(Response {
			status: 200,
			reason: "OK".into(),
			headers: OrderedParams::new(),
			body: Some(bytes::Bytes::from_static(self.body)),
		})
	}
}

fn contributors_op() -> OperationDescriptor {
	OperationDescriptor::new("GitHub", "contributors")
		.verb(Verb::Get)
		.path("/repos/{owner}/{repo}/contributors")
		.param(ParamDescriptor::new(ParamRole::Path("owner".into()), "String"))
		.param(ParamDescriptor::new(ParamRole::Path("repo".into()), "String"))
		.returns(DeclaredReturn::Value("Value".into()))
}

#[tokio::test]
async fn dispatcher_binds_executes_and_decodes_a_sync_operation() {
	let transport = Arc::new(FakeTransport { calls: AtomicU32::new(0), body: br#"[{"login":"denominator"}]"#, first_call_fails: false });
	let executor = Arc::new(TokioExecutor::new());
	let mut factory = ClientFactory::new(transport.clone(), executor);
	factory.decoders = factory.decoders.for_interface("GitHub", Arc::new(JsonDecoder));

	let target = Arc::new(DefaultTarget::new("https://api.github.com"));
	let dispatcher = factory.new_instance("GitHub", target, vec![contributors_op()]).unwrap();

	let config_key = ConfigKey::new("GitHub", "contributors", &["String", "String"]);
	let argv = vec![ArgValue::from("openfeign"), ArgValue::from("feign")];
	let outcome = dispatcher.invoke_sync(&config_key, argv).await.unwrap();

	let SyncOutcome::Value(value) = outcome else {
		panic!("expected a decoded value");
	};
	let json = value.downcast::<serde_json::Value>().unwrap();
	assert_eq!(json[0]["login"], "denominator");
	assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

	dispatcher.close().await;
}

#[tokio::test]
async fn dispatcher_retries_a_transport_level_failure_then_succeeds() {
	let transport = Arc::new(FakeTransport { calls: AtomicU32::new(0), body: br#"[]"#, first_call_fails: true });
	let executor = Arc::new(TokioExecutor::new());
	let mut factory = ClientFactory::new(transport.clone(), executor);
	factory.decoders = factory.decoders.for_interface("GitHub", Arc::new(JsonDecoder));
	factory.retry_policy.initial_interval = std::time::Duration::from_millis(1);

	let target = Arc::new(DefaultTarget::new("https://api.github.com"));
	let dispatcher = factory.new_instance("GitHub", target, vec![contributors_op()]).unwrap();

	let config_key = ConfigKey::new("GitHub", "contributors", &["String", "String"]);
	let argv = vec![ArgValue::from("openfeign"), ArgValue::from("feign")];
	let outcome = dispatcher.invoke_sync(&config_key, argv).await.unwrap();

	assert!(matches!(outcome, SyncOutcome::Value(_)));
	assert_eq!(transport.calls.load(Ordering::SeqCst), 2);

	dispatcher.close().await;
}

struct CollectingObserver {
	items: Arc<std::sync::Mutex<Vec<String>>>,
	done: Option<tokio::sync::oneshot::Sender<()>>,
}

impl Observer<Box<dyn Any + Send>, FeignError> for CollectingObserver {
	fn on_next(&mut self, item: Box<dyn Any + Send>) {
		if let Ok(value) = item.downcast::<serde_json::Value>() {
			self.items.lock().unwrap().push(value.to_string());
		}
	}

	fn on_success(&mut self) {
		if let Some(done) = self.done.take() {
			let _ = done.send(());
		}
	}

	fn on_failure(&mut self, _error: FeignError) {
		if let Some(done) = self.done.take() {
			let _ = done.send(());
		}
	}
}

#[tokio::test]
async fn dispatcher_streams_elements_through_an_observer() {
	let transport = Arc::new(FakeTransport { calls: AtomicU32::new(0), body: br#"["a","b","c"]"#, first_call_fails: false });
	let executor = Arc::new(TokioExecutor::new());
	let mut factory = ClientFactory::new(transport, executor);
	factory.observer_decoders = factory.observer_decoders.for_interface("Lines", Arc::new(JsonObserverDecoder));

	let op = OperationDescriptor::new("Lines", "stream")
		.verb(Verb::Get)
		.path("/lines")
		.param(ParamDescriptor::new(ParamRole::Observer, "Observer<List<String>>"))
		.returns(DeclaredReturn::Void)
		.element_kind(ElementKind::new("List<String>"));

	let target = Arc::new(DefaultTarget::new("https://example.test"));
	let dispatcher = factory.new_instance("Lines", target, vec![op]).unwrap();

	let items = Arc::new(std::sync::Mutex::new(Vec::new()));
	let (tx, rx) = tokio::sync::oneshot::channel();
	let config_key = ConfigKey::new("Lines", "stream", &[]);
	dispatcher
		.invoke_streaming(&config_key, vec![], Box::new(CollectingObserver { items: items.clone(), done: Some(tx) }))
		.unwrap();

	let _ = rx.await;
	dispatcher.close().await;

	assert_eq!(*items.lock().unwrap(), vec!["\"a\"", "\"b\"", "\"c\""]);
}

struct RejectingErrorDecoder;
impl apiclient_contract::ErrorDecoder for RejectingErrorDecoder {
	fn decode(&self, _config_key: &str, response: &Response) -> ClassifiedError {
		ClassifiedError::Terminal(FeignError::Status { status: response.status, method: String::new(), url: String::new(), message: "rejected".into() })
	}
}

struct AlwaysErrorTransport;
#[async_trait::async_trait]
impl Transport for AlwaysErrorTransport {
	async fn execute(&self, _request: Request, _options: &Options) -> Result<Response, TransportError> {
		Ok(Response { status: 500, reason: "Internal Server Error".into(), headers: OrderedParams::new(), body: Some(bytes::Bytes::from_static(b"boom")) })
	}
}

#[tokio::test]
async fn a_terminal_error_decoder_short_circuits_without_decoding() {
	let transport = Arc::new(AlwaysErrorTransport);
	let executor = Arc::new(TokioExecutor::new());
	let mut factory = ClientFactory::new(transport, executor);
	factory.decoders = factory.decoders.for_interface("GitHub", Arc::new(JsonDecoder));
	factory.error_decoders = factory.error_decoders.for_interface("GitHub", Arc::new(RejectingErrorDecoder));

	let target = Arc::new(DefaultTarget::new("https://api.github.com"));
	let dispatcher = factory.new_instance("GitHub", target, vec![contributors_op()]).unwrap();

	let config_key = ConfigKey::new("GitHub", "contributors", &["String", "String"]);
	let argv = vec![ArgValue::from("openfeign"), ArgValue::from("feign")];
	let err = dispatcher.invoke_sync(&config_key, argv).await.unwrap_err();

	assert!(matches!(err, FeignError::Status { status: 500, .. }));
	dispatcher.close().await;
}

struct BodyReadFailureTransport {
	calls: AtomicU32,
}
#[async_trait::async_trait]
impl Transport for BodyReadFailureTransport {
	async fn execute(&self, request: Request, _options: &Options) -> Result<Response, TransportError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let io_err = std::io::Error::other("connection reset while reading body");
		Err(TransportError::Terminal(FeignError::ErrorReading { method: request.method, url: request.url, source: Box::new(io_err) }))
	}
}

#[tokio::test]
async fn a_body_read_failure_is_terminal_not_retried() {
	let transport = Arc::new(BodyReadFailureTransport { calls: AtomicU32::new(0) });
	let executor = Arc::new(TokioExecutor::new());
	let mut factory = ClientFactory::new(transport.clone(), executor);
	factory.decoders = factory.decoders.for_interface("GitHub", Arc::new(JsonDecoder));

	let target = Arc::new(DefaultTarget::new("https://api.github.com"));
	let dispatcher = factory.new_instance("GitHub", target, vec![contributors_op()]).unwrap();

	let config_key = ConfigKey::new("GitHub", "contributors", &["String", "String"]);
	let argv = vec![ArgValue::from("openfeign"), ArgValue::from("feign")];
	let err = dispatcher.invoke_sync(&config_key, argv).await.unwrap_err();

	assert!(matches!(err, FeignError::ErrorReading { .. }));
	assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
	dispatcher.close().await;
}
