//! `Lines#stream()` — an observer-typed operation: the dispatcher submits the whole pipeline to its
//! owned executor and returns immediately; results arrive via `on_next`.

use std::any::Any;
use std::sync::Arc;

use apiclient::{ClientFactory, DefaultTarget, ElementKind, JsonObserverDecoder, Observer, ReqwestTransport, TokioExecutor};
use apiclient_contract::{ConfigKey, DeclaredReturn, FeignError, OperationDescriptor, ParamDescriptor, ParamRole, Verb};

struct PrintObserver {
	done: Option<tokio::sync::oneshot::Sender<()>>,
}

impl Observer<Box<dyn Any + Send>, FeignError> for PrintObserver {
	fn on_next(&mut self, item: Box<dyn Any + Send>) {
		if let Ok(value) = item.downcast::<serde_json::Value>() {
			println!("element: {value}");
		}
	}

	fn on_success(&mut self) {
		println!("stream finished");
		if let Some(done) = self.done.take() {
			let _ = done.send(());
		}
	}

	fn on_failure(&mut self, error: FeignError) {
		eprintln!("stream failed: {error}");
		if let Some(done) = self.done.take() {
			let _ = done.send(());
		}
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let transport = Arc::new(ReqwestTransport::default());
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
	let dispatcher = factory.new_instance("Lines", target, vec![op])?;

	let config_key = ConfigKey::new("Lines", "stream", &[]);
	let (tx, rx) = tokio::sync::oneshot::channel();
	dispatcher.invoke_streaming(&config_key, vec![], Box::new(PrintObserver { done: Some(tx) }))?;

	let _ = rx.await;
	dispatcher.close().await;
	Ok(())
}
