//! `GitHub#contributors(String,String)` — a two-path-parameter GET operation,
//! wired end to end: contract -> binder -> target -> transport -> decoder.

use std::sync::Arc;

use apiclient::{ClientFactory, DefaultTarget, JsonDecoder, ReqwestTransport, TokioExecutor};
use apiclient_contract::{ArgValue, DeclaredReturn, OperationDescriptor, ParamDescriptor, ParamRole, Verb};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber_init();

	let transport = Arc::new(ReqwestTransport::default());
	let executor = Arc::new(TokioExecutor::new());
	let mut factory = ClientFactory::new(transport, executor);
	factory.decoders = factory.decoders.for_interface("GitHub", Arc::new(JsonDecoder));

	let op = OperationDescriptor::new("GitHub", "contributors")
		.verb(Verb::Get)
		.path("/repos/{owner}/{repo}/contributors")
		.param(ParamDescriptor::new(ParamRole::Path("owner".into()), "String"))
		.param(ParamDescriptor::new(ParamRole::Path("repo".into()), "String"))
		.returns(DeclaredReturn::Value("Value".into()));

	let target = Arc::new(DefaultTarget::new("https://api.github.com"));
	let dispatcher = factory.new_instance("GitHub", target, vec![op])?;

	let config_key = apiclient_contract::ConfigKey::new("GitHub", "contributors", &["String", "String"]);
	let argv = vec![ArgValue::from("openfeign"), ArgValue::from("feign")];
	let outcome = dispatcher.invoke_sync(&config_key, argv).await?;

	if let apiclient_contract::SyncOutcome::Value(value) = outcome {
		if let Ok(json) = value.downcast::<serde_json::Value>() {
			println!("{json}");
		}
	}

	dispatcher.close().await;
	Ok(())
}

fn tracing_subscriber_init() {
	// demos keep logging minimal; a real binary would install a subscriber here.
}
