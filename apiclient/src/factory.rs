use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use apiclient_contract::{
	ArgValue, BodyEncoder, ConfigKey, Contract, Decoder, ErrorDecoder, Executor, FeignError, FormEncoder, MethodHandler, ObserverDecoder, OperationDescriptor, Options, RetryPolicy, StandardContract,
	SyncOutcome, Transport, Wire,
};
use apiclient_wire::{Observer, Target};
use dashmap::DashMap;

use crate::codec::DefaultErrorDecoder;

/// Exact-`configKey`-match-then-`interfaceType`-fallback lookup: a plain
/// builder that accepts maps keyed by configKey and a fallback keyed by
/// interfaceType.
pub struct CollaboratorRegistry<T: ?Sized> {
	by_config_key: HashMap<ConfigKey, Arc<T>>,
	by_interface: HashMap<String, Arc<T>>,
}

impl<T: ?Sized> Default for CollaboratorRegistry<T> {
	fn default() -> Self {
		Self { by_config_key: HashMap::new(), by_interface: HashMap::new() }
	}
}

impl<T: ?Sized> CollaboratorRegistry<T> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn for_operation(mut self, key: ConfigKey, value: Arc<T>) -> Self {
		self.by_config_key.insert(key, value);
		self
	}

	pub fn for_interface(mut self, interface_name: impl Into<String>, value: Arc<T>) -> Self {
		self.by_interface.insert(interface_name.into(), value);
		self
	}

	fn resolve(&self, key: &ConfigKey, interface_name: &str) -> Option<Arc<T>> {
		self.by_config_key.get(key).or_else(|| self.by_interface.get(interface_name)).cloned()
	}
}

/// Fatal error raised while building a dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
	#[error(transparent)]
	Contract(#[from] apiclient_contract::ContractError),
	#[error("no Decoder registered for operation {0}")]
	NoDecoderForOperation(ConfigKey),
	#[error("no ObserverDecoder registered for observer-typed operation {0}")]
	NoObserverDecoderForOperation(ConfigKey),
}

/// Builds a [`Dispatcher`] from a described interface.
///
/// Grounded on `v_exchanges_adapters::Client`'s pattern of holding one
/// configuration struct per concern and exposing typed accessors, here
/// generalized to collaborator registries keyed by `configKey`/interface.
pub struct ClientFactory {
	pub contract: Arc<dyn Contract>,
	pub body_encoders: CollaboratorRegistry<dyn BodyEncoder>,
	pub form_encoders: CollaboratorRegistry<dyn FormEncoder>,
	pub decoders: CollaboratorRegistry<dyn Decoder>,
	pub observer_decoders: CollaboratorRegistry<dyn ObserverDecoder>,
	pub error_decoders: CollaboratorRegistry<dyn ErrorDecoder>,
	pub options: CollaboratorRegistry<Options>,
	pub wire: Arc<dyn Wire>,
	pub transport: Arc<dyn Transport>,
	pub executor: Arc<dyn Executor>,
	pub retry_policy: RetryPolicy,
}

impl ClientFactory {
	pub fn new(transport: Arc<dyn Transport>, executor: Arc<dyn Executor>) -> Self {
		Self {
			contract: Arc::new(StandardContract),
			body_encoders: CollaboratorRegistry::new(),
			form_encoders: CollaboratorRegistry::new(),
			decoders: CollaboratorRegistry::new(),
			observer_decoders: CollaboratorRegistry::new(),
			error_decoders: CollaboratorRegistry::new(),
			options: CollaboratorRegistry::new(),
			wire: Arc::new(apiclient_contract::NoopWire),
			transport,
			executor,
			retry_policy: RetryPolicy::default(),
		}
	}

	/// Parses every operation, selects collaborators, instantiates the
	/// right handler variant, and returns a dispatcher.
	pub fn new_instance(&self, interface_name: &str, target: Arc<dyn Target>, operations: Vec<OperationDescriptor>) -> Result<Dispatcher, FactoryError> {
		let handlers = DashMap::new();

		for op in operations {
			let metadata = self.contract.parse(&op)?;
			let config_key = metadata.config_key.clone();

			let body_encoder = self.body_encoders.resolve(&config_key, interface_name);
			let form_encoder = self.form_encoders.resolve(&config_key, interface_name);
			let error_decoder = self.error_decoders.resolve(&config_key, interface_name).unwrap_or_else(|| Arc::new(DefaultErrorDecoder));
			let options = self.options.resolve(&config_key, interface_name).map(|o| (*o).clone()).unwrap_or_default();

			let handler = if metadata.is_streaming() {
				let observer_decoder = self.observer_decoders.resolve(&config_key, interface_name).ok_or_else(|| FactoryError::NoObserverDecoderForOperation(config_key.clone()))?;
				Arc::new(MethodHandler::new_streaming(
					metadata,
					target.clone(),
					self.transport.clone(),
					self.wire.clone(),
					error_decoder,
					body_encoder,
					form_encoder,
					options,
					self.retry_policy.clone(),
					observer_decoder,
					self.executor.clone(),
				))
			} else {
				let decoder = self.decoders.resolve(&config_key, interface_name).ok_or_else(|| FactoryError::NoDecoderForOperation(config_key.clone()))?;
				Arc::new(MethodHandler::new_sync(
					metadata,
					target.clone(),
					self.transport.clone(),
					self.wire.clone(),
					error_decoder,
					body_encoder,
					form_encoder,
					options,
					self.retry_policy.clone(),
					decoder,
				))
			};

			handlers.insert(config_key, handler);
		}

		Ok(Dispatcher { handlers: Arc::new(handlers), closed: Arc::new(AtomicBool::new(false)), executor: self.executor.clone() })
	}
}

/// The live client object: on invocation of operation `m` with `argv`,
/// looks up `handlers[m]` and calls `invoke`. Stateless beyond its handler
/// map — safe to share across threads.
///
/// Backed by [`DashMap`] rather than a plain `HashMap`: many cloned
/// `Dispatcher` handles calling `invoke_sync`/`invoke_streaming`
/// concurrently from different tasks never contend on a single lock the way
/// a `Mutex<HashMap<_>>` would.
#[derive(Clone)]
pub struct Dispatcher {
	handlers: Arc<DashMap<ConfigKey, Arc<MethodHandler>>>,
	closed: Arc<AtomicBool>,
	executor: Arc<dyn Executor>,
}

impl Dispatcher {
	pub async fn invoke_sync(&self, config_key: &ConfigKey, argv: Vec<ArgValue>) -> Result<SyncOutcome, FeignError> {
		let handler = self.handlers.get(config_key).unwrap_or_else(|| panic!("no handler registered for {config_key}")).clone();
		handler.invoke_sync(argv).await
	}

	pub fn invoke_streaming(&self, config_key: &ConfigKey, argv: Vec<ArgValue>, observer: Box<dyn Observer<Box<dyn Any + Send>, FeignError>>) -> Result<(), FeignError> {
		if self.closed.load(Ordering::SeqCst) {
			return Err(FeignError::RuntimeClosed);
		}
		let handler = self.handlers.get(config_key).unwrap_or_else(|| panic!("no handler registered for {config_key}")).clone();
		handler.invoke_streaming(argv, observer)
	}

	/// Idempotent: stops accepting new streaming work and awaits in-flight
	/// tasks.
	pub async fn close(&self) {
		if self.closed.swap(true, Ordering::SeqCst) {
			return;
		}
		self.executor.close().await;
	}
}
