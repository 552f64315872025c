//! Facade: wires the contract-parsing pipeline to a real transport and
//! codecs, and owns the scheduling model for streaming operations.
//!
//! Re-exports the pieces a caller building a dispatcher needs without
//! reaching into `apiclient_contract`/`apiclient_wire` directly.

pub mod codec;
pub mod executor;
pub mod factory;
pub mod transport;

pub use apiclient_contract::{ArgValue, ConfigKey, DeclaredReturn, OperationDescriptor, ParamDescriptor, ParamRole, Verb};
pub use apiclient_wire::{DefaultTarget, ElementKind, Observer};
pub use codec::{DefaultErrorDecoder, JsonBodyEncoder, JsonDecoder, JsonObserverDecoder, TemplateFormEncoder};
pub use executor::TokioExecutor;
pub use factory::{ClientFactory, CollaboratorRegistry, Dispatcher, FactoryError};
pub use transport::ReqwestTransport;
