//! The core invocation pipeline: turning a described operation into a
//! `MethodMetadata`, binding an argument vector into a request, and running
//! the bind -> target -> execute -> classify -> decode/observe loop.
//!
//! This crate knows nothing about any concrete transport, codec, or
//! executor — those are collaborator traits ([`collaborators`]) supplied by
//! the facade crate at dispatcher-construction time.

pub mod binder;
pub mod collaborators;
pub mod config_key;
pub mod contract;
pub mod descriptor;
pub mod error;
pub mod handler;
pub mod metadata;
pub mod retry;
pub mod value;

pub use binder::ArgumentBinder;
pub use collaborators::{BodyEncoder, ClassifiedError, Decoder, DecodeError, ErrorDecoder, FormEncoder, NoopWire, ObserverDecoder, Options, Transport, TransportError, Wire};
pub use config_key::ConfigKey;
pub use contract::{Contract, MethodStyleContract, StandardContract};
pub use descriptor::{DeclaredReturn, OperationDescriptor, ParamDescriptor, ParamRole, Verb};
pub use error::{BindError, ContractError, FeignError, RetryableError};
pub use handler::{Executor, MethodHandler, SyncOutcome};
pub use metadata::{DecodeInto, MethodMetadata};
pub use retry::{RetryPolicy, Retryer};
pub use value::ArgValue;
