//! Wire-level primitives for the declarative HTTP client runtime.
//!
//! This crate has no notion of "operations" or "contracts" — it only knows
//! how to hold an HTTP request together while some of its pieces are still
//! `{name}` placeholders, and how to turn a fully-bound template into a
//! concrete [`Request`]. The layer above ([`apiclient_contract`](https://docs.rs/apiclient_contract))
//! is the one that knows where those placeholders come from.

pub mod element;
pub mod error;
pub mod message;
pub mod observer;
pub mod params;
pub mod target;
pub mod template;

pub use element::ElementKind;
pub use error::{TargetError, TemplateError, UrlError};
pub use message::{Request, Response};
pub use observer::Observer;
pub use params::OrderedParams;
pub use target::{DefaultTarget, Target};
pub use template::{RequestTemplate, find_placeholders};
