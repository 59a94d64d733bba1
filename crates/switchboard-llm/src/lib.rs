//! Protocol translation core for Switchboard
//!
//! Accepts canonical Messages-API requests, routes them to an
//! OpenAI-compatible provider, and translates responses and token streams
//! back into the canonical shape.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod convert;
pub mod error;
pub mod headers;
pub mod protocol;
pub mod provider;
pub mod router;
pub mod routing;
pub mod stream;
pub mod validate;

pub use error::{ErrorKind, LlmError};
pub use provider::{ByteStream, Provider, ProviderCapabilities, ProviderRegistry};
pub use router::{LlmState, llm_router};
pub use routing::{ModelRouter, RoutingResult, route};
pub use stream::StreamReframer;
