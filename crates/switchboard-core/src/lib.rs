//! Shared primitives for Switchboard crates

mod error;

pub use error::{HttpError, error_response};
