//! Wire types for both sides of the gateway

pub mod canonical;
pub mod provider;
