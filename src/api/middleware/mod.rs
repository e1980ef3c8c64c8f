//! HTTP middleware and request extensions.

pub mod identity;
pub mod tracing;
