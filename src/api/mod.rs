//! HTTP layer in front of the link store.
//!
//! Only the public fast path lives here; management screens are served by
//! a separate front end over the same stores.
//!
//! # Modules
//!
//! - [`dto`] - Response bodies
//! - [`handlers`] - Redirect and health handlers
//! - [`middleware`] - Request tracing and the identity extension
//! - [`routes`] - Route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
