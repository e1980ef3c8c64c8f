//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`database`] - Dialect adapter, pool construction and migrations
//! - [`persistence`] - SQL repository implementations

pub mod database;
pub mod persistence;
