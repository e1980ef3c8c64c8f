//! Utility functions shared by the stores and handlers.
//!
//! - [`slug`] - Link slug validation and free-text slug derivation
//! - [`url_normalizer`] - Destination URL validation
//! - [`ip_hash`] - Keyed hashing of client addresses
//! - [`db_error`] - Constraint-violation classification
//! - [`time`] - Timestamp storage encoding

pub mod db_error;
pub mod ip_hash;
pub mod slug;
pub mod time;
pub mod url_normalizer;
