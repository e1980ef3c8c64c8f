//! Response bodies serialized with Serde.

pub mod health;
