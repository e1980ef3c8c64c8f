//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`Link`] - A slug mapped to a destination, with owners and tags
//! - [`Tag`] - A global label, unique by derived slug
//! - [`User`] - An authenticated person and their [`Role`]
//! - [`Click`] - A persisted redirect event
//!
//! Creation and mutation inputs are separate structs (`NewLink`,
//! `LinkUpdate`, `UserLogin`).

pub mod click;
pub mod link;
pub mod tag;
pub mod user;

pub use click::Click;
pub use link::{Link, LinkOwner, LinkUpdate, NewLink};
pub use tag::{Tag, TagWithCount};
pub use user::{Role, User, UserLogin};
