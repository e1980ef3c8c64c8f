//! Repository trait definitions for the domain layer.
//!
//! These traits are the seams between the domain and the SQL
//! implementations in `crate::infrastructure::persistence`. Mock
//! implementations are generated with `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Links, owners and tag sets
//! - [`TagRepository`] - Tag taxonomy
//! - [`UserRepository`] - Login upserts
//! - [`ClickRepository`] - Click event persistence
//! - [`OwnershipRepository`] - Ownership lookups for authorization
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod click_repository;
pub mod link_repository;
pub mod ownership_repository;
pub mod tag_repository;
pub mod user_repository;

pub use click_repository::ClickRepository;
pub use link_repository::LinkRepository;
pub use ownership_repository::OwnershipRepository;
pub use tag_repository::TagRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use ownership_repository::MockOwnershipRepository;
#[cfg(test)]
pub use tag_repository::MockTagRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
