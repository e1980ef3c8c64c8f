//! SQL repository implementations.
//!
//! Every repository runs over the same `Any` pool and receives the
//! [`Dialect`](crate::infrastructure::database::Dialect) explicitly. Query
//! text is written once with `?` placeholders; engine differences are
//! confined to the dialect helpers.
//!
//! # Repositories
//!
//! - [`SqlLinkRepository`] - Links, ownership rows and tag associations
//! - [`SqlTagRepository`] - Tag taxonomy
//! - [`SqlUserRepository`] - Login upserts
//! - [`SqlClickRepository`] - Click event storage
//! - [`SqlOwnershipRepository`] - Ownership lookups

mod rows;

pub mod sql_click_repository;
pub mod sql_link_repository;
pub mod sql_ownership_repository;
pub mod sql_tag_repository;
pub mod sql_user_repository;

pub use sql_click_repository::SqlClickRepository;
pub use sql_link_repository::SqlLinkRepository;
pub use sql_ownership_repository::SqlOwnershipRepository;
pub use sql_tag_repository::SqlTagRepository;
pub use sql_user_repository::SqlUserRepository;
