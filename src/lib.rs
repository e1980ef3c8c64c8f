//! # golinks
//!
//! Shared short links ("go links") with co-owners, tags and click tracking,
//! stored on PostgreSQL, MySQL or SQLite through one portable code path.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Entities, repository traits, the click
//!   pipeline and ownership rules
//! - **Application Layer** ([`application`]) - Validation and store facades
//! - **Infrastructure Layer** ([`infrastructure`]) - Dialect adapter, pool,
//!   migrations and SQL repositories
//! - **API Layer** ([`api`]) - Redirect and health handlers
//!
//! ## Features
//!
//! - Case-insensitive slugs with a reserved list
//! - One primary owner per link plus any number of co-owners
//! - Global tag taxonomy keyed by derived slug
//! - Bounded, never-blocking click recording with a graceful drain
//!
//! ## Quick Start
//!
//! ```bash
//! export DATABASE_URL="sqlite://golinks.db?mode=rwc"
//! export IP_HASH_SECRET="change-me"
//!
//! # Migrations run at startup
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::{AppError, StoreError};
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{LinkService, TagService, UserService};
    pub use crate::domain::entities::{Link, LinkOwner, Role, Tag, User, UserLogin};
    pub use crate::error::{AppError, StoreError};
    pub use crate::infrastructure::database::{Database, Dialect};
    pub use crate::state::AppState;
}
