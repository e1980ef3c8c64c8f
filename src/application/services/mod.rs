//! Business logic services for the application layer.

pub mod link_service;
pub mod tag_service;
pub mod user_service;

pub use link_service::LinkService;
pub use tag_service::TagService;
pub use user_service::UserService;
