//! Application layer services.
//!
//! Services validate input in memory, then delegate to exactly one
//! repository call. They are generic over the repository traits so unit
//! tests run against `mockall` mocks.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Link store facade
//! - [`services::tag_service::TagService`] - Tag taxonomy
//! - [`services::user_service::UserService`] - Login upserts and lookups
//!
//! [`gauges`] runs the periodic gauge refresh next to the services.

pub mod gauges;
pub mod services;
