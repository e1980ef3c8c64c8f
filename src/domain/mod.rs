//! Domain layer containing entities and the rules that sit above storage.
//!
//! # Architecture
//!
//! - [`entities`] - Links, owners, tags, users and clicks
//! - [`repositories`] - Data access trait definitions
//! - [`ownership`] - Primary-owner invariant and authorization checks
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Bounded click queue and its consumer
//!
//! # Click Processing Flow
//!
//! 1. The redirect handler builds a [`click_event::ClickEvent`]
//! 2. [`click_worker::ClickSender::record`] offers it to the queue without waiting
//! 3. The single consumer persists it via [`repositories::ClickRepository`]
//! 4. On shutdown the queue closes and the consumer drains what is left

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod ownership;
pub mod repositories;
