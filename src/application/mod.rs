//! Application layer: the lifecycle engine and the per-family executors.
//!
//! [`engine::LifecycleEngine`] is the entry point. It matches requests
//! against the published rule sets and hands the winning rule to
//! [`client_action::apply`] or [`service_error::apply`].

pub mod client_action;
pub mod engine;
pub mod review;
pub mod service_error;
