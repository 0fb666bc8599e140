//! Configuration-driven decisions for payment-instrument lifecycles.
//!
//! Two rule files decide, for a payment instrument, which follow-up action a
//! client is given ([`rules::client_action`]) and how a downstream service
//! error is presented ([`rules::service_error`]). Both are built on the
//! generic table engine in [`table`] and served by
//! [`application::engine::LifecycleEngine`].

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod rules;
pub mod table;

pub use application::engine::{ClientActionOutcome, Collaborators, LifecycleEngine};
pub use config::Settings;
pub use error::{ConfigError, ConfigResult, ResolveError, ResolveResult};
