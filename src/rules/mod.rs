//! The two rule families built on [`crate::table`].

pub mod client_action;
pub mod service_error;

pub use client_action::{ClientActionMatch, ClientActionQuery, ClientActionRules};
pub use service_error::{ErrorResourceAction, ServiceErrorMatch, ServiceErrorQuery, ServiceErrorRules};
