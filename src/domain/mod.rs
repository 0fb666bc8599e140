//! Data contracts shared with the surrounding service, and the ports through
//! which collaborators are reached.

pub mod instrument;
pub mod ports;
pub mod request;
pub mod service_error;
