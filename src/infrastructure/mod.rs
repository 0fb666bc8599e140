//! Adapters behind the domain ports, plus the shared rule store.

pub mod descriptions;
pub mod in_memory;
pub mod rule_store;
