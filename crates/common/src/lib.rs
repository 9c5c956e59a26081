//! Shared identifier types used across the ordering system.

mod types;

pub use types::{AggregateId, EventId};
