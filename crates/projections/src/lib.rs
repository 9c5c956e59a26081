//! Read models for the CQRS query side.
//!
//! Each view is a [`mediator::DomainEventHandler`]: it subscribes to the
//! order event types it cares about, decodes the envelope payload, and
//! updates an in-memory read model. Views are updated after the
//! authoritative state change has been committed, so they are eventually
//! consistent with the write side.

pub mod views;

pub use views::{ActiveOrderSummary, ActiveOrdersView, HistoryEntry, OrderHistoryView};
