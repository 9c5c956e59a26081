//! Aggregate root contract.

use common::AggregateId;

use crate::event::{DomainEvent, DomainEventEnvelope, Version};

/// Trait for event-sourced aggregate roots.
///
/// A root owns one state instance and one command surface. Business methods
/// never mutate state directly; they record an event (stamping its version
/// and appending its envelope to the pending list) and immediately apply it,
/// so that replaying the recorded events against a fresh state reconstructs
/// identical state.
pub trait AggregateRoot: Send + Sync {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate type name, used for envelope metadata.
    fn aggregate_type() -> &'static str
    where
        Self: Sized;

    /// Returns the aggregate's unique identifier.
    ///
    /// Returns None for a new, uninitialized aggregate.
    fn id(&self) -> Option<AggregateId>;

    /// Returns the current version of the aggregate.
    ///
    /// Version starts at 0 and increments with each recorded event.
    fn version(&self) -> Version;

    /// Returns the events recorded since the last clear, in order.
    ///
    /// The unit of work snapshots this list; it is never mutated by readers.
    fn pending_events(&self) -> &[DomainEventEnvelope];

    /// Empties the pending list once the events have been dispatched.
    fn clear_pending_events(&mut self);

    /// Applies an event to the aggregate, updating its state.
    ///
    /// This method must be pure and deterministic:
    /// - Given the same state and event, it must always produce the same new state
    /// - It must not have side effects
    /// - It must not fail (events represent facts that have happened)
    fn apply(&mut self, event: Self::Event);

    /// Applies a sequence of events, e.g. when replaying history.
    fn replay(&mut self, events: impl IntoIterator<Item = Self::Event>)
    where
        Self: Sized,
    {
        for event in events {
            self.apply(event);
        }
    }
}
