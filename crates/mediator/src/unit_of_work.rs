//! Request-scoped collection of domain events awaiting dispatch.

use common::AggregateId;
use tokio::sync::Mutex;

use crate::aggregate::AggregateRoot;
use crate::event::DomainEventEnvelope;

/// Tracks the aggregates that raised events during one command execution.
///
/// One unit of work exists per request scope; it is never shared across
/// concurrent requests. It knows nothing about storage — its only job is
/// event bookkeeping for the current logical transaction boundary, so that
/// the dispatch behavior can publish the events exactly once after the
/// persistence call they depend on has succeeded.
#[derive(Debug, Default)]
pub struct UnitOfWork {
    entries: Mutex<Vec<Entry>>,
}

#[derive(Debug)]
struct Entry {
    aggregate_id: AggregateId,
    events: Vec<DomainEventEnvelope>,
}

impl UnitOfWork {
    /// Creates an empty unit of work.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an aggregate that raised events during this scope.
    ///
    /// Registration is idempotent per aggregate: registering the same
    /// aggregate again replaces its collected events with the current
    /// pending snapshot, so no event is collected twice. Registration order
    /// across aggregates is preserved for dispatch.
    pub async fn register_aggregate<A: AggregateRoot>(&self, aggregate: &A) {
        let Some(aggregate_id) = aggregate.id() else {
            debug_assert!(
                aggregate.pending_events().is_empty(),
                "aggregate raised events before acquiring an identity"
            );
            return;
        };

        let snapshot = aggregate.pending_events().to_vec();
        let mut entries = self.entries.lock().await;
        match entries.iter_mut().find(|e| e.aggregate_id == aggregate_id) {
            Some(entry) => entry.events = snapshot,
            None => entries.push(Entry {
                aggregate_id,
                events: snapshot,
            }),
        }
    }

    /// Returns the collected events, flattened in registration order.
    pub async fn domain_events(&self) -> Vec<DomainEventEnvelope> {
        self.entries
            .lock()
            .await
            .iter()
            .flat_map(|entry| entry.events.iter().cloned())
            .collect()
    }

    /// Returns the collected events and clears the scope.
    ///
    /// Called once per request, on success and failure alike, so a retry can
    /// never observe events left over from a previous attempt.
    pub async fn drain(&self) -> Vec<DomainEventEnvelope> {
        let mut entries = self.entries.lock().await;
        let drained = entries
            .iter()
            .flat_map(|entry| entry.events.iter().cloned())
            .collect();
        entries.clear();
        drained
    }

    /// Returns the number of registered aggregates.
    pub async fn registered_aggregates(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns true if no events have been collected.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.iter().all(|e| e.events.is_empty())
    }
}
