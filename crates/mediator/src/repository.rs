//! Aggregate persistence interface and an in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::AggregateId;
use tokio::sync::RwLock;

use crate::aggregate::AggregateRoot;
use crate::error::{AppError, AppResult};

/// Storage-agnostic persistence interface consumed by request handlers.
///
/// The core never assumes a specific storage medium. Handlers call these
/// operations after mutating an aggregate and before (or after) registering
/// it with the unit of work; the only hard requirement is that events are not
/// dispatched before the persistence call they depend on has returned
/// successfully.
#[async_trait]
pub trait Repository<A>: Send + Sync {
    /// Retrieves an aggregate by identifier, or None if it does not exist.
    async fn get(&self, id: AggregateId) -> AppResult<Option<A>>;

    /// Persists a new aggregate.
    async fn add(&self, aggregate: &A) -> AppResult<()>;

    /// Persists changes to an existing aggregate.
    async fn update(&self, aggregate: &A) -> AppResult<()>;

    /// Returns true if an aggregate with the given identifier exists.
    async fn contains(&self, id: AggregateId) -> AppResult<bool>;
}

/// In-memory repository implementation for tests.
///
/// Mirrors the contract a durable implementation would provide, including a
/// stale-version check on update so conflict handling can be exercised
/// without a database.
pub struct InMemoryRepository<A> {
    aggregates: Arc<RwLock<HashMap<AggregateId, A>>>,
}

impl<A> InMemoryRepository<A> {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self {
            aggregates: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of stored aggregates.
    pub async fn len(&self) -> usize {
        self.aggregates.read().await.len()
    }

    /// Returns true if no aggregates are stored.
    pub async fn is_empty(&self) -> bool {
        self.aggregates.read().await.is_empty()
    }
}

impl<A> Default for InMemoryRepository<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for InMemoryRepository<A> {
    fn clone(&self) -> Self {
        Self {
            aggregates: Arc::clone(&self.aggregates),
        }
    }
}

#[async_trait]
impl<A> Repository<A> for InMemoryRepository<A>
where
    A: AggregateRoot + Clone + 'static,
{
    async fn get(&self, id: AggregateId) -> AppResult<Option<A>> {
        Ok(self.aggregates.read().await.get(&id).cloned())
    }

    async fn add(&self, aggregate: &A) -> AppResult<()> {
        let id = identity_of(aggregate)?;
        let mut aggregates = self.aggregates.write().await;
        if aggregates.contains_key(&id) {
            return Err(AppError::conflict(format!(
                "{} {id} already exists",
                A::aggregate_type()
            )));
        }
        aggregates.insert(id, stored_copy(aggregate));
        Ok(())
    }

    async fn update(&self, aggregate: &A) -> AppResult<()> {
        let id = identity_of(aggregate)?;
        let mut aggregates = self.aggregates.write().await;
        let stored = aggregates.get(&id).ok_or_else(|| {
            AppError::not_found(format!("{} {id} does not exist", A::aggregate_type()))
        })?;
        if stored.version() >= aggregate.version() {
            return Err(AppError::conflict(format!(
                "stale update for {} {id}: stored version {} is not older than {}",
                A::aggregate_type(),
                stored.version(),
                aggregate.version()
            )));
        }
        aggregates.insert(id, stored_copy(aggregate));
        Ok(())
    }

    async fn contains(&self, id: AggregateId) -> AppResult<bool> {
        Ok(self.aggregates.read().await.contains_key(&id))
    }
}

fn identity_of<A: AggregateRoot>(aggregate: &A) -> AppResult<AggregateId> {
    aggregate
        .id()
        .ok_or_else(|| AppError::unexpected("cannot store an aggregate without an identity"))
}

/// The stored copy holds durable state only; the pending event buffer
/// belongs to the request scope that produced it.
fn stored_copy<A: AggregateRoot + Clone>(aggregate: &A) -> A {
    let mut copy = aggregate.clone();
    copy.clear_pending_events();
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DomainEvent, DomainEventEnvelope, Version};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct BumpedEvent;

    impl DomainEvent for BumpedEvent {
        fn event_type(&self) -> &'static str {
            "Bumped"
        }
    }

    #[derive(Debug, Clone, Default)]
    struct Gauge {
        id: Option<AggregateId>,
        version: Version,
        pending: Vec<DomainEventEnvelope>,
    }

    impl Gauge {
        fn with_id(id: AggregateId) -> Self {
            Gauge {
                id: Some(id),
                ..Gauge::default()
            }
        }

        fn bump(&mut self) {
            self.version = self.version.next();
            self.pending.push(
                DomainEventEnvelope::record(
                    self.id.unwrap(),
                    Self::aggregate_type(),
                    self.version,
                    &BumpedEvent,
                )
                .unwrap(),
            );
        }
    }

    impl AggregateRoot for Gauge {
        type Event = BumpedEvent;

        fn aggregate_type() -> &'static str {
            "Gauge"
        }

        fn id(&self) -> Option<AggregateId> {
            self.id
        }

        fn version(&self) -> Version {
            self.version
        }

        fn pending_events(&self) -> &[DomainEventEnvelope] {
            &self.pending
        }

        fn clear_pending_events(&mut self) {
            self.pending.clear();
        }

        fn apply(&mut self, _event: Self::Event) {}
    }

    #[tokio::test]
    async fn add_then_get_roundtrips() {
        let repository = InMemoryRepository::new();
        let id = AggregateId::new();
        let mut gauge = Gauge::with_id(id);
        gauge.bump();

        repository.add(&gauge).await.unwrap();

        assert!(repository.contains(id).await.unwrap());
        let loaded: Gauge = repository.get(id).await.unwrap().unwrap();
        assert_eq!(loaded.version(), Version::first());
    }

    #[tokio::test]
    async fn stored_copy_drops_the_pending_buffer() {
        let repository = InMemoryRepository::new();
        let id = AggregateId::new();
        let mut gauge = Gauge::with_id(id);
        gauge.bump();

        repository.add(&gauge).await.unwrap();

        let loaded: Gauge = repository.get(id).await.unwrap().unwrap();
        assert!(loaded.pending_events().is_empty());
    }

    #[tokio::test]
    async fn adding_twice_is_a_conflict() {
        let repository = InMemoryRepository::new();
        let mut gauge = Gauge::with_id(AggregateId::new());
        gauge.bump();

        repository.add(&gauge).await.unwrap();
        let error = repository.add(&gauge).await.unwrap_err();
        assert_eq!(error.kind(), "conflict");
    }

    #[tokio::test]
    async fn updating_a_missing_aggregate_is_not_found() {
        let repository = InMemoryRepository::<Gauge>::new();
        let mut gauge = Gauge::with_id(AggregateId::new());
        gauge.bump();

        let error = repository.update(&gauge).await.unwrap_err();
        assert_eq!(error.kind(), "not_found");
    }

    #[tokio::test]
    async fn stale_update_is_a_conflict() {
        let repository = InMemoryRepository::new();
        let id = AggregateId::new();
        let mut gauge = Gauge::with_id(id);
        gauge.bump();
        repository.add(&gauge).await.unwrap();

        // Two scopes load the same version and race; the second write loses.
        let mut winner: Gauge = repository.get(id).await.unwrap().unwrap();
        let mut loser: Gauge = repository.get(id).await.unwrap().unwrap();
        winner.bump();
        loser.bump();

        repository.update(&winner).await.unwrap();
        let error = repository.update(&loser).await.unwrap_err();
        assert_eq!(error.kind(), "conflict");
    }
}
