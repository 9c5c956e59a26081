//! The mediator: single entry point for commands and queries.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use crate::behavior::{Next, PipelineBehavior};
use crate::error::{AppError, AppResult};
use crate::event::DomainEventEnvelope;
use crate::event_handler::DomainEventBus;
use crate::handler::{
    AnyRequest, AnyResponse, CommandHandler, ErasedCommandHandler, ErasedHandler,
    ErasedQueryHandler, QueryHandler,
};
use crate::request::{Command, Query, RequestContext, RequestKind};

struct Registration {
    request_name: &'static str,
    handler: Arc<dyn ErasedHandler>,
}

/// Resolves the handler for a request and invokes it through the ordered
/// chain of pipeline behaviors.
///
/// The mediator holds no per-request state; each execute call creates a fresh
/// request context (and unit of work), so concurrent requests never share a
/// scope. Wiring happens once at process start through [`Mediator::builder`].
pub struct Mediator {
    commands: HashMap<TypeId, Registration>,
    queries: HashMap<TypeId, Registration>,
    behaviors: Vec<Arc<dyn PipelineBehavior>>,
    bus: Arc<DomainEventBus>,
}

impl Mediator {
    pub fn builder() -> MediatorBuilder {
        MediatorBuilder::default()
    }

    /// Executes a command through the behavior chain.
    ///
    /// Fails with an `unexpected` result if no handler is registered for the
    /// command's concrete type.
    pub async fn execute<C: Command>(&self, command: C) -> AppResult<C::Output> {
        let registration = self.commands.get(&TypeId::of::<C>()).ok_or_else(|| {
            AppError::unexpected(format!(
                "no handler registered for command {}",
                type_name::<C>()
            ))
        })?;
        let response = self
            .run(registration, RequestKind::Command, Box::new(command))
            .await?;
        downcast_output::<C::Output>(response)
    }

    /// Executes a query through the behavior chain.
    pub async fn execute_query<Q: Query>(&self, query: Q) -> AppResult<Q::Output> {
        let registration = self.queries.get(&TypeId::of::<Q>()).ok_or_else(|| {
            AppError::unexpected(format!(
                "no handler registered for query {}",
                type_name::<Q>()
            ))
        })?;
        let response = self
            .run(registration, RequestKind::Query, Box::new(query))
            .await?;
        downcast_output::<Q::Output>(response)
    }

    /// Fans one event out to its subscribed handlers.
    pub async fn publish(&self, event: &DomainEventEnvelope) {
        self.bus.publish(event).await;
    }

    /// The bus events are published on.
    pub fn event_bus(&self) -> &Arc<DomainEventBus> {
        &self.bus
    }

    async fn run(
        &self,
        registration: &Registration,
        kind: RequestKind,
        request: AnyRequest,
    ) -> AppResult<AnyResponse> {
        let ctx = RequestContext::new(kind, registration.request_name);
        Next::new(&self.behaviors, registration.handler.as_ref(), request, &ctx)
            .run()
            .await
    }
}

fn downcast_output<T: Send + 'static>(response: AnyResponse) -> AppResult<T> {
    response
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| AppError::unexpected("handler produced a response of an unexpected type"))
}

fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Startup wiring for handlers and behaviors.
///
/// Behaviors wrap in registration order (first registered = outermost). The
/// domain event bus is built separately so that the dispatch behavior and any
/// event handlers can share it.
#[derive(Default)]
pub struct MediatorBuilder {
    commands: HashMap<TypeId, Registration>,
    queries: HashMap<TypeId, Registration>,
    behaviors: Vec<Arc<dyn PipelineBehavior>>,
}

impl MediatorBuilder {
    /// Registers the single handler for command type `C`.
    ///
    /// # Panics
    ///
    /// Panics if a handler for `C` is already registered; duplicate wiring is
    /// a startup programming error, not a runtime condition.
    pub fn command_handler<C, H>(mut self, handler: H) -> Self
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let previous = self.commands.insert(
            TypeId::of::<C>(),
            Registration {
                request_name: short_type_name::<C>(),
                handler: Arc::new(ErasedCommandHandler::new(handler)),
            },
        );
        assert!(
            previous.is_none(),
            "duplicate handler registered for command {}",
            type_name::<C>()
        );
        self
    }

    /// Registers the single handler for query type `Q`.
    ///
    /// # Panics
    ///
    /// Panics if a handler for `Q` is already registered.
    pub fn query_handler<Q, H>(mut self, handler: H) -> Self
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        let previous = self.queries.insert(
            TypeId::of::<Q>(),
            Registration {
                request_name: short_type_name::<Q>(),
                handler: Arc::new(ErasedQueryHandler::new(handler)),
            },
        );
        assert!(
            previous.is_none(),
            "duplicate handler registered for query {}",
            type_name::<Q>()
        );
        self
    }

    /// Appends a behavior; the first behavior added is the outermost wrapper.
    pub fn behavior(mut self, behavior: Arc<dyn PipelineBehavior>) -> Self {
        self.behaviors.push(behavior);
        self
    }

    /// Finalizes the mediator around the given event bus.
    pub fn build(self, bus: Arc<DomainEventBus>) -> Mediator {
        Mediator {
            commands: self.commands,
            queries: self.queries,
            behaviors: self.behaviors,
            bus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregateRoot;
    use crate::behaviors::DomainEventDispatchBehavior;
    use crate::event::{DomainEvent, Version};
    use crate::event_handler::DomainEventHandler;
    use async_trait::async_trait;
    use common::AggregateId;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, OnceLock};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct StockedEvent {
        label: String,
    }

    impl DomainEvent for StockedEvent {
        fn event_type(&self) -> &'static str {
            "Stocked"
        }
    }

    #[derive(Debug, Default, Clone)]
    struct Shelf {
        id: Option<AggregateId>,
        version: Version,
        pending: Vec<DomainEventEnvelope>,
    }

    impl Shelf {
        fn stock(id: AggregateId, label: &str) -> Self {
            let mut shelf = Shelf {
                id: Some(id),
                ..Shelf::default()
            };
            let event = StockedEvent {
                label: label.to_string(),
            };
            shelf.version = shelf.version.next();
            shelf.pending.push(
                DomainEventEnvelope::record(id, Self::aggregate_type(), shelf.version, &event)
                    .unwrap(),
            );
            shelf
        }
    }

    impl AggregateRoot for Shelf {
        type Event = StockedEvent;

        fn aggregate_type() -> &'static str {
            "Shelf"
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

    struct StockShelf {
        label: String,
        fail: bool,
    }

    impl Command for StockShelf {
        type Output = AggregateId;
    }

    struct StockShelfHandler;

    #[async_trait]
    impl CommandHandler<StockShelf> for StockShelfHandler {
        async fn handle(
            &self,
            command: StockShelf,
            ctx: &RequestContext,
        ) -> AppResult<AggregateId> {
            if command.fail {
                return Err(AppError::business_rule("shelf is full"));
            }
            let id = AggregateId::new();
            let shelf = Shelf::stock(id, &command.label);
            ctx.unit_of_work().register_aggregate(&shelf).await;
            Ok(id)
        }
    }

    struct ShelfCount;

    impl Query for ShelfCount {
        type Output = usize;
    }

    struct ShelfCountHandler;

    #[async_trait]
    impl QueryHandler<ShelfCount> for ShelfCountHandler {
        async fn handle(&self, _query: ShelfCount, _ctx: &RequestContext) -> AppResult<usize> {
            Ok(7)
        }
    }

    /// Behavior that records enter/exit markers for ordering assertions.
    struct ProbeBehavior {
        label: &'static str,
        trace: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl PipelineBehavior for ProbeBehavior {
        async fn handle(&self, _ctx: &RequestContext, next: Next<'_>) -> AppResult<AnyResponse> {
            self.trace.lock().unwrap().push(format!("{}:enter", self.label));
            let result = next.run().await;
            self.trace.lock().unwrap().push(format!("{}:exit", self.label));
            result
        }

        fn name(&self) -> &'static str {
            self.label
        }
    }

    struct RecordingHandler {
        published: AtomicUsize,
    }

    #[async_trait]
    impl DomainEventHandler for RecordingHandler {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn subscribed_to(&self) -> &'static [&'static str] {
            &["Stocked"]
        }

        async fn handle(&self, _event: &DomainEventEnvelope) -> AppResult<()> {
            self.published.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn dispatching_mediator(recorder: Arc<RecordingHandler>) -> Mediator {
        let mut bus = DomainEventBus::new();
        bus.subscribe(recorder);
        let bus = Arc::new(bus);
        Mediator::builder()
            .behavior(Arc::new(DomainEventDispatchBehavior::new(Arc::clone(&bus))))
            .command_handler::<StockShelf, _>(StockShelfHandler)
            .query_handler::<ShelfCount, _>(ShelfCountHandler)
            .build(bus)
    }

    #[tokio::test]
    async fn executes_a_registered_command() {
        let mediator = Mediator::builder()
            .command_handler::<StockShelf, _>(StockShelfHandler)
            .build(Arc::new(DomainEventBus::new()));

        let result = mediator
            .execute(StockShelf {
                label: "flour".to_string(),
                fail: false,
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn executes_a_registered_query() {
        let mediator = Mediator::builder()
            .query_handler::<ShelfCount, _>(ShelfCountHandler)
            .build(Arc::new(DomainEventBus::new()));

        let count = mediator.execute_query(ShelfCount).await.unwrap();
        assert_eq!(count, 7);
    }

    #[tokio::test]
    async fn unregistered_request_types_are_rejected() {
        let mediator = Mediator::builder().build(Arc::new(DomainEventBus::new()));

        let error = mediator
            .execute(StockShelf {
                label: "flour".to_string(),
                fail: false,
            })
            .await
            .unwrap_err();
        assert_eq!(error.kind(), "unexpected");

        let error = mediator.execute_query(ShelfCount).await.unwrap_err();
        assert_eq!(error.kind(), "unexpected");
    }

    #[test]
    #[should_panic(expected = "duplicate handler registered")]
    fn duplicate_command_registration_panics() {
        let _ = Mediator::builder()
            .command_handler::<StockShelf, _>(StockShelfHandler)
            .command_handler::<StockShelf, _>(StockShelfHandler);
    }

    #[tokio::test]
    async fn behaviors_nest_in_registration_order() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mediator = Mediator::builder()
            .behavior(Arc::new(ProbeBehavior {
                label: "outer",
                trace: Arc::clone(&trace),
            }))
            .behavior(Arc::new(ProbeBehavior {
                label: "inner",
                trace: Arc::clone(&trace),
            }))
            .query_handler::<ShelfCount, _>(ShelfCountHandler)
            .build(Arc::new(DomainEventBus::new()));

        mediator.execute_query(ShelfCount).await.unwrap();

        let recorded = trace.lock().unwrap().clone();
        assert_eq!(
            recorded,
            vec!["outer:enter", "inner:enter", "inner:exit", "outer:exit"]
        );
    }

    #[tokio::test]
    async fn behaviors_wrap_failures_too() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mediator = Mediator::builder()
            .behavior(Arc::new(ProbeBehavior {
                label: "outer",
                trace: Arc::clone(&trace),
            }))
            .command_handler::<StockShelf, _>(StockShelfHandler)
            .build(Arc::new(DomainEventBus::new()));

        let error = mediator
            .execute(StockShelf {
                label: "flour".to_string(),
                fail: true,
            })
            .await
            .unwrap_err();
        assert_eq!(error.kind(), "business_rule");

        let recorded = trace.lock().unwrap().clone();
        assert_eq!(recorded, vec!["outer:enter", "outer:exit"]);
    }

    #[tokio::test]
    async fn successful_commands_publish_their_events_exactly_once() {
        let recorder = Arc::new(RecordingHandler {
            published: AtomicUsize::new(0),
        });
        let mediator = dispatching_mediator(Arc::clone(&recorder));

        mediator
            .execute(StockShelf {
                label: "flour".to_string(),
                fail: false,
            })
            .await
            .unwrap();

        assert_eq!(recorder.published.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_commands_publish_nothing() {
        let recorder = Arc::new(RecordingHandler {
            published: AtomicUsize::new(0),
        });
        let mediator = dispatching_mediator(Arc::clone(&recorder));

        let _ = mediator
            .execute(StockShelf {
                label: "flour".to_string(),
                fail: true,
            })
            .await;

        assert_eq!(recorder.published.load(Ordering::SeqCst), 0);
    }

    /// Event handler that re-enters the mediator with a query.
    struct ReentrantHandler {
        mediator: Arc<OnceLock<Arc<Mediator>>>,
        observed: AtomicUsize,
    }

    #[async_trait]
    impl DomainEventHandler for ReentrantHandler {
        fn name(&self) -> &'static str {
            "reentrant"
        }

        fn subscribed_to(&self) -> &'static [&'static str] {
            &["Stocked"]
        }

        async fn handle(&self, _event: &DomainEventEnvelope) -> AppResult<()> {
            let mediator = self
                .mediator
                .get()
                .ok_or_else(|| AppError::unexpected("mediator not wired yet"))?;
            let count = mediator.execute_query(ShelfCount).await?;
            self.observed.store(count, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn event_handlers_may_dispatch_new_requests_without_deadlocking() {
        let slot = Arc::new(OnceLock::new());
        let handler = Arc::new(ReentrantHandler {
            mediator: Arc::clone(&slot),
            observed: AtomicUsize::new(0),
        });

        let mut bus = DomainEventBus::new();
        bus.subscribe(Arc::clone(&handler) as Arc<dyn DomainEventHandler>);
        let bus = Arc::new(bus);

        let mediator = Arc::new(
            Mediator::builder()
                .behavior(Arc::new(DomainEventDispatchBehavior::new(Arc::clone(&bus))))
                .command_handler::<StockShelf, _>(StockShelfHandler)
                .query_handler::<ShelfCount, _>(ShelfCountHandler)
                .build(bus),
        );
        slot.set(Arc::clone(&mediator)).ok();

        mediator
            .execute(StockShelf {
                label: "flour".to_string(),
                fail: false,
            })
            .await
            .unwrap();

        assert_eq!(handler.observed.load(Ordering::SeqCst), 7);
    }
}
