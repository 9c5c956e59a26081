//! Domain event subscribers and the publish-time fan-out.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;

use crate::error::AppResult;
use crate::event::DomainEventEnvelope;

/// Subscriber invoked for the event types it declares, used for side effects
/// such as notifications and read-model projections.
///
/// Handlers run after the originating state change has been persisted;
/// delivery is at-least-once and a handler failure never rolls the change
/// back or fails the originating command.
#[async_trait]
pub trait DomainEventHandler: Send + Sync {
    /// Short name used in logs and metrics labels.
    fn name(&self) -> &'static str;

    /// Event type names this handler wants delivered.
    fn subscribed_to(&self) -> &'static [&'static str];

    async fn handle(&self, event: &DomainEventEnvelope) -> AppResult<()>;
}

/// Fans each published event out to the handlers subscribed to its type.
///
/// The subscriber map is frozen at startup, so publishing holds no locks and
/// a handler that re-enters the mediator cannot deadlock.
#[derive(Default)]
pub struct DomainEventBus {
    subscribers: HashMap<&'static str, Vec<Arc<dyn DomainEventHandler>>>,
}

impl DomainEventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a handler to every event type it declares.
    pub fn subscribe(&mut self, handler: Arc<dyn DomainEventHandler>) {
        for event_type in handler.subscribed_to() {
            self.subscribers
                .entry(event_type)
                .or_default()
                .push(Arc::clone(&handler));
        }
    }

    /// Returns the number of handlers subscribed to an event type.
    pub fn handler_count(&self, event_type: &str) -> usize {
        self.subscribers.get(event_type).map_or(0, Vec::len)
    }

    /// Delivers one event to all of its subscribers.
    ///
    /// Handler failures are isolated: each is logged and counted, and neither
    /// stops sibling handlers nor escalates to the caller.
    pub async fn publish(&self, event: &DomainEventEnvelope) {
        let Some(handlers) = self.subscribers.get(event.event_type.as_str()) else {
            return;
        };

        let deliveries = handlers.iter().map(|handler| {
            let handler = Arc::clone(handler);
            async move {
                if let Err(error) = handler.handle(event).await {
                    tracing::error!(
                        handler = handler.name(),
                        event_type = %event.event_type,
                        aggregate_id = %event.aggregate_id,
                        %error,
                        "domain event handler failed"
                    );
                    metrics::counter!(
                        "domain_event_handler_failures_total",
                        "handler" => handler.name()
                    )
                    .increment(1);
                }
            }
        });
        join_all(deliveries).await;

        metrics::counter!(
            "domain_events_published_total",
            "event_type" => event.event_type.clone()
        )
        .increment(1);
    }
}
