//! Post-commit domain event dispatch behavior.

use std::sync::Arc;

use async_trait::async_trait;

use crate::behavior::{Next, PipelineBehavior};
use crate::error::AppResult;
use crate::event_handler::DomainEventBus;
use crate::handler::AnyResponse;
use crate::request::RequestContext;

/// Publishes the unit of work's collected events after a successful handler
/// run.
///
/// Events are published only when the inner result is a success, after the
/// handler's persistence call has returned; a failed request publishes
/// nothing. The scope is drained on both paths so a retry can never observe
/// events from a previous attempt.
pub struct DomainEventDispatchBehavior {
    bus: Arc<DomainEventBus>,
}

impl DomainEventDispatchBehavior {
    pub fn new(bus: Arc<DomainEventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl PipelineBehavior for DomainEventDispatchBehavior {
    async fn handle(&self, ctx: &RequestContext, next: Next<'_>) -> AppResult<AnyResponse> {
        let result = next.run().await;

        let events = ctx.unit_of_work().drain().await;
        if result.is_ok() {
            for event in &events {
                self.bus.publish(event).await;
            }
        } else if !events.is_empty() {
            tracing::debug!(
                request = ctx.request_name(),
                discarded = events.len(),
                "discarding domain events from failed request"
            );
        }

        result
    }

    fn name(&self) -> &'static str {
        "domain-event-dispatch"
    }
}
