//! Span-per-request tracing behavior.

use async_trait::async_trait;
use tracing::Instrument;

use crate::behavior::{Next, PipelineBehavior};
use crate::error::AppResult;
use crate::handler::AnyResponse;
use crate::request::RequestContext;

/// Opens a span around the rest of the chain and records the outcome status
/// once the inner execution has finished, on success and failure alike.
#[derive(Debug, Default)]
pub struct TracingBehavior;

impl TracingBehavior {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PipelineBehavior for TracingBehavior {
    async fn handle(&self, ctx: &RequestContext, next: Next<'_>) -> AppResult<AnyResponse> {
        let span = tracing::info_span!(
            "request",
            kind = ctx.kind().as_str(),
            request = ctx.request_name(),
            status = tracing::field::Empty,
            error_kind = tracing::field::Empty,
        );

        async move {
            let result = next.run().await;
            let current = tracing::Span::current();
            match &result {
                Ok(_) => {
                    current.record("status", "ok");
                    tracing::debug!("request completed");
                }
                Err(error) => {
                    current.record("status", "error");
                    current.record("error_kind", error.kind());
                    tracing::warn!(%error, "request failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}
