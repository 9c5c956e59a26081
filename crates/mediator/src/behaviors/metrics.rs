//! Request count and duration metrics behavior.

use std::time::Instant;

use async_trait::async_trait;

use crate::behavior::{Next, PipelineBehavior};
use crate::error::AppResult;
use crate::handler::AnyResponse;
use crate::request::RequestContext;

/// Records one counter increment and one duration sample per request,
/// labelled by request kind, concrete type, and outcome, regardless of
/// whether an inner behavior or the handler failed.
#[derive(Debug, Default)]
pub struct MetricsBehavior;

impl MetricsBehavior {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PipelineBehavior for MetricsBehavior {
    async fn handle(&self, ctx: &RequestContext, next: Next<'_>) -> AppResult<AnyResponse> {
        let started = Instant::now();
        let result = next.run().await;

        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(
            "mediator_requests_total",
            "kind" => ctx.kind().as_str(),
            "request" => ctx.request_name(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(
            "mediator_request_duration_seconds",
            "kind" => ctx.kind().as_str(),
            "request" => ctx.request_name(),
        )
        .record(started.elapsed().as_secs_f64());

        result
    }

    fn name(&self) -> &'static str {
        "metrics"
    }
}
