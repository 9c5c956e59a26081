//! Pipeline behavior contract and the continuation that composes the chain.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use crate::error::AppResult;
use crate::handler::{AnyRequest, AnyResponse, ErasedHandler};
use crate::request::RequestContext;

/// Middleware wrapping a single request's execution.
///
/// Behaviors are request-agnostic and composable: each receives the request
/// context and a continuation into the rest of the chain. The first behavior
/// registered is the outermost wrapper. A behavior may inspect the
/// `AppResult` shape of the outcome but never the response payload.
#[async_trait]
pub trait PipelineBehavior: Send + Sync {
    /// Wraps one request execution; implementations call `next.run()` exactly
    /// once.
    async fn handle(&self, ctx: &RequestContext, next: Next<'_>) -> AppResult<AnyResponse>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Continuation into the remaining behaviors and, at the end of the chain,
/// the request handler itself.
pub struct Next<'a> {
    behaviors: &'a [Arc<dyn PipelineBehavior>],
    handler: &'a dyn ErasedHandler,
    request: AnyRequest,
    ctx: &'a RequestContext,
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        behaviors: &'a [Arc<dyn PipelineBehavior>],
        handler: &'a dyn ErasedHandler,
        request: AnyRequest,
        ctx: &'a RequestContext,
    ) -> Self {
        Self {
            behaviors,
            handler,
            request,
            ctx,
        }
    }

    /// Runs the rest of the chain.
    ///
    /// Boxed because the chain recurses through each remaining behavior.
    pub fn run(self) -> BoxFuture<'a, AppResult<AnyResponse>> {
        Box::pin(async move {
            match self.behaviors.split_first() {
                Some((behavior, rest)) => {
                    let next = Next::new(rest, self.handler, self.request, self.ctx);
                    behavior.handle(self.ctx, next).await
                }
                None => self.handler.invoke(self.request, self.ctx).await,
            }
        })
    }
}
