//! Handler contracts and the type-erased adapters the mediator stores.

use std::any::Any;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::request::{Command, Query, RequestContext};

/// Resolves one command type to its result.
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, command: C, ctx: &RequestContext) -> AppResult<C::Output>;
}

/// Resolves one query type to its result.
#[async_trait]
pub trait QueryHandler<Q: Query>: Send + Sync {
    async fn handle(&self, query: Q, ctx: &RequestContext) -> AppResult<Q::Output>;
}

/// Type-erased response passed through the behavior chain.
pub type AnyResponse = Box<dyn Any + Send>;

pub(crate) type AnyRequest = Box<dyn Any + Send>;

/// Object-safe adapter over a typed handler.
///
/// The mediator keys these by the request's `TypeId`; the downcasts inside
/// can only fail if the registry itself is wired wrong.
#[async_trait]
pub(crate) trait ErasedHandler: Send + Sync {
    async fn invoke(&self, request: AnyRequest, ctx: &RequestContext) -> AppResult<AnyResponse>;
}

pub(crate) struct ErasedCommandHandler<C, H> {
    handler: H,
    _request: PhantomData<fn(C)>,
}

impl<C, H> ErasedCommandHandler<C, H> {
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler,
            _request: PhantomData,
        }
    }
}

#[async_trait]
impl<C, H> ErasedHandler for ErasedCommandHandler<C, H>
where
    C: Command,
    H: CommandHandler<C>,
{
    async fn invoke(&self, request: AnyRequest, ctx: &RequestContext) -> AppResult<AnyResponse> {
        let command = request
            .downcast::<C>()
            .map_err(|_| AppError::unexpected("command payload does not match its registration"))?;
        let output = self.handler.handle(*command, ctx).await?;
        Ok(Box::new(output) as AnyResponse)
    }
}

pub(crate) struct ErasedQueryHandler<Q, H> {
    handler: H,
    _request: PhantomData<fn(Q)>,
}

impl<Q, H> ErasedQueryHandler<Q, H> {
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler,
            _request: PhantomData,
        }
    }
}

#[async_trait]
impl<Q, H> ErasedHandler for ErasedQueryHandler<Q, H>
where
    Q: Query,
    H: QueryHandler<Q>,
{
    async fn invoke(&self, request: AnyRequest, ctx: &RequestContext) -> AppResult<AnyResponse> {
        let query = request
            .downcast::<Q>()
            .map_err(|_| AppError::unexpected("query payload does not match its registration"))?;
        let output = self.handler.handle(*query, ctx).await?;
        Ok(Box::new(output) as AnyResponse)
    }
}
