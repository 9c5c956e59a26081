//! Command/query dispatch core.
//!
//! This crate provides the building blocks every feature of the ordering
//! system runs on:
//! - [`Mediator`]: routes commands and queries to their single handler
//!   through an ordered chain of [`PipelineBehavior`]s
//! - [`AggregateRoot`] and [`DomainEventEnvelope`]: the event-sourced
//!   aggregate contract (state mutated only by applying recorded events)
//! - [`UnitOfWork`]: per-request event bookkeeping for post-commit dispatch
//! - [`Repository`]: storage-agnostic persistence interface for handlers
//! - [`DomainEventBus`]: publish-time fan-out to domain event handlers

pub mod aggregate;
pub mod behavior;
pub mod behaviors;
pub mod error;
pub mod event;
pub mod event_handler;
pub mod handler;
pub mod mediator;
pub mod repository;
pub mod request;
pub mod unit_of_work;

pub use aggregate::AggregateRoot;
pub use behavior::{Next, PipelineBehavior};
pub use behaviors::{DomainEventDispatchBehavior, MetricsBehavior, TracingBehavior};
pub use error::{AppError, AppResult};
pub use event::{DomainEvent, DomainEventEnvelope, Version};
pub use event_handler::{DomainEventBus, DomainEventHandler};
pub use handler::{AnyResponse, CommandHandler, QueryHandler};
pub use mediator::{Mediator, MediatorBuilder};
pub use repository::{InMemoryRepository, Repository};
pub use request::{Command, Query, RequestContext, RequestKind};
pub use unit_of_work::UnitOfWork;
