//! The pipeline behaviors shipped with the dispatch core.
//!
//! Reference composition, outermost first: tracing, domain-event dispatch,
//! metrics.

mod dispatch;
mod metrics;
mod tracing;

pub use dispatch::DomainEventDispatchBehavior;
pub use metrics::MetricsBehavior;
pub use tracing::TracingBehavior;
