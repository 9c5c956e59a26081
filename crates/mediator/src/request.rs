//! Request contracts and the per-request execution scope.

use crate::unit_of_work::UnitOfWork;

/// A typed request describing an intended state change.
///
/// Exactly one handler must be registered per command type.
pub trait Command: Send + 'static {
    /// The payload a successful execution produces.
    type Output: Send + 'static;
}

/// A typed request describing a read.
///
/// Exactly one handler must be registered per query type.
pub trait Query: Send + 'static {
    /// The payload a successful execution produces.
    type Output: Send + 'static;
}

/// Whether a request is a command or a query; used as a label dimension by
/// the tracing and metrics behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Command,
    Query,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Command => "command",
            RequestKind::Query => "query",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-request execution scope handed to handlers and behaviors.
///
/// Each execute call creates a fresh context; it is never shared across
/// concurrent requests, which is what keeps the unit of work request-scoped.
pub struct RequestContext {
    kind: RequestKind,
    request_name: &'static str,
    unit_of_work: UnitOfWork,
}

impl RequestContext {
    /// Creates a context for one request execution.
    pub fn new(kind: RequestKind, request_name: &'static str) -> Self {
        Self {
            kind,
            request_name,
            unit_of_work: UnitOfWork::new(),
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// The concrete request type's short name.
    pub fn request_name(&self) -> &'static str {
        self.request_name
    }

    pub fn unit_of_work(&self) -> &UnitOfWork {
        &self.unit_of_work
    }
}
