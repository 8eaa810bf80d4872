//! Error types for reconciliation
//!
//! Errors fall into two groups. Configuration errors (duplicate types,
//! inactive scopes, broken commit contracts) are fatal and never worth
//! retrying. Reconciliation failures wrap whatever the handler returned,
//! usually a transport failure, and leave the instance untouched so the
//! same declaration can be retried.

use crate::scope::ScopeStatus;
use crate::types::Phase;

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the registry and the reconciliation engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A resource type was registered twice.
    #[error("resource type already registered: {0}")]
    DuplicateType(String),

    /// A resource type was used without being registered.
    #[error("resource type not registered: {0}")]
    UnknownType(String),

    /// A resource was declared in a scope that no longer accepts resources.
    #[error("scope '{scope}' is {status} and does not accept resources")]
    ScopeInactive {
        /// Scope name.
        scope: String,
        /// Current scope status.
        status: ScopeStatus,
    },

    /// A logical id was declared again with a different resource type.
    #[error("'{id}' in scope '{scope}' is a {existing}, not a {requested}")]
    TypeMismatch {
        /// Scope name.
        scope: String,
        /// Logical id.
        id: String,
        /// Type the instance was created with.
        existing: String,
        /// Type of the new declaration.
        requested: String,
    },

    /// A handler returned an outcome that its phase does not allow.
    #[error("{resource_type} '{id}' committed {outcome} during {phase}")]
    ContractViolation {
        /// Resource type.
        resource_type: String,
        /// Logical id.
        id: String,
        /// Phase of the invocation.
        phase: Phase,
        /// Outcome the handler returned.
        outcome: &'static str,
    },

    /// No instance with this logical id exists in the scope.
    #[error("'{id}' not found in scope '{scope}'")]
    InstanceNotFound {
        /// Scope name.
        scope: String,
        /// Logical id.
        id: String,
    },

    /// Props or output could not be converted to or from stored JSON.
    #[error("invalid {what} for '{id}': {source}")]
    Serialization {
        /// Logical id.
        id: String,
        /// Which value failed ("props" or "output").
        what: &'static str,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// The handler itself failed.
    #[error("failed to {phase} {resource_type} '{id}': {source}")]
    Reconcile {
        /// Resource type.
        resource_type: String,
        /// Logical id.
        id: String,
        /// Phase of the failed invocation.
        phase: Phase,
        /// Error returned by the handler.
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    pub(crate) fn serialization(id: &str, what: &'static str, source: serde_json::Error) -> Self {
        Self::Serialization {
            id: id.to_string(),
            what,
            source,
        }
    }

    /// Whether this is a configuration error rather than a handler failure.
    ///
    /// Configuration errors are surfaced immediately and must not be retried.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Reconcile { .. })
    }

    /// Phase of the failed invocation, when a handler was involved.
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::ContractViolation { phase, .. } | Self::Reconcile { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}
