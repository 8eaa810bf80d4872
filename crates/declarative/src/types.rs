//! Core types for resource reconciliation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle operation a reconciliation invocation represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No prior output exists; the handler must create the resource
    Create,
    /// A prior output exists and the resource was declared again
    Update,
    /// The resource is being torn down
    Delete,
}

impl Phase {
    /// Lowercase name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a handler committed for one invocation
///
/// Handlers return exactly one `Outcome`, which makes a missing or
/// double commit impossible to express.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<O> {
    /// A fresh output produced during create
    Created(O),
    /// A refreshed output produced during update
    Updated(O),
    /// The resource was removed from the external system
    Destroyed,
}

impl<O> Outcome<O> {
    /// Borrow the committed output, if any
    pub fn output(&self) -> Option<&O> {
        match self {
            Self::Created(output) | Self::Updated(output) => Some(output),
            Self::Destroyed => None,
        }
    }

    /// Take the committed output, if any
    pub fn into_output(self) -> Option<O> {
        match self {
            Self::Created(output) | Self::Updated(output) => Some(output),
            Self::Destroyed => None,
        }
    }

    /// Check if this outcome marks destruction
    pub fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed)
    }

    /// Short name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Destroyed => "destroyed",
        }
    }

    /// Whether this outcome is the one `phase` requires
    pub fn matches_phase(&self, phase: Phase) -> bool {
        matches!(
            (phase, self),
            (Phase::Create, Self::Created(_))
                | (Phase::Update, Self::Updated(_))
                | (Phase::Delete, Self::Destroyed)
        )
    }
}

/// Result of tearing down a single instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeardownResult {
    /// The handler ran and committed destruction
    Destroyed,
    /// The handler was not invoked (nothing was ever created)
    Skipped { reason: String },
    /// The handler failed; the external resource may still exist
    Failed { error: String },
}

impl TeardownResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// One visited instance in a teardown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeardownEntry {
    pub id: String,
    pub resource_type: String,
    pub result: TeardownResult,
}

/// Per-instance results of destroying a scope, in visit order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeardownReport {
    /// Name of the scope that was torn down
    pub scope: String,
    /// Entries in the order instances were visited (reverse creation order)
    pub entries: Vec<TeardownEntry>,
    /// True when the scope had already been destroyed and nothing ran
    pub already_destroyed: bool,
}

impl TeardownReport {
    pub(crate) fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ..Default::default()
        }
    }

    pub(crate) fn noop(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            entries: Vec::new(),
            already_destroyed: true,
        }
    }

    pub(crate) fn push(
        &mut self,
        id: impl Into<String>,
        resource_type: impl Into<String>,
        result: TeardownResult,
    ) {
        self.entries.push(TeardownEntry {
            id: id.into(),
            resource_type: resource_type.into(),
            result,
        });
    }

    /// Number of instances whose handler committed destruction
    pub fn destroyed(&self) -> usize {
        self.count(|r| matches!(r, TeardownResult::Destroyed))
    }

    /// Number of instances skipped without invoking a handler
    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, TeardownResult::Skipped { .. }))
    }

    /// Number of instances whose delete failed
    pub fn failed(&self) -> usize {
        self.count(|r| matches!(r, TeardownResult::Failed { .. }))
    }

    /// Total number of visited instances
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Check if every visited instance was torn down without failure
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Entries whose delete failed
    pub fn failures(&self) -> impl Iterator<Item = &TeardownEntry> {
        self.entries.iter().filter(|e| !e.result.is_success())
    }

    fn count(&self, pred: impl Fn(&TeardownResult) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.result)).count()
    }
}
