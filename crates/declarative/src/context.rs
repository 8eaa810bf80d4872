//! Per-invocation context and teardown progress callbacks
//!
//! A [`Context`] tells a handler which phase it runs in and what it
//! committed last time. Its two commit primitives consume the context,
//! so a handler can commit at most once and must return an [`Outcome`]
//! to commit at all.

use crate::types::{Outcome, Phase, TeardownReport, TeardownResult};

/// Context handed to a resource handler for one invocation
#[derive(Debug)]
pub struct Context<'a, O> {
    phase: Phase,
    scope: &'a str,
    id: &'a str,
    output: Option<O>,
}

impl<'a, O> Context<'a, O> {
    pub(crate) fn new(phase: Phase, scope: &'a str, id: &'a str, output: Option<O>) -> Self {
        Self {
            phase,
            scope,
            id,
            output,
        }
    }

    /// Phase resolved for this invocation
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Name of the owning scope
    pub fn scope(&self) -> &str {
        self.scope
    }

    /// Logical id of the instance
    pub fn id(&self) -> &str {
        self.id
    }

    /// Output committed by the previous successful invocation
    ///
    /// Always `None` during create, always `Some` during update and delete.
    pub fn output(&self) -> Option<&O> {
        self.output.as_ref()
    }

    /// Commit a new output
    ///
    /// Yields [`Outcome::Created`] during create and [`Outcome::Updated`]
    /// otherwise. Committing an output during delete produces an outcome the
    /// engine rejects as a contract violation.
    pub fn commit(self, output: O) -> Outcome<O> {
        match self.phase {
            Phase::Create => Outcome::Created(output),
            Phase::Update | Phase::Delete => Outcome::Updated(output),
        }
    }

    /// Commit destruction of the resource
    ///
    /// Only valid during delete.
    pub fn destroy(self) -> Outcome<O> {
        Outcome::Destroyed
    }
}

/// Progress callback for teardown
///
/// Implement this trait to receive updates while a scope is destroyed.
pub trait ProgressCallback {
    /// Called once before any instance is visited
    fn on_teardown_start(&mut self, scope: &str, count: usize);

    /// Called before an instance's handler runs
    fn on_instance_start(&mut self, id: &str, resource_type: &str);

    /// Called after an instance has been removed from the scope
    fn on_instance_complete(&mut self, id: &str, result: &TeardownResult);

    /// Called once after the scope is marked destroyed
    fn on_teardown_complete(&mut self, report: &TeardownReport);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_teardown_start(&mut self, _scope: &str, _count: usize) {}
    fn on_instance_start(&mut self, _id: &str, _resource_type: &str) {}
    fn on_instance_complete(&mut self, _id: &str, _result: &TeardownResult) {}
    fn on_teardown_complete(&mut self, _report: &TeardownReport) {}
}
