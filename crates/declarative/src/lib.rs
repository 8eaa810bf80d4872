//! # Declarative
//!
//! A framework for reconciling declared resources against external systems.
//!
//! Each resource type has exactly one handler covering create, update and
//! delete. The engine works out which of the three an invocation is, hands
//! the handler a [`Context`] with the previously committed output, and
//! stores whatever the handler commits. Instances live in a [`Scope`] that
//! is torn down as a unit, last-created first.
//!
//! ## Core Concepts
//!
//! - **Resource**: a type name plus one reconciliation handler
//! - **Registry**: the set of resource types, built once at startup
//! - **Context**: the per-invocation phase, prior output and commit primitives
//! - **Outcome**: what a handler committed (`Created`, `Updated`, `Destroyed`)
//! - **Scope**: ordered instances sharing one teardown
//! - **Engine**: resolves phases, checks commits, runs teardown
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{Engine, Registry, Scope};
//!
//! let registry = Registry::new().with(UserResource::new(api))?;
//! let engine = Engine::new(&registry);
//! let mut scope = Scope::new("deploy-42");
//!
//! // First declaration creates, later ones update
//! let user = engine.apply::<UserResource<_>>(&mut scope, "john-doe", &props)?;
//!
//! // Delete everything, newest first; failures are collected, not raised
//! let report = engine.destroy(&mut scope);
//! for failure in report.failures() {
//!     eprintln!("{}: {:?}", failure.id, failure.result);
//! }
//! ```
//!
//! ## Error Handling
//!
//! - Configuration errors (duplicate types, inactive scopes, wrong commits)
//!   are returned immediately; see [`Error::is_configuration`].
//! - Handler failures during create or update come back as
//!   [`Error::Reconcile`] and leave the scope untouched.
//! - Handler failures during delete land in the [`TeardownReport`]; the
//!   instance is removed regardless.

pub mod context;
pub mod engine;
pub mod error;
pub mod registry;
pub mod resource;
pub mod scope;
pub mod types;

// Re-export main types at crate root
pub use context::{Context, NoProgress, ProgressCallback};
pub use engine::Engine;
pub use error::{Error, Result};
pub use registry::Registry;
pub use resource::Resource;
pub use scope::{Instance, Scope, ScopeStatus};
pub use types::{Outcome, Phase, TeardownEntry, TeardownReport, TeardownResult};
