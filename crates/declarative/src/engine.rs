//! Reconciliation engine - phase resolution, commit checking and teardown

use crate::context::{Context, NoProgress, ProgressCallback};
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::resource::Resource;
use crate::scope::{Instance, Scope, ScopeStatus};
use crate::types::{Outcome, Phase, TeardownReport, TeardownResult};

/// Drives resource handlers against scopes
///
/// The engine borrows a [`Registry`] built at startup. Every call runs to
/// completion before returning; sibling instances are never reconciled
/// concurrently.
#[derive(Debug, Clone, Copy)]
pub struct Engine<'r> {
    registry: &'r Registry,
}

impl<'r> Engine<'r> {
    /// Create an engine over a registry
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// The registry this engine dispatches to
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Declare `id` with the desired `props` inside `scope`
    ///
    /// Resolves the phase (create for an unseen id, update when a prior
    /// output exists), runs the registered handler for `R` and stores what
    /// it committed. On failure the scope is left exactly as it was.
    pub fn apply<R: Resource>(
        &self,
        scope: &mut Scope,
        id: &str,
        props: &R::Props,
    ) -> Result<R::Output> {
        let resource = self
            .registry
            .get::<R>()
            .ok_or_else(|| Error::UnknownType(R::TYPE.to_string()))?;
        scope.ensure_active()?;

        let prior = match scope.get(id) {
            Some(instance) if instance.resource_type() != R::TYPE => {
                return Err(Error::TypeMismatch {
                    scope: scope.name().to_string(),
                    id: id.to_string(),
                    existing: instance.resource_type().to_string(),
                    requested: R::TYPE.to_string(),
                });
            }
            Some(instance) => instance.output_as::<R::Output>()?,
            None => None,
        };
        let phase = if prior.is_some() {
            Phase::Update
        } else {
            Phase::Create
        };
        let props_value =
            serde_json::to_value(props).map_err(|e| Error::serialization(id, "props", e))?;

        log::debug!("{} '{}' in scope '{}': {}", R::TYPE, id, scope.name(), phase);

        let ctx = Context::new(phase, scope.name(), id, prior);
        let outcome = resource
            .reconcile(ctx, id, props)
            .map_err(|source| Error::Reconcile {
                resource_type: R::TYPE.to_string(),
                id: id.to_string(),
                phase,
                source,
            })?;

        let kind = outcome.kind();
        let output = Some(outcome)
            .filter(|outcome| outcome.matches_phase(phase))
            .and_then(Outcome::into_output)
            .ok_or_else(|| Error::ContractViolation {
                resource_type: R::TYPE.to_string(),
                id: id.to_string(),
                phase,
                outcome: kind,
            })?;
        let output_value =
            serde_json::to_value(&output).map_err(|e| Error::serialization(id, "output", e))?;

        scope.record(id, R::TYPE, phase, props_value, output_value);
        log::info!("{} '{}' {}d", R::TYPE, id, phase);
        Ok(output)
    }

    /// Delete a single instance outside of a full teardown
    ///
    /// The instance leaves the scope whatever the handler reports, exactly
    /// as during [`destroy`](Self::destroy). Only a missing instance or an
    /// inactive scope is an error.
    pub fn delete(&self, scope: &mut Scope, id: &str) -> Result<TeardownResult> {
        scope.ensure_active()?;
        let instance = scope.take(id).ok_or_else(|| Error::InstanceNotFound {
            scope: scope.name().to_string(),
            id: id.to_string(),
        })?;
        Ok(self.teardown_instance(scope.name(), &instance))
    }

    /// Tear down every instance in `scope`
    ///
    /// See [`destroy_with`](Self::destroy_with).
    pub fn destroy(&self, scope: &mut Scope) -> TeardownReport {
        self.destroy_with(scope, &mut NoProgress)
    }

    /// Tear down every instance in `scope`, reporting progress
    ///
    /// The scope stops accepting declarations immediately. Instances are
    /// visited last-created first; each one with a committed output has its
    /// handler invoked in the delete phase. A failing delete is recorded and
    /// the walk continues. Destroying an already destroyed scope is a no-op.
    pub fn destroy_with<P: ProgressCallback>(
        &self,
        scope: &mut Scope,
        progress: &mut P,
    ) -> TeardownReport {
        if scope.status() == ScopeStatus::Destroyed {
            log::debug!("Scope '{}' already destroyed", scope.name());
            return TeardownReport::noop(scope.name());
        }

        scope.set_status(ScopeStatus::Destroying);
        log::info!(
            "Destroying scope '{}' ({} resources)",
            scope.name(),
            scope.len()
        );
        progress.on_teardown_start(scope.name(), scope.len());

        let mut report = TeardownReport::new(scope.name());
        while let Some(instance) = scope.pop() {
            progress.on_instance_start(instance.id(), instance.resource_type());
            let result = self.teardown_instance(scope.name(), &instance);
            progress.on_instance_complete(instance.id(), &result);
            report.push(instance.id(), instance.resource_type(), result);
        }

        scope.set_status(ScopeStatus::Destroyed);
        if report.is_success() {
            log::info!("Scope '{}' destroyed", scope.name());
        } else {
            log::warn!(
                "Scope '{}' destroyed with {} failed deletes",
                scope.name(),
                report.failed()
            );
        }
        progress.on_teardown_complete(&report);
        report
    }

    /// Run the delete phase for one already-removed instance
    fn teardown_instance(&self, scope: &str, instance: &Instance) -> TeardownResult {
        let Some(output) = instance.output() else {
            return TeardownResult::Skipped {
                reason: "no committed output".to_string(),
            };
        };
        let Some(resource) = self.registry.get_erased(instance.resource_type()) else {
            let err = Error::UnknownType(instance.resource_type().to_string());
            log::error!("Cannot delete '{}': {}", instance.id(), err);
            return TeardownResult::Failed {
                error: err.to_string(),
            };
        };

        log::debug!(
            "{} '{}' in scope '{}': delete",
            instance.resource_type(),
            instance.id(),
            scope
        );

        match resource.reconcile_value(
            Phase::Delete,
            scope,
            instance.id(),
            Some(output),
            instance.props(),
        ) {
            Ok(outcome) if outcome.is_destroyed() => TeardownResult::Destroyed,
            Ok(other) => {
                let err = Error::ContractViolation {
                    resource_type: instance.resource_type().to_string(),
                    id: instance.id().to_string(),
                    phase: Phase::Delete,
                    outcome: other.kind(),
                };
                log::error!("{}", err);
                TeardownResult::Failed {
                    error: err.to_string(),
                }
            }
            Err(err) => {
                log::warn!("{}", err);
                TeardownResult::Failed {
                    error: err.to_string(),
                }
            }
        }
    }
}
