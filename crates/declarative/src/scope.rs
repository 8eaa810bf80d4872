//! Scopes and the instances they own
//!
//! A Scope is a named unit of work (a deployment, a test run). It keeps
//! its instances in creation order so teardown can walk them backwards.
//! Only the [`Engine`](crate::Engine) mutates a scope; everything public
//! here is read-only.

use crate::error::{Error, Result};
use crate::types::Phase;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Liveness of a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeStatus {
    /// Accepting resource declarations
    #[default]
    Active,
    /// Teardown has started; declarations are rejected
    Destroying,
    /// Teardown finished; terminal
    Destroyed,
}

impl fmt::Display for ScopeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Destroying => "destroying",
            Self::Destroyed => "destroyed",
        };
        f.write_str(s)
    }
}

/// A resource instance owned by a scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    id: String,
    resource_type: String,
    phase: Phase,
    props: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Instance {
    /// Logical id supplied by the caller
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Resource type name
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Phase of the last successful invocation
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Desired props of the last successful invocation
    pub fn props(&self) -> &Value {
        &self.props
    }

    /// Last committed output
    pub fn output(&self) -> Option<&Value> {
        self.output.as_ref()
    }

    /// Last committed output decoded as `T`
    pub fn output_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.output
            .clone()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| Error::serialization(&self.id, "output", e))
    }

    /// When the instance was first committed
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the instance was last committed
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// An ordered collection of resource instances sharing one teardown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    name: String,
    #[serde(default)]
    status: ScopeStatus,
    #[serde(default)]
    instances: Vec<Instance>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Scope {
    /// Create an empty, active scope
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            status: ScopeStatus::Active,
            instances: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Scope name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current status
    pub fn status(&self) -> ScopeStatus {
        self.status
    }

    /// Check if the scope accepts declarations
    pub fn is_active(&self) -> bool {
        self.status == ScopeStatus::Active
    }

    /// Instances in creation order
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Find an instance by logical id
    pub fn get(&self, id: &str) -> Option<&Instance> {
        self.instances.iter().find(|i| i.id == id)
    }

    /// Check if an instance with this logical id exists
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Check if the scope holds no instances
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// When the scope was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the scope last changed
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub(crate) fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::ScopeInactive {
                scope: self.name.clone(),
                status: self.status,
            })
        }
    }

    /// Store a committed output, appending new instances at the end
    pub(crate) fn record(
        &mut self,
        id: &str,
        resource_type: &str,
        phase: Phase,
        props: Value,
        output: Value,
    ) {
        let now = Utc::now();
        self.updated_at = now;

        if let Some(instance) = self.instances.iter_mut().find(|i| i.id == id) {
            instance.phase = phase;
            instance.props = props;
            instance.output = Some(output);
            instance.updated_at = now;
            return;
        }

        self.instances.push(Instance {
            id: id.to_string(),
            resource_type: resource_type.to_string(),
            phase,
            props,
            output: Some(output),
            created_at: now,
            updated_at: now,
        });
    }

    /// Remove an instance by logical id
    pub(crate) fn take(&mut self, id: &str) -> Option<Instance> {
        let pos = self.instances.iter().position(|i| i.id == id)?;
        self.updated_at = Utc::now();
        Some(self.instances.remove(pos))
    }

    /// Remove the most recently created instance
    pub(crate) fn pop(&mut self) -> Option<Instance> {
        let instance = self.instances.pop()?;
        self.updated_at = Utc::now();
        Some(instance)
    }

    pub(crate) fn set_status(&mut self, status: ScopeStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_scope_is_active_and_empty() {
        let scope = Scope::new("run");
        assert_eq!(scope.name(), "run");
        assert!(scope.is_active());
        assert!(scope.is_empty());
        assert!(scope.ensure_active().is_ok());
    }

    #[test]
    fn test_record_preserves_creation_order() {
        let mut scope = Scope::new("run");
        scope.record("a", "t", Phase::Create, json!({}), json!({"n": 1}));
        scope.record("b", "t", Phase::Create, json!({}), json!({"n": 2}));
        scope.record("a", "t", Phase::Update, json!({"x": 1}), json!({"n": 3}));

        let ids: Vec<_> = scope.instances().iter().map(Instance::id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let a = scope.get("a").unwrap();
        assert_eq!(a.phase(), Phase::Update);
        assert_eq!(a.output(), Some(&json!({"n": 3})));
        assert_eq!(a.props(), &json!({"x": 1}));
        assert!(a.updated_at() >= a.created_at());
    }

    #[test]
    fn test_take_and_pop() {
        let mut scope = Scope::new("run");
        scope.record("a", "t", Phase::Create, json!({}), json!(1));
        scope.record("b", "t", Phase::Create, json!({}), json!(2));
        scope.record("c", "t", Phase::Create, json!({}), json!(3));

        assert_eq!(scope.take("b").unwrap().id(), "b");
        assert!(scope.take("b").is_none());
        assert_eq!(scope.pop().unwrap().id(), "c");
        assert_eq!(scope.pop().unwrap().id(), "a");
        assert!(scope.pop().is_none());
    }

    #[test]
    fn test_inactive_scope_rejects() {
        let mut scope = Scope::new("run");
        scope.set_status(ScopeStatus::Destroying);
        assert!(matches!(
            scope.ensure_active(),
            Err(Error::ScopeInactive {
                status: ScopeStatus::Destroying,
                ..
            })
        ));
    }

    #[test]
    fn test_typed_accessors() {
        let mut scope = Scope::new("run");
        scope.record(
            "a",
            "t",
            Phase::Create,
            json!({"name": "x"}),
            json!({"id": "42"}),
        );

        #[derive(Deserialize)]
        struct Out {
            id: String,
        }

        let instance = scope.get("a").unwrap();
        let out: Out = instance.output_as().unwrap().unwrap();
        assert_eq!(out.id, "42");
        assert_eq!(instance.props()["name"], "x");
    }

    #[test]
    fn test_serialization() {
        let mut scope = Scope::new("run");
        scope.record("a", "t", Phase::Create, json!({"k": "v"}), json!({"id": 1}));
        scope.set_status(ScopeStatus::Destroyed);

        let text = serde_json::to_string_pretty(&scope).unwrap();
        assert!(text.contains("\"destroyed\""));
        assert!(text.contains("\"create\""));

        let back: Scope = serde_json::from_str(&text).unwrap();
        assert_eq!(back, scope);
    }
}
