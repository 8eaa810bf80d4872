//! Resource trait for declarative reconciliation
//!
//! A Resource is a type name paired with one handler that covers
//! create, update and delete for every instance of that type.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::types::{Outcome, Phase};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;

/// Core trait for reconciled resources
///
/// The handler receives a [`Context`] carrying the resolved phase and the
/// previously committed output, and answers with an [`Outcome`]:
/// - create: perform the creation request and `ctx.commit(output)`
/// - update: perform a targeted mutation and `ctx.commit(output)`
/// - delete: attempt removal, tolerate "already gone", and `ctx.destroy()`
///
/// Errors returned from the handler during create or update reach the
/// caller and leave the instance unchanged. Errors during delete are
/// recorded in the teardown report and the instance is removed anyway.
///
/// # Example
///
/// ```ignore
/// use declarative::{Context, Outcome, Phase, Resource};
///
/// struct Bucket;
///
/// impl Resource for Bucket {
///     const TYPE: &'static str = "storage::Bucket";
///     type Props = BucketProps;
///     type Output = BucketInfo;
///
///     fn reconcile(
///         &self,
///         ctx: Context<'_, BucketInfo>,
///         id: &str,
///         props: &BucketProps,
///     ) -> anyhow::Result<Outcome<BucketInfo>> {
///         match ctx.phase() {
///             Phase::Delete => {
///                 remove_bucket(id);
///                 Ok(ctx.destroy())
///             }
///             Phase::Create | Phase::Update => {
///                 let info = put_bucket(id, props)?;
///                 Ok(ctx.commit(info))
///             }
///         }
///     }
/// }
/// ```
pub trait Resource: Send + Sync + 'static {
    /// Globally unique resource type name, e.g. "example-platform::User"
    const TYPE: &'static str;

    /// Desired properties supplied by the caller
    type Props: Serialize + DeserializeOwned;

    /// Output committed after a successful create or update
    type Output: Serialize + DeserializeOwned;

    /// Converge one instance for the phase carried by `ctx`
    fn reconcile(
        &self,
        ctx: Context<'_, Self::Output>,
        id: &str,
        props: &Self::Props,
    ) -> anyhow::Result<Outcome<Self::Output>>;
}

/// Object-safe view of a [`Resource`] working on stored JSON values
pub(crate) trait ErasedResource: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn reconcile_value(
        &self,
        phase: Phase,
        scope: &str,
        id: &str,
        output: Option<&Value>,
        props: &Value,
    ) -> Result<Outcome<Value>>;
}

pub(crate) struct Erased<R>(pub(crate) R);

impl<R: Resource> ErasedResource for Erased<R> {
    fn as_any(&self) -> &dyn Any {
        &self.0
    }

    fn reconcile_value(
        &self,
        phase: Phase,
        scope: &str,
        id: &str,
        output: Option<&Value>,
        props: &Value,
    ) -> Result<Outcome<Value>> {
        let props: R::Props = serde_json::from_value(props.clone())
            .map_err(|e| Error::serialization(id, "props", e))?;
        let output = output
            .map(|v| serde_json::from_value::<R::Output>(v.clone()))
            .transpose()
            .map_err(|e| Error::serialization(id, "output", e))?;

        let ctx = Context::new(phase, scope, id, output);
        let outcome = self
            .0
            .reconcile(ctx, id, &props)
            .map_err(|source| Error::Reconcile {
                resource_type: R::TYPE.to_string(),
                id: id.to_string(),
                phase,
                source,
            })?;

        to_value_outcome(id, outcome)
    }
}

fn to_value_outcome<O: Serialize>(id: &str, outcome: Outcome<O>) -> Result<Outcome<Value>> {
    let encode = |o: O| serde_json::to_value(o).map_err(|e| Error::serialization(id, "output", e));
    Ok(match outcome {
        Outcome::Created(o) => Outcome::Created(encode(o)?),
        Outcome::Updated(o) => Outcome::Updated(encode(o)?),
        Outcome::Destroyed => Outcome::Destroyed,
    })
}
