//! The `example-platform::User` resource.
//!
//! One handler covers the whole lifecycle of a user:
//!
//! - create: `POST /org/{orgId}/users`
//! - update: `PATCH /org/{orgId}/user/{id}` (never a recreate)
//! - delete: `DELETE /org/{orgId}/user/{id}`, where 404 counts as done
//!
//! A non-2xx answer to a create or update fails the reconciliation and
//! nothing is committed. Delete is best effort: failures are logged and the
//! handler still commits destruction.

use crate::error::Result;
use crate::transport::Transport;
use chrono::Utc;
use declarative::{Context, Outcome, Phase, Resource};
use serde::{Deserialize, Serialize};

/// Properties for creating or updating a User.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProps {
    /// Id of the organization to add the user to.
    pub org_id: String,
    /// First name of the user.
    pub first_name: String,
    /// Last name of the user.
    pub last_name: String,
    /// An interesting fact about the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fun_fact: Option<String>,
}

/// A reconciled User.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier assigned by the platform.
    pub id: String,
    /// Organization the user belongs to.
    pub org_id: String,
    /// First name of the user.
    pub first_name: String,
    /// Last name of the user.
    pub last_name: String,
    /// An interesting fact about the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fun_fact: Option<String>,
    /// Time at which the user was created (milliseconds since the epoch).
    pub created_at: i64,
}

/// Request body for create and update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserBody<'a> {
    first_name: &'a str,
    last_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fun_fact: Option<&'a str>,
}

impl<'a> From<&'a UserProps> for UserBody<'a> {
    fn from(props: &'a UserProps) -> Self {
        Self {
            first_name: &props.first_name,
            last_name: &props.last_name,
            fun_fact: props.fun_fact.as_deref(),
        }
    }
}

/// Response body of the user endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Platform-assigned id.
    pub id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Optional fun fact.
    #[serde(default)]
    pub fun_fact: Option<String>,
}

/// Path of the collection endpoint for an org.
#[must_use]
pub fn users_path(org_id: &str) -> String {
    format!("/org/{}/users", org_id)
}

/// Path of a single user.
#[must_use]
pub fn user_path(org_id: &str, id: &str) -> String {
    format!("/org/{}/user/{}", org_id, id)
}

/// Creates and manages Users on the example platform.
///
/// # Example
///
/// ```ignore
/// use declarative::{Engine, Registry, Scope};
/// use platform::{ApiClient, UserProps, UserResource};
///
/// let registry = Registry::new().with(UserResource::new(ApiClient::from_env()))?;
/// let engine = Engine::new(&registry);
/// let mut scope = Scope::new("onboarding");
///
/// let user = engine.apply::<UserResource<ApiClient>>(
///     &mut scope,
///     "john-doe",
///     &UserProps {
///         org_id: "fe110c72385f49a4ad721a26cdd0f730".into(),
///         first_name: "John".into(),
///         last_name: "Doe".into(),
///         fun_fact: Some("I love coding!".into()),
///     },
/// )?;
/// ```
#[derive(Debug, Clone)]
pub struct UserResource<T> {
    api: T,
}

impl<T: Transport> UserResource<T> {
    /// Create the resource over a transport.
    pub fn new(api: T) -> Self {
        Self { api }
    }

    /// The transport used by this resource.
    pub fn api(&self) -> &T {
        &self.api
    }

    /// Fetch a user straight from the platform.
    ///
    /// Returns `Ok(None)` on 404.
    pub fn fetch(&self, org_id: &str, id: &str) -> Result<Option<UserRecord>> {
        let response = self.api.get(&user_path(org_id, id))?;
        if response.status() == 404 {
            return Ok(None);
        }
        let response = response.error_for_status()?;
        Ok(Some(response.json()?))
    }

    /// Delete a user from the platform.
    ///
    /// Returns `Ok(false)` when the user was already gone.
    pub fn remove(&self, org_id: &str, id: &str) -> Result<bool> {
        let response = self.api.delete(&user_path(org_id, id))?;
        if response.status() == 404 {
            return Ok(false);
        }
        response.error_for_status()?;
        Ok(true)
    }
}

impl<T: Transport + 'static> Resource for UserResource<T> {
    const TYPE: &'static str = "example-platform::User";
    type Props = UserProps;
    type Output = User;

    fn reconcile(
        &self,
        ctx: Context<'_, User>,
        _id: &str,
        props: &UserProps,
    ) -> anyhow::Result<Outcome<User>> {
        if ctx.phase() == Phase::Delete {
            if let Some(user) = ctx.output() {
                match self.remove(&user.org_id, &user.id) {
                    Ok(true) => log::debug!("Deleted user {}", user.id),
                    Ok(false) => log::debug!("User {} already gone", user.id),
                    Err(err) => log::error!("Error deleting user: {} ({})", err, err.category()),
                }
            }
            return Ok(ctx.destroy());
        }

        let body = UserBody::from(props);
        let prior = ctx.output().map(|user| (user.id.clone(), user.created_at));
        let (action, response) = match (&prior, ctx.phase()) {
            (Some((id, _)), Phase::Update) => {
                ("updating", self.api.patch(&user_path(&props.org_id, id), &body))
            }
            _ => ("creating", self.api.post(&users_path(&props.org_id), &body)),
        };
        let response = response.inspect_err(|err| log::error!("Error {} user: {}", action, err))?;

        if !response.ok() {
            log::error!("Error {} user: {}", action, response.status_text());
            anyhow::bail!("API error: {}", response.status_text());
        }

        let data: UserRecord = response.json()?;
        let created_at = prior
            .map(|(_, created_at)| created_at)
            .unwrap_or_else(|| Utc::now().timestamp_millis());

        Ok(ctx.commit(User {
            id: data.id,
            org_id: props.org_id.clone(),
            first_name: data.first_name,
            last_name: data.last_name,
            fun_fact: data.fun_fact,
            created_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPlatform;
    use crate::transport::Method;
    use declarative::{Engine, Error, Registry, Scope, ScopeStatus, TeardownResult};

    type MockUser = UserResource<MockPlatform>;

    const ORG: &str = "fe110c72385f49a4ad721a26cdd0f730";

    fn props(first: &str, last: &str, fun_fact: Option<&str>) -> UserProps {
        UserProps {
            org_id: ORG.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            fun_fact: fun_fact.map(str::to_string),
        }
    }

    fn setup() -> (MockPlatform, Registry) {
        let mock = MockPlatform::new();
        let registry = Registry::new()
            .with(UserResource::new(mock.clone()))
            .unwrap();
        (mock, registry)
    }

    #[test]
    fn test_create_update_delete_round_trip() {
        let (mock, registry) = setup();
        let engine = Engine::new(&registry);
        let mut scope = Scope::new("test-user");
        let api = UserResource::new(mock.clone());

        // Create
        let user = engine
            .apply::<MockUser>(
                &mut scope,
                "test-user",
                &props("Test", "User", Some("I am a test user")),
            )
            .unwrap();
        assert!(!user.id.is_empty());
        assert_eq!(user.first_name, "Test");
        assert_eq!(user.last_name, "User");
        assert_eq!(user.fun_fact.as_deref(), Some("I am a test user"));

        let fetched = api.fetch(ORG, &user.id).unwrap().unwrap();
        assert_eq!(fetched.first_name, "Test");
        assert_eq!(fetched.fun_fact.as_deref(), Some("I am a test user"));

        // Update
        let updated = engine
            .apply::<MockUser>(
                &mut scope,
                "test-user",
                &props("Updated", "User", Some("I am an updated test user")),
            )
            .unwrap();
        assert_eq!(updated.id, user.id);
        assert_eq!(updated.first_name, "Updated");
        assert_eq!(updated.fun_fact.as_deref(), Some("I am an updated test user"));
        assert_eq!(updated.created_at, user.created_at);

        let fetched = api.fetch(ORG, &user.id).unwrap().unwrap();
        assert_eq!(fetched.first_name, "Updated");
        assert_eq!(fetched.fun_fact.as_deref(), Some("I am an updated test user"));

        // Update goes through PATCH, not a second POST
        assert_eq!(mock.requests_with(Method::Post).len(), 1);
        assert_eq!(mock.requests_with(Method::Patch).len(), 1);

        // Destroy
        let report = engine.destroy(&mut scope);
        assert!(report.is_success());
        assert_eq!(report.destroyed(), 1);
        assert_eq!(scope.status(), ScopeStatus::Destroyed);

        let response = mock.get(&user_path(ORG, &user.id)).unwrap();
        assert_eq!(response.status(), 404);
        assert!(api.fetch(ORG, &user.id).unwrap().is_none());
    }

    #[test]
    fn test_scenario_u1() {
        let (mock, registry) = setup();
        let engine = Engine::new(&registry);
        let mut scope = Scope::new("scenario");
        let org = UserProps {
            org_id: "org-1".to_string(),
            ..props("A", "B", None)
        };

        let created = engine.apply::<MockUser>(&mut scope, "u1", &org).unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.first_name, "A");

        let renamed = UserProps {
            first_name: "C".to_string(),
            ..org.clone()
        };
        let updated = engine.apply::<MockUser>(&mut scope, "u1", &renamed).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.first_name, "C");

        engine.destroy(&mut scope);
        assert_eq!(
            mock.get(&user_path("org-1", &created.id)).unwrap().status(),
            404
        );
    }

    #[test]
    fn test_identical_props_converge() {
        let (_mock, registry) = setup();
        let engine = Engine::new(&registry);
        let mut scope = Scope::new("idempotent");
        let desired = props("Same", "Person", None);

        let first = engine.apply::<MockUser>(&mut scope, "p", &desired).unwrap();
        let second = engine.apply::<MockUser>(&mut scope, "p", &desired).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_create_failure_commits_nothing() {
        let (mock, registry) = setup();
        let engine = Engine::new(&registry);
        let mut scope = Scope::new("failing");

        mock.fail(Method::Post, 500);
        let err = engine
            .apply::<MockUser>(&mut scope, "u1", &props("A", "B", None))
            .unwrap_err();
        assert!(matches!(err, Error::Reconcile { phase: Phase::Create, .. }));
        assert!(err.to_string().contains("API error: Internal Server Error"));
        assert!(scope.is_empty());

        // Retry after the platform recovers
        mock.clear_failure(Method::Post);
        engine
            .apply::<MockUser>(&mut scope, "u1", &props("A", "B", None))
            .unwrap();
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn test_update_failure_keeps_prior_output() {
        let (mock, registry) = setup();
        let engine = Engine::new(&registry);
        let mut scope = Scope::new("failing-update");

        let user = engine
            .apply::<MockUser>(&mut scope, "u1", &props("A", "B", None))
            .unwrap();

        mock.fail(Method::Patch, 503);
        let err = engine
            .apply::<MockUser>(&mut scope, "u1", &props("C", "B", None))
            .unwrap_err();
        assert_eq!(err.phase(), Some(Phase::Update));
        assert!(err.to_string().contains("API error: Service Unavailable"));
        assert!(!err.is_configuration());

        let stored: User = scope.get("u1").unwrap().output_as().unwrap().unwrap();
        assert_eq!(stored, user);
    }

    #[test]
    fn test_delete_failure_does_not_block_teardown() {
        let (mock, registry) = setup();
        let engine = Engine::new(&registry);
        let mut scope = Scope::new("multi");

        for (id, first) in [("a", "Ann"), ("b", "Bob"), ("c", "Cid")] {
            engine
                .apply::<MockUser>(&mut scope, id, &props(first, "User", None))
                .unwrap();
        }

        mock.fail(Method::Delete, 500);
        let report = engine.destroy(&mut scope);

        // The handler swallows the 500 and commits destruction for everyone
        assert_eq!(report.total(), 3);
        assert_eq!(report.destroyed(), 3);
        assert_eq!(
            report.entries.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            vec!["c", "b", "a"]
        );
        assert!(scope.is_empty());
        assert_eq!(mock.requests_with(Method::Delete).len(), 3);
        // The external users survive the failed deletes
        assert_eq!(mock.user_count(), 3);
    }

    #[test]
    fn test_delete_tolerates_already_gone() {
        let (mock, registry) = setup();
        let engine = Engine::new(&registry);
        let mut scope = Scope::new("gone");

        let user = engine
            .apply::<MockUser>(&mut scope, "u1", &props("A", "B", None))
            .unwrap();
        mock.remove_user(ORG, &user.id);

        let result = engine.delete(&mut scope, "u1").unwrap();
        assert_eq!(result, TeardownResult::Destroyed);
        assert!(scope.is_empty());
    }

    #[test]
    fn test_remove_reports_status() {
        let (mock, registry) = setup();
        let engine = Engine::new(&registry);
        let mut scope = Scope::new("remove");
        let api = UserResource::new(mock.clone());

        let user = engine
            .apply::<MockUser>(&mut scope, "u1", &props("A", "B", None))
            .unwrap();

        mock.fail(Method::Delete, 503);
        let err = api.remove(ORG, &user.id).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.category(), crate::ErrorCategory::Network);

        mock.clear_failure(Method::Delete);
        assert!(api.remove(ORG, &user.id).unwrap());
        assert!(!api.remove(ORG, &user.id).unwrap());
    }

    #[test]
    fn test_optional_fields_are_forwarded() {
        let (mock, registry) = setup();
        let engine = Engine::new(&registry);
        let mut scope = Scope::new("fun");

        let user = engine
            .apply::<MockUser>(&mut scope, "u1", &props("A", "B", None))
            .unwrap();
        assert!(user.fun_fact.is_none());

        let user = engine
            .apply::<MockUser>(&mut scope, "u1", &props("A", "B", Some("juggles")))
            .unwrap();
        assert_eq!(user.fun_fact.as_deref(), Some("juggles"));
        assert_eq!(
            mock.user(ORG, &user.id).unwrap().fun_fact.as_deref(),
            Some("juggles")
        );
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let value = serde_json::to_value(props("A", "B", None)).unwrap();
        assert_eq!(value["orgId"], ORG);
        assert_eq!(value["firstName"], "A");
        assert!(value.get("funFact").is_none());

        let body = serde_json::to_value(UserBody::from(&props("A", "B", Some("x")))).unwrap();
        assert_eq!(body, serde_json::json!({"firstName": "A", "lastName": "B", "funFact": "x"}));
    }
}
