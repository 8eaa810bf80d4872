//! In-memory example platform for testing without network access.
//!
//! [`MockPlatform`] serves the user endpoints the [`UserResource`] relies on:
//!
//! | Method | Path                     | Success |
//! |--------|--------------------------|---------|
//! | POST   | `/org/{org}/users`       | 201     |
//! | GET    | `/org/{org}/user/{id}`   | 200     |
//! | PATCH  | `/org/{org}/user/{id}`   | 200     |
//! | DELETE | `/org/{org}/user/{id}`   | 204     |
//!
//! Unknown users answer 404 and unknown routes answer 404 as well.
//! Failures can be injected per method to exercise error handling.
//!
//! [`UserResource`]: crate::UserResource

use crate::error::Result;
use crate::transport::{Method, Request, Response, Transport};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// A user record as stored by the mock platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    /// Platform-assigned id.
    pub id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Optional fun fact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fun_fact: Option<String>,
}

/// A request as seen by the mock platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Request method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Effective headers after merging defaults.
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct State {
    /// Users keyed by (org, id).
    users: HashMap<(String, String), StoredUser>,
    next_id: u64,
    requests: Vec<RecordedRequest>,
    failures: HashMap<Method, u16>,
}

/// Mock platform for testing without network access.
///
/// Clones share state, so a test can hand one clone to a resource and keep
/// another to inspect what happened.
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
    state: Arc<Mutex<State>>,
}

impl MockPlatform {
    /// Create an empty mock platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request with `method` using `status` until cleared.
    pub fn fail(&self, method: Method, status: u16) {
        self.state.lock().unwrap().failures.insert(method, status);
    }

    /// Stop injecting failures for `method`.
    pub fn clear_failure(&self, method: Method) {
        self.state.lock().unwrap().failures.remove(&method);
    }

    /// Look up a stored user.
    #[must_use]
    pub fn user(&self, org_id: &str, id: &str) -> Option<StoredUser> {
        let state = self.state.lock().unwrap();
        state
            .users
            .get(&(org_id.to_string(), id.to_string()))
            .cloned()
    }

    /// Number of stored users across all orgs.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    /// Remove a user behind the resource's back.
    pub fn remove_user(&self, org_id: &str, id: &str) -> Option<StoredUser> {
        let mut state = self.state.lock().unwrap();
        state.users.remove(&(org_id.to_string(), id.to_string()))
    }

    /// All requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Requests received with `method`.
    #[must_use]
    pub fn requests_with(&self, method: Method) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }
}

impl Transport for MockPlatform {
    fn send(&self, request: Request) -> Result<Response> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method: request.method(),
            path: request.path().to_string(),
            headers: request.effective_headers(),
        });

        if let Some(status) = state.failures.get(&request.method()) {
            return Ok(Response::new(*status, json!({ "error": "injected" }).to_string()));
        }

        let segments: Vec<&str> = request
            .path()
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let response = match (request.method(), segments.as_slice()) {
            (Method::Post, ["org", org, "users"]) => create_user(&mut state, org, request.body()),
            (Method::Get, ["org", org, "user", id]) => match state.users.get(&key(org, id)) {
                Some(user) => json_response(200, user),
                None => not_found(),
            },
            (Method::Patch, ["org", org, "user", id]) => {
                patch_user(&mut state, org, id, request.body())
            }
            (Method::Delete, ["org", org, "user", id]) => {
                match state.users.remove(&key(org, id)) {
                    Some(_) => Response::new(204, Vec::new()),
                    None => not_found(),
                }
            }
            _ => not_found(),
        };

        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserFields {
    first_name: Option<String>,
    last_name: Option<String>,
    fun_fact: Option<String>,
}

fn create_user(state: &mut State, org: &str, body: Option<&[u8]>) -> Response {
    let Some(fields) = parse_fields(body) else {
        return bad_request();
    };
    let (Some(first_name), Some(last_name)) = (fields.first_name, fields.last_name) else {
        return bad_request();
    };

    state.next_id += 1;
    let user = StoredUser {
        id: format!("{:032x}", state.next_id),
        first_name,
        last_name,
        fun_fact: fields.fun_fact,
    };
    state.users.insert(key(org, &user.id), user.clone());
    json_response(201, &user)
}

fn patch_user(state: &mut State, org: &str, id: &str, body: Option<&[u8]>) -> Response {
    let Some(fields) = parse_fields(body) else {
        return bad_request();
    };
    let Some(user) = state.users.get_mut(&key(org, id)) else {
        return not_found();
    };

    if let Some(first_name) = fields.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = fields.last_name {
        user.last_name = last_name;
    }
    if fields.fun_fact.is_some() {
        user.fun_fact = fields.fun_fact;
    }
    json_response(200, user)
}

fn parse_fields(body: Option<&[u8]>) -> Option<UserFields> {
    serde_json::from_slice(body?).ok()
}

fn key(org: &str, id: &str) -> (String, String) {
    (org.to_string(), id.to_string())
}

fn json_response<T: Serialize>(status: u16, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => Response::new(status, body),
        Err(_) => Response::new(500, Vec::new()),
    }
}

fn not_found() -> Response {
    Response::new(404, json!({ "error": "not found" }).to_string())
}

fn bad_request() -> Response {
    Response::new(400, json!({ "error": "bad request" }).to_string())
}
