//! Example-platform provider for the declarative engine.
//!
//! This crate exposes the `example-platform::User` resource and the
//! transport it talks through:
//!
//! - [`ApiClient`] - blocking HTTP client over `ureq`
//! - [`MockPlatform`] - in-memory platform for tests
//! - [`UserResource`] - the resource handler, generic over [`Transport`]
//!
//! # Example
//!
//! ```ignore
//! use declarative::{Engine, Registry, Scope};
//! use platform::{ApiClient, UserProps, UserResource};
//!
//! let registry = Registry::new().with(UserResource::new(ApiClient::from_env()))?;
//! let engine = Engine::new(&registry);
//! let mut scope = Scope::new("onboarding");
//!
//! let props = UserProps {
//!     org_id: "fe110c72385f49a4ad721a26cdd0f730".into(),
//!     first_name: "John".into(),
//!     last_name: "Doe".into(),
//!     fun_fact: None,
//! };
//! let user = engine.apply::<UserResource<ApiClient>>(&mut scope, "john-doe", &props)?;
//! println!("created {}", user.id);
//!
//! engine.destroy(&mut scope);
//! ```

#![warn(missing_docs)]

mod client;
mod error;
mod mock;
mod transport;
mod user;

pub use client::{API_URL_ENV, ApiClient, ApiOptions, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use error::{Error, ErrorCategory, Result};
pub use mock::{MockPlatform, RecordedRequest, StoredUser};
pub use transport::{DEFAULT_HEADERS, Method, Request, Response, Transport, reason_phrase};
pub use user::{User, UserProps, UserRecord, UserResource, user_path, users_path};
