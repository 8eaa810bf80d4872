pub mod scope;
pub mod user;

use anyhow::Result;
use declarative::Registry;
use platform::{ApiClient, ApiOptions, UserResource};

use crate::Context;

/// The User resource as wired to the real platform
pub type UserApi = UserResource<ApiClient>;

/// Build the API client from the effective settings
pub fn api_client(ctx: &Context) -> ApiClient {
    let mut options = ApiOptions::default();
    if let Some(url) = &ctx.settings.api_url {
        options = options.api_url(url.clone());
    }
    if let Some(timeout) = ctx.settings.timeout {
        options = options.timeout(timeout);
    }
    ApiClient::new(options)
}

/// Registry with every resource type this binary knows about
pub fn registry(ctx: &Context) -> Result<Registry> {
    let registry = Registry::new().with(UserResource::new(api_client(ctx)))?;
    log::debug!("Registered resource types: {:?}", registry.types().collect::<Vec<_>>());
    Ok(registry)
}
