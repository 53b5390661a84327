use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use tracing::info;

use crate::config::Config;
use crate::error::ApiError;

/// The verified identity of the caller, as asserted by the authenticating
/// proxy through the configured request header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

impl Caller {
    pub fn identity(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    Config: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Config::from_ref(state);
        let identity = parts
            .headers
            .get(&config.auth.identity_header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match identity {
            Some(identity) => Ok(Caller(identity.to_owned())),
            None => {
                info!("login required: {} {}", parts.method, parts.uri.path());
                Err(ApiError::Unauthenticated)
            }
        }
    }
}
