use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::repo::User;
use crate::error::ApiError;

/// The user resolved by the `authenticate` middleware. Extracting this on a
/// route that is not behind that middleware is a wiring bug, not a client
/// error, and surfaces as a 500.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            ApiError::internal(anyhow::anyhow!(
                "CurrentUser extracted on a route without the authenticate middleware"
            ))
        })
    }
}

/// Soft variant for routes behind `maybe_authenticate`; never rejects.
#[derive(Debug)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts
                .extensions
                .get::<CurrentUser>()
                .cloned()
                .map(|CurrentUser(user)| user),
        ))
    }
}
