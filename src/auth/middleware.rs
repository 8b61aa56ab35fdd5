use axum::extract::{FromRef, Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::auth::extractors::CurrentUser;
use crate::auth::jwt::JwtKeys;
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Cookie that mirrors the bearer token for browser clients.
pub const TOKEN_COOKIE: &str = "jwt";

/// Bearer token from the Authorization header, else the session cookie.
pub(crate) fn extract_token(headers: &HeaderMap) -> Option<String> {
    let header_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(|t| t.to_string());
    if header_token.is_some() {
        return header_token;
    }
    CookieJar::from_headers(headers)
        .get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
}

/// Verify the token, resolve its subject, and reject tokens minted before
/// the subject's last password change.
async fn resolve_user(state: &AppState, token: &str) -> Result<User, ApiError> {
    let claims = JwtKeys::from_ref(state).verify(token)?;
    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::Unauthenticated(
            "the user belonging to this token no longer exists",
        ))?;
    if user.changed_password_after(claims.iat as i64) {
        return Err(ApiError::Unauthenticated(
            "password was changed recently, please log in again",
        ));
    }
    Ok(user)
}

/// Hard gate: the request proceeds authenticated or not at all.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers()).ok_or(ApiError::Unauthenticated(
        "you are not logged in, please log in to get access",
    ))?;
    let user = resolve_user(&state, &token).await?;
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Soft gate: attaches the user when a usable token is present, proceeds
/// anonymously otherwise. Never rejects.
pub async fn maybe_authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(req.headers()) {
        match resolve_user(&state, &token).await {
            Ok(user) => {
                req.extensions_mut().insert(CurrentUser(user));
            }
            Err(err) => debug!(error = %err, "visitor token unusable, continuing anonymously"),
        }
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn prefers_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer header-token"),
        );
        headers.insert(header::COOKIE, HeaderValue::from_static("jwt=cookie-token"));
        assert_eq!(extract_token(&headers).as_deref(), Some("header-token"));
    }

    #[test]
    fn falls_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("jwt=cookie-token"));
        assert_eq!(extract_token(&headers).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn ignores_non_bearer_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn absent_everywhere_is_none() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }
}
