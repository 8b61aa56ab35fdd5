use axum::extract::{FromRef, Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use time::{Duration, OffsetDateTime};
use tracing::{error, info, instrument, warn};

use crate::auth::dto::{
    is_valid_email, AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse,
    PublicUser, ResetPasswordRequest, SessionResponse, SignupRequest, StatusResponse,
    UpdatePasswordRequest,
};
use crate::auth::extractors::{CurrentUser, MaybeUser};
use crate::auth::jwt::JwtKeys;
use crate::auth::middleware::TOKEN_COOKIE;
use crate::auth::repo::{is_unique_violation, User};
use crate::auth::{password, reset};
use crate::error::{ApiError, ApiResult};
use crate::mail::{MailKind, Mailer};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

fn validate_password(plain: &str) -> ApiResult<()> {
    if plain.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

/// Issue a token, mirror it into the session cookie, and shape the reply.
fn issue_session(
    state: &AppState,
    jar: CookieJar,
    user: &User,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let token = JwtKeys::from_ref(state)
        .sign(user.id)
        .map_err(ApiError::internal)?;
    let cookie = Cookie::build((TOKEN_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .max_age(Duration::days(state.config.jwt.ttl_days))
        .build();
    Ok((
        jar.add(cookie),
        Json(AuthResponse {
            status: "success",
            token,
            user: PublicUser::from(user),
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<SignupRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("invalid email".into()));
    }
    validate_password(&payload.password)?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }

    if User::find_by_email(&state.db, &payload.email)
        .await
        .map_err(ApiError::internal)?
        .is_some()
    {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("email already registered".into()));
    }

    let hash = password::hash(&payload.password).map_err(ApiError::internal)?;
    let user = User::create(&state.db, payload.name.trim(), &payload.email, &hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("email already registered".into())
            } else {
                error!(error = %e, "create user failed");
                ApiError::internal(e)
            }
        })?;

    // Best effort; a failed welcome mail must not lose the signup.
    let mailer = state.mailer.clone();
    let mail_user = user.clone();
    let url = format!("{}/me", state.config.public_url);
    tokio::spawn(async move {
        if let Err(err) = mailer.send(MailKind::Welcome, &mail_user, &url).await {
            warn!(error = %err, user_id = %mail_user.id, "welcome mail failed");
        }
    });

    info!(user_id = %user.id, email = %user.email, "user registered");
    let (jar, body) = issue_session(&state, jar, &user)?;
    Ok((StatusCode::CREATED, jar, body))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    payload.email = payload.email.trim().to_lowercase();

    let user = match User::find_by_email(&state.db, &payload.email)
        .await
        .map_err(ApiError::internal)?
    {
        Some(user) => user,
        None => {
            warn!(email = %payload.email, "login with unknown email");
            return Err(ApiError::Unauthenticated("incorrect email or password"));
        }
    };

    if !password::verify(&payload.password, &user.password_hash).map_err(ApiError::internal)? {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::Unauthenticated("incorrect email or password"));
    }

    info!(user_id = %user.id, "user logged in");
    issue_session(&state, jar, &user)
}

#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<StatusResponse>) {
    let cookie = Cookie::build(TOKEN_COOKIE).path("/").build();
    (jar.remove(cookie), Json(StatusResponse { status: "success" }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let email = payload.email.trim().to_lowercase();
    let user = User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("there is no user with this email address".into()))?;

    let token = reset::generate(state.config.reset_token_ttl_minutes);
    User::set_reset_token(&state.db, user.id, &token.hash, token.expires_at)
        .await
        .map_err(ApiError::internal)?;

    let url = format!(
        "{}/api/v1/users/reset-password/{}",
        state.config.public_url, token.plaintext
    );
    if let Err(err) = state.mailer.send(MailKind::PasswordReset, &user, &url).await {
        error!(error = %err, user_id = %user.id, "reset mail failed, rolling back token");
        // An undeliverable token must not stay usable.
        if let Err(clear_err) = User::clear_reset_token(&state.db, user.id).await {
            error!(error = %clear_err, user_id = %user.id, "reset token rollback failed");
        }
        return Err(ApiError::Dependency(
            "there was an error sending the email, try again later".into(),
        ));
    }

    info!(user_id = %user.id, "password reset token issued");
    Ok(Json(MessageResponse {
        status: "success",
        message: "token sent to email",
    }))
}

#[instrument(skip(state, jar, payload, token))]
pub async fn reset_password(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    validate_password(&payload.password)?;

    let user = User::find_by_reset_token_hash(&state.db, &reset::hash_token(&token))
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::Validation("token is invalid or has expired".into()))?;

    let hash = password::hash(&payload.password).map_err(ApiError::internal)?;
    // Timestamps carry second resolution; keep the token issued below valid.
    let changed_at = OffsetDateTime::now_utc() - Duration::seconds(1);
    User::update_password(&state.db, user.id, &hash, changed_at)
        .await
        .map_err(ApiError::internal)?;

    info!(user_id = %user.id, "password reset completed");
    issue_session(&state, jar, &user)
}

#[instrument(skip(state, jar, user, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    jar: CookieJar,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    if !password::verify(&payload.current_password, &user.password_hash)
        .map_err(ApiError::internal)?
    {
        warn!(user_id = %user.id, "password update with wrong current password");
        return Err(ApiError::Unauthenticated("your current password is wrong"));
    }
    validate_password(&payload.password)?;

    let hash = password::hash(&payload.password).map_err(ApiError::internal)?;
    let changed_at = OffsetDateTime::now_utc() - Duration::seconds(1);
    User::update_password(&state.db, user.id, &hash, changed_at)
        .await
        .map_err(ApiError::internal)?;

    info!(user_id = %user.id, "password updated");
    issue_session(&state, jar, &user)
}

#[instrument(skip(user))]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}

#[instrument(skip(user))]
pub async fn session(MaybeUser(user): MaybeUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: user.as_ref().map(PublicUser::from),
    })
}
