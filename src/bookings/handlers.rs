use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::auth::extractors::CurrentUser;
use crate::bookings::dto::{CheckoutSessionResponse, WebhookAck};
use crate::bookings::gateway::{CheckoutParams, PaymentGateway};
use crate::bookings::reconciler::{self, Outcome};
use crate::bookings::repo::{record_webhook_failure, Booking};
use crate::bookings::webhook::{verify_signature, WebhookEvent, SIGNATURE_HEADER};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::tours::repo::Tour;

#[instrument(skip(state, user))]
pub async fn checkout_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(tour_id): Path<Uuid>,
) -> ApiResult<Json<CheckoutSessionResponse>> {
    let tour = Tour::find_by_id(&state.db, tour_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("no tour found with that id".into()))?;

    let params = CheckoutParams {
        success_url: format!("{}/my-tours?alert=booking", state.config.public_url),
        cancel_url: format!("{}/tour/{}", state.config.public_url, tour.slug),
        customer_email: user.email.clone(),
        client_reference_id: tour.id.to_string(),
        product_name: format!("{} Tour", tour.name),
        description: tour.summary.clone(),
        amount_minor: (tour.price * 100.0).round() as i64,
        currency: state.config.stripe.currency.clone(),
    };

    let session = state
        .payments
        .create_checkout_session(params)
        .await
        .map_err(|e| {
            error!(error = %e, tour_id = %tour.id, "checkout session creation failed");
            ApiError::Dependency("payment provider is unavailable, try again later".into())
        })?;

    info!(session_id = %session.id, tour_id = %tour.id, user_id = %user.id, "checkout session issued");
    Ok(Json(CheckoutSessionResponse {
        status: "success",
        session,
    }))
}

#[instrument(skip(state, user))]
pub async fn my_bookings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Booking>>> {
    let bookings = Booking::list_by_user(&state.db, user.id)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(bookings))
}

/// Webhook entry point. The body must stay raw bytes until the signature is
/// verified. After verification the gateway is always acked; reconciliation
/// failures are recorded for asynchronous repair instead of triggering the
/// gateway's retry policy.
#[instrument(skip(state, headers, body))]
pub async fn webhook_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::InvalidSignature("missing signature header".into()))?;

    verify_signature(
        &body,
        signature,
        &state.config.stripe.webhook_secret,
        state.config.stripe.signature_tolerance_secs,
        OffsetDateTime::now_utc(),
    )
    .map_err(|e| {
        warn!(error = %e, "webhook rejected");
        ApiError::InvalidSignature(e.to_string())
    })?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidSignature(format!("unparseable event payload: {e}")))?;

    match reconciler::process_event(&state, &event).await {
        Ok(Outcome::Booked(_)) | Ok(Outcome::Duplicate) => {}
        Ok(Outcome::Ignored) => {
            info!(event_id = %event.id, kind = %event.kind, "webhook event ignored");
        }
        Err(err) => {
            error!(event_id = %event.id, error = %err, "webhook reconciliation failed");
            let payload = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
            if let Err(store_err) =
                record_webhook_failure(&state.db, &event.id, &event.kind, payload, &err.to_string())
                    .await
            {
                error!(error = %store_err, event_id = %event.id, "failed to record webhook failure");
            }
        }
    }

    Ok(Json(WebhookAck { received: true }))
}
