use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::auth::repo::User;
use crate::bookings::repo::Booking;
use crate::bookings::webhook::{
    minor_units_to_price, CheckoutSessionObject, WebhookEvent, CHECKOUT_COMPLETED,
};
use crate::state::AppState;
use crate::tours::repo::Tour;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("checkout session is missing a usable {0}")]
    IncompleteSession(&'static str),
    #[error("no user matches the session's customer email")]
    UnknownUser,
    #[error("no tour matches the session's client reference")]
    UnknownTour,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug)]
pub enum Outcome {
    Booked(Booking),
    Duplicate,
    Ignored,
}

/// Turn a verified gateway event into at most one booking.
///
/// The purchasing user is resolved from the gateway's copy of the customer
/// email, never from client-supplied ids, so a booking can only come into
/// existence through a session the gateway actually completed.
pub async fn process_event(
    state: &AppState,
    event: &WebhookEvent,
) -> Result<Outcome, ReconcileError> {
    if event.kind != CHECKOUT_COMPLETED {
        return Ok(Outcome::Ignored);
    }

    let session: CheckoutSessionObject = serde_json::from_value(event.data.object.clone())
        .map_err(|_| ReconcileError::IncompleteSession("session object"))?;
    let email = session
        .buyer_email()
        .ok_or(ReconcileError::IncompleteSession("customer email"))?;
    let tour_id = session
        .client_reference_id
        .as_deref()
        .and_then(|reference| Uuid::parse_str(reference).ok())
        .ok_or(ReconcileError::IncompleteSession("client reference"))?;
    let amount_total = session
        .amount_total
        .ok_or(ReconcileError::IncompleteSession("charged amount"))?;

    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or(ReconcileError::UnknownUser)?;
    let tour = Tour::find_by_id(&state.db, tour_id)
        .await?
        .ok_or(ReconcileError::UnknownTour)?;

    match Booking::create_idempotent(
        &state.db,
        tour.id,
        user.id,
        minor_units_to_price(amount_total),
        &session.id,
    )
    .await?
    {
        Some(booking) => {
            info!(
                booking_id = %booking.id,
                tour_id = %tour.id,
                user_id = %user.id,
                session_id = %session.id,
                "booking created from completed checkout"
            );
            Ok(Outcome::Booked(booking))
        }
        None => {
            info!(session_id = %session.id, "duplicate checkout completion ignored");
            Ok(Outcome::Duplicate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::webhook::EventData;

    fn event(kind: &str, object: serde_json::Value) -> WebhookEvent {
        WebhookEvent {
            id: "evt_test".into(),
            kind: kind.into(),
            data: EventData { object },
        }
    }

    #[tokio::test]
    async fn foreign_event_types_are_ignored_without_touching_the_store() {
        // The fake state's pool is lazy; an ignored event must never hit it.
        let state = AppState::fake();
        let outcome = process_event(&state, &event("invoice.paid", serde_json::json!({})))
            .await
            .expect("ignored events are not errors");
        assert!(matches!(outcome, Outcome::Ignored));
    }

    #[tokio::test]
    async fn completed_session_without_email_is_incomplete() {
        let state = AppState::fake();
        let err = process_event(
            &state,
            &event(
                CHECKOUT_COMPLETED,
                serde_json::json!({
                    "id": "cs_1",
                    "client_reference_id": "3f6b5a0e-6a15-4bb4-9d1e-0f0f0f0f0f0f",
                    "amount_total": 5000
                }),
            ),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::IncompleteSession("customer email")
        ));
    }

    #[tokio::test]
    async fn completed_session_with_garbage_reference_is_incomplete() {
        let state = AppState::fake();
        let err = process_event(
            &state,
            &event(
                CHECKOUT_COMPLETED,
                serde_json::json!({
                    "id": "cs_1",
                    "client_reference_id": "not-a-uuid",
                    "customer_details": {"email": "hiker@example.com"},
                    "amount_total": 5000
                }),
            ),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::IncompleteSession("client reference")
        ));
    }

    #[tokio::test]
    async fn completed_session_without_amount_is_incomplete() {
        let state = AppState::fake();
        let err = process_event(
            &state,
            &event(
                CHECKOUT_COMPLETED,
                serde_json::json!({
                    "id": "cs_1",
                    "client_reference_id": "3f6b5a0e-6a15-4bb4-9d1e-0f0f0f0f0f0f",
                    "customer_details": {"email": "hiker@example.com"}
                }),
            ),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::IncompleteSession("charged amount")
        ));
    }
}
