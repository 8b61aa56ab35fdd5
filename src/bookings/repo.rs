use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub user_id: Uuid,
    pub price: f64,
    pub checkout_session_id: String,
    pub paid: bool,
    pub created_at: OffsetDateTime,
}

impl Booking {
    /// Insert keyed on the checkout session id. Returns `None` when a booking
    /// for this session already exists, so racing duplicate webhook
    /// deliveries cannot create a second record.
    pub async fn create_idempotent(
        db: &PgPool,
        tour_id: Uuid,
        user_id: Uuid,
        price: f64,
        checkout_session_id: &str,
    ) -> anyhow::Result<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (tour_id, user_id, price, checkout_session_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (checkout_session_id) DO NOTHING
            RETURNING id, tour_id, user_id, price, checkout_session_id, paid, created_at
            "#,
        )
        .bind(tour_id)
        .bind(user_id)
        .bind(price)
        .bind(checkout_session_id)
        .fetch_optional(db)
        .await?;
        Ok(booking)
    }

    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, tour_id, user_id, price, checkout_session_id, paid, created_at
            FROM bookings
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

/// Durability ledger for events that verified but failed to reconcile; the
/// gateway is acked regardless, so this row is the only trace left behind.
pub async fn record_webhook_failure(
    db: &PgPool,
    event_id: &str,
    event_type: &str,
    payload: serde_json::Value,
    error: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO webhook_failures (event_id, event_type, payload, error)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(event_id)
    .bind(event_type)
    .bind(payload)
    .bind(error)
    .execute(db)
    .await?;
    Ok(())
}
