use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Only the fields the booking flow consumes; itineraries, guides and
/// imagery beyond the cover are out of scope.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tour {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub summary: String,
    pub price: f64,
    pub image_cover: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Tour {
    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Tour>> {
        let rows = sqlx::query_as::<_, Tour>(
            r#"
            SELECT id, name, slug, summary, price, image_cover, created_at
            FROM tours
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Tour>> {
        let tour = sqlx::query_as::<_, Tour>(
            r#"
            SELECT id, name, slug, summary, price, image_cover, created_at
            FROM tours
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(tour)
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        slug: &str,
        summary: &str,
        price: f64,
        image_cover: Option<&str>,
    ) -> anyhow::Result<Tour> {
        let tour = sqlx::query_as::<_, Tour>(
            r#"
            INSERT INTO tours (name, slug, summary, price, image_cover)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, slug, summary, price, image_cover, created_at
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(summary)
        .bind(price)
        .bind(image_cover)
        .fetch_one(db)
        .await?;
        Ok(tour)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
