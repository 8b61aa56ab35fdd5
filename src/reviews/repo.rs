use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub body: String,
    pub created_at: OffsetDateTime,
}

impl Review {
    pub async fn list_by_tour(db: &PgPool, tour_id: Uuid) -> anyhow::Result<Vec<Review>> {
        let rows = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, tour_id, user_id, rating, body, created_at
            FROM reviews
            WHERE tour_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(tour_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, tour_id, user_id, rating, body, created_at
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(review)
    }

    pub async fn create(
        db: &PgPool,
        tour_id: Uuid,
        user_id: Uuid,
        rating: i32,
        body: &str,
    ) -> anyhow::Result<Review> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (tour_id, user_id, rating, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, tour_id, user_id, rating, body, created_at
            "#,
        )
        .bind(tour_id)
        .bind(user_id)
        .bind(rating)
        .bind(body)
        .fetch_one(db)
        .await?;
        Ok(review)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        rating: i32,
        body: &str,
    ) -> anyhow::Result<Review> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET rating = $2, body = $3
            WHERE id = $1
            RETURNING id, tour_id, user_id, rating, body, created_at
            "#,
        )
        .bind(id)
        .bind(rating)
        .bind(body)
        .fetch_one(db)
        .await?;
        Ok(review)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
