use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Coarse-grained permission tag used for route-level authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "user_role", rename_all = "kebab-case")]
pub enum Role {
    User,
    Guide,
    LeadGuide,
    Admin,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub password_changed_at: Option<OffsetDateTime>,
    #[serde(skip_serializing)]
    pub password_reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub password_reset_expires_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, password_changed_at, \
     password_reset_token_hash, password_reset_expires_at, created_at";

impl User {
    /// True when the password changed after the given token issue time, so
    /// the token must be re-issued.
    pub fn changed_password_after(&self, issued_at: i64) -> bool {
        match self.password_changed_at {
            Some(changed) => issued_at < changed.unix_timestamp(),
            None => false,
        }
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Looks up a user holding a non-expired reset token with this hash.
    pub async fn find_by_reset_token_hash(
        db: &PgPool,
        token_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE password_reset_token_hash = $1 AND password_reset_expires_at > now()"
        ))
        .bind(token_hash)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// New accounts always start with the default role.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash) \
             VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn set_reset_token(
        db: &PgPool,
        id: Uuid,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users \
             SET password_reset_token_hash = $2, password_reset_expires_at = $3 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Compensation path for a failed reset-mail send: both fields drop
    /// together so no undeliverable token stays usable.
    pub async fn clear_reset_token(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users \
             SET password_reset_token_hash = NULL, password_reset_expires_at = NULL \
             WHERE id = $1",
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Single statement so the reset token cannot survive a password change.
    pub async fn update_password(
        db: &PgPool,
        id: Uuid,
        password_hash: &str,
        changed_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users \
             SET password_hash = $2, password_changed_at = $3, \
                 password_reset_token_hash = NULL, password_reset_expires_at = NULL \
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .bind(changed_at)
        .execute(db)
        .await?;
        Ok(())
    }
}

/// Postgres unique-constraint violation, used to map races on unique columns
/// to a conflict response instead of a 500.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .map(|e| match e {
            sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
            _ => false,
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_changed_at(changed: Option<OffsetDateTime>) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test Hiker".into(),
            email: "hiker@example.com".into(),
            password_hash: "$argon2id$fake".into(),
            role: Role::User,
            password_changed_at: changed,
            password_reset_token_hash: None,
            password_reset_expires_at: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn tokens_survive_when_password_never_changed() {
        let user = user_with_changed_at(None);
        assert!(!user.changed_password_after(0));
    }

    #[test]
    fn tokens_issued_before_password_change_are_stale() {
        let now = OffsetDateTime::now_utc();
        let user = user_with_changed_at(Some(now));
        assert!(user.changed_password_after(now.unix_timestamp() - 60));
    }

    #[test]
    fn tokens_issued_after_password_change_stay_valid() {
        let now = OffsetDateTime::now_utc();
        let user = user_with_changed_at(Some(now));
        assert!(!user.changed_password_after(now.unix_timestamp() + 60));
    }

    #[test]
    fn password_hash_never_serializes() {
        let user = user_with_changed_at(None);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn role_serializes_kebab_case() {
        assert_eq!(serde_json::to_string(&Role::LeadGuide).unwrap(), "\"lead-guide\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }
}
