use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::auth::extractors::CurrentUser;
use crate::auth::repo::{is_unique_violation, Role, User};
use crate::error::{ApiError, ApiResult};
use crate::reviews::dto::{validate_rating, CreateReviewRequest, UpdateReviewRequest};
use crate::reviews::repo::Review;
use crate::state::AppState;
use crate::tours::repo::Tour;

/// Non-admin authors may only touch their own reviews.
fn may_modify(user: &User, review: &Review) -> bool {
    user.role == Role::Admin || review.user_id == user.id
}

#[instrument(skip(state))]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(tour_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Review>>> {
    let reviews = Review::list_by_tour(&state.db, tour_id)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(reviews))
}

#[instrument(skip(state, user, payload))]
pub async fn create_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(tour_id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    if !validate_rating(payload.rating) {
        return Err(ApiError::Validation("rating must be between 1 and 5".into()));
    }
    if payload.body.trim().is_empty() {
        return Err(ApiError::Validation("review must not be empty".into()));
    }

    Tour::find_by_id(&state.db, tour_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("no tour found with that id".into()))?;

    // The author is always the caller, never a client-supplied id.
    let review = Review::create(&state.db, tour_id, user.id, payload.rating, payload.body.trim())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("you have already reviewed this tour".into())
            } else {
                error!(error = %e, "create review failed");
                ApiError::internal(e)
            }
        })?;

    info!(review_id = %review.id, user_id = %user.id, "review created");
    Ok((StatusCode::CREATED, Json(review)))
}

#[instrument(skip(state, user, payload))]
pub async fn update_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReviewRequest>,
) -> ApiResult<Json<Review>> {
    let review = Review::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("no review found with that id".into()))?;
    if !may_modify(&user, &review) {
        return Err(ApiError::Forbidden);
    }

    let rating = payload.rating.unwrap_or(review.rating);
    if !validate_rating(rating) {
        return Err(ApiError::Validation("rating must be between 1 and 5".into()));
    }
    let body = payload.body.as_deref().unwrap_or(&review.body);

    let review = Review::update(&state.db, id, rating, body)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(review))
}

#[instrument(skip(state, user))]
pub async fn delete_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let review = Review::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("no review found with that id".into()))?;
    if !may_modify(&user, &review) {
        return Err(ApiError::Forbidden);
    }

    Review::delete(&state.db, id)
        .await
        .map_err(ApiError::internal)?;
    info!(review_id = %id, user_id = %user.id, "review deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn user_with_role(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Reviewer".into(),
            email: "reviewer@example.com".into(),
            password_hash: "$argon2id$fake".into(),
            role,
            password_changed_at: None,
            password_reset_token_hash: None,
            password_reset_expires_at: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn review_by(user_id: Uuid) -> Review {
        Review {
            id: Uuid::new_v4(),
            tour_id: Uuid::new_v4(),
            user_id,
            rating: 4,
            body: "great views".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn authors_may_modify_their_own_reviews() {
        let user = user_with_role(Role::User);
        assert!(may_modify(&user, &review_by(user.id)));
    }

    #[test]
    fn strangers_may_not_modify_foreign_reviews() {
        let user = user_with_role(Role::User);
        assert!(!may_modify(&user, &review_by(Uuid::new_v4())));
    }

    #[test]
    fn admins_may_modify_any_review() {
        let admin = user_with_role(Role::Admin);
        assert!(may_modify(&admin, &review_by(Uuid::new_v4())));
    }
}
