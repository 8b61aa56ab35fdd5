use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::auth::repo::is_unique_violation;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::tours::dto::{slugify, CreateTourRequest, Pagination};
use crate::tours::repo::Tour;

#[instrument(skip(state))]
pub async fn list_tours(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> ApiResult<Json<Vec<Tour>>> {
    let tours = Tour::list(&state.db, p.limit, p.offset)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(tours))
}

#[instrument(skip(state))]
pub async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Tour>> {
    let tour = Tour::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::NotFound("no tour found with that id".into()))?;
    Ok(Json(tour))
}

#[instrument(skip(state, payload))]
pub async fn create_tour(
    State(state): State<AppState>,
    Json(payload): Json<CreateTourRequest>,
) -> ApiResult<(StatusCode, Json<Tour>)> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("tour name must not be empty".into()));
    }
    if payload.price <= 0.0 {
        return Err(ApiError::Validation("tour price must be positive".into()));
    }

    let slug = slugify(&payload.name);
    let tour = Tour::create(
        &state.db,
        payload.name.trim(),
        &slug,
        payload.summary.as_deref().unwrap_or(""),
        payload.price,
        payload.image_cover.as_deref(),
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("a tour with a similar name already exists".into())
        } else {
            error!(error = %e, "create tour failed");
            ApiError::internal(e)
        }
    })?;

    info!(tour_id = %tour.id, slug = %tour.slug, "tour created");
    Ok((StatusCode::CREATED, Json(tour)))
}

#[instrument(skip(state))]
pub async fn delete_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Tour::delete(&state.db, id)
        .await
        .map_err(ApiError::internal)?;
    if !deleted {
        return Err(ApiError::NotFound("no tour found with that id".into()));
    }
    info!(tour_id = %id, "tour deleted");
    Ok(StatusCode::NO_CONTENT)
}
