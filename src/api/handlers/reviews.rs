use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    api::AppState,
    error::AppResult,
    models::{FilmId, Review, ReviewId, ReviewPayload, UserId},
};

const DEFAULT_REVIEW_COUNT: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsQuery {
    film_id: Option<FilmId>,
    count: Option<usize>,
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Query(params): Query<ReviewsQuery>,
) -> AppResult<Json<Vec<Review>>> {
    let count = params.count.unwrap_or(DEFAULT_REVIEW_COUNT);
    Ok(Json(state.reviews.find_all(params.film_id, count).await?))
}

pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.find_by_id(id).await?))
}

pub async fn create_review(
    State(state): State<AppState>,
    Json(payload): Json<ReviewPayload>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = state.reviews.create(payload).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn update_review(
    State(state): State<AppState>,
    Json(payload): Json<ReviewPayload>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.update(payload).await?))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> AppResult<StatusCode> {
    state.reviews.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(ReviewId, UserId)>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.add_like(id, user_id).await?))
}

pub async fn remove_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(ReviewId, UserId)>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.remove_like(id, user_id).await?))
}

pub async fn add_dislike(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(ReviewId, UserId)>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.add_dislike(id, user_id).await?))
}

pub async fn remove_dislike(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(ReviewId, UserId)>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.reviews.remove_dislike(id, user_id).await?))
}
