use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::AppState,
    error::AppResult,
    models::{Director, DirectorId, DirectorPayload, Genre, GenreId, Mpa, MpaId},
};

pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.catalog.genres().await?))
}

pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<GenreId>,
) -> AppResult<Json<Genre>> {
    Ok(Json(state.catalog.genre(id).await?))
}

pub async fn list_ratings(State(state): State<AppState>) -> AppResult<Json<Vec<Mpa>>> {
    Ok(Json(state.catalog.ratings().await?))
}

pub async fn get_rating(
    State(state): State<AppState>,
    Path(id): Path<MpaId>,
) -> AppResult<Json<Mpa>> {
    Ok(Json(state.catalog.rating(id).await?))
}

pub async fn list_directors(State(state): State<AppState>) -> AppResult<Json<Vec<Director>>> {
    Ok(Json(state.catalog.directors().await?))
}

pub async fn get_director(
    State(state): State<AppState>,
    Path(id): Path<DirectorId>,
) -> AppResult<Json<Director>> {
    Ok(Json(state.catalog.director(id).await?))
}

pub async fn create_director(
    State(state): State<AppState>,
    Json(payload): Json<DirectorPayload>,
) -> AppResult<(StatusCode, Json<Director>)> {
    let director = state.catalog.create_director(payload).await?;
    Ok((StatusCode::CREATED, Json(director)))
}

pub async fn update_director(
    State(state): State<AppState>,
    Json(payload): Json<DirectorPayload>,
) -> AppResult<Json<Director>> {
    Ok(Json(state.catalog.update_director(payload).await?))
}

pub async fn delete_director(
    State(state): State<AppState>,
    Path(id): Path<DirectorId>,
) -> AppResult<StatusCode> {
    state.catalog.delete_director(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
