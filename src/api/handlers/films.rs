use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    api::AppState,
    error::AppResult,
    models::{DirectorId, Film, FilmId, FilmPayload, GenreId, UserId},
};

const DEFAULT_POPULAR_COUNT: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularQuery {
    count: Option<usize>,
    genre_id: Option<GenreId>,
    year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonQuery {
    user_id: UserId,
    friend_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorQuery {
    #[serde(default = "default_sort")]
    sort_by: String,
}

fn default_sort() -> String {
    "year".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    query: String,
    #[serde(default)]
    by: String,
}

pub async fn list_films(State(state): State<AppState>) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.films.find_all().await?))
}

pub async fn get_film(
    State(state): State<AppState>,
    Path(id): Path<FilmId>,
) -> AppResult<Json<Film>> {
    Ok(Json(state.films.find_by_id(id).await?))
}

pub async fn create_film(
    State(state): State<AppState>,
    Json(payload): Json<FilmPayload>,
) -> AppResult<(StatusCode, Json<Film>)> {
    let film = state.films.create(payload).await?;
    Ok((StatusCode::CREATED, Json(film)))
}

pub async fn update_film(
    State(state): State<AppState>,
    Json(payload): Json<FilmPayload>,
) -> AppResult<Json<Film>> {
    Ok(Json(state.films.update(payload).await?))
}

pub async fn delete_film(
    State(state): State<AppState>,
    Path(id): Path<FilmId>,
) -> AppResult<StatusCode> {
    state.films.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(FilmId, UserId)>,
) -> AppResult<StatusCode> {
    state.films.add_like(id, user_id).await?;
    Ok(StatusCode::OK)
}

pub async fn remove_like(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(FilmId, UserId)>,
) -> AppResult<StatusCode> {
    state.films.remove_like(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn popular(
    State(state): State<AppState>,
    Query(params): Query<PopularQuery>,
) -> AppResult<Json<Vec<Film>>> {
    let count = params.count.unwrap_or(DEFAULT_POPULAR_COUNT);
    let films = state
        .films
        .top_popular_films(count, params.genre_id, params.year)
        .await?;
    Ok(Json(films))
}

pub async fn common(
    State(state): State<AppState>,
    Query(params): Query<CommonQuery>,
) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(
        state.films.common_films(params.user_id, params.friend_id).await?,
    ))
}

pub async fn by_director(
    State(state): State<AppState>,
    Path(director_id): Path<DirectorId>,
    Query(params): Query<DirectorQuery>,
) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(
        state.films.director_films(director_id, &params.sort_by).await?,
    ))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.films.search(&params.query, &params.by).await?))
}
