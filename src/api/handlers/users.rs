use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::AppState,
    error::AppResult,
    models::{Event, Film, Friendship, User, UserId, UserPayload},
};

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.find_all().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.find_by_id(id).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.users.create(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.update(payload).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> AppResult<StatusCode> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(UserId, UserId)>,
) -> AppResult<Json<Friendship>> {
    Ok(Json(state.users.add_friend(id, friend_id).await?))
}

pub async fn remove_friend(
    State(state): State<AppState>,
    Path((id, friend_id)): Path<(UserId, UserId)>,
) -> AppResult<StatusCode> {
    state.users.remove_friend(id, friend_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn friends(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.friends(id).await?))
}

pub async fn common_friends(
    State(state): State<AppState>,
    Path((id, other_id)): Path<(UserId, UserId)>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.common_friends(id, other_id).await?))
}

pub async fn feed(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(state.users.feed(id).await?))
}

pub async fn recommendations(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.users.recommend_films(id).await?))
}
