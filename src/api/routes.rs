use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{self, catalog, films, reviews, users};
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(user_routes())
        .merge(film_routes())
        .merge(review_routes())
        .merge(catalog_routes())
        // request ids are assigned before the trace span is opened
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(users::list_users)
                .post(users::create_user)
                .put(users::update_user),
        )
        .route("/users/:id", get(users::get_user).delete(users::delete_user))
        .route("/users/:id/friends", get(users::friends))
        .route(
            "/users/:id/friends/:friend_id",
            put(users::add_friend).delete(users::remove_friend),
        )
        .route("/users/:id/friends/common/:other_id", get(users::common_friends))
        .route("/users/:id/feed", get(users::feed))
        .route("/users/:id/recommendations", get(users::recommendations))
}

fn film_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/films",
            get(films::list_films)
                .post(films::create_film)
                .put(films::update_film),
        )
        .route("/films/popular", get(films::popular))
        .route("/films/common", get(films::common))
        .route("/films/search", get(films::search))
        .route("/films/director/:director_id", get(films::by_director))
        .route("/films/:id", get(films::get_film).delete(films::delete_film))
        .route(
            "/films/:id/like/:user_id",
            put(films::add_like).delete(films::remove_like),
        )
}

fn review_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reviews",
            get(reviews::list_reviews)
                .post(reviews::create_review)
                .put(reviews::update_review),
        )
        .route(
            "/reviews/:id",
            get(reviews::get_review).delete(reviews::delete_review),
        )
        .route(
            "/reviews/:id/like/:user_id",
            put(reviews::add_like).delete(reviews::remove_like),
        )
        .route(
            "/reviews/:id/dislike/:user_id",
            put(reviews::add_dislike).delete(reviews::remove_dislike),
        )
}

fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/genres", get(catalog::list_genres))
        .route("/genres/:id", get(catalog::get_genre))
        .route("/mpa", get(catalog::list_ratings))
        .route("/mpa/:id", get(catalog::get_rating))
        .route(
            "/directors",
            get(catalog::list_directors)
                .post(catalog::create_director)
                .put(catalog::update_director),
        )
        .route(
            "/directors/:id",
            get(catalog::get_director).delete(catalog::delete_director),
        )
}
