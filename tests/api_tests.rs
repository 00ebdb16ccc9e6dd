use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use filmorate_api::api::{create_router, AppState};

fn create_test_server() -> TestServer {
    let app = create_router(AppState::in_memory());
    TestServer::new(app).unwrap()
}

async fn create_user(server: &TestServer, login: &str) -> i64 {
    let response = server
        .post("/users")
        .json(&json!({
            "email": format!("{}@example.com", login),
            "login": login,
            "birthday": "1990-05-17"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

async fn create_film(server: &TestServer, name: &str, release_date: &str, genres: &[i32]) -> i64 {
    let genres: Vec<Value> = genres.iter().map(|id| json!({ "id": id })).collect();
    let response = server
        .post("/films")
        .json(&json!({
            "name": name,
            "description": "",
            "releaseDate": release_date,
            "duration": 100,
            "mpa": { "id": 2 },
            "genres": genres
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

fn ids(values: &[Value]) -> Vec<i64> {
    values.iter().map(|v| v["id"].as_i64().unwrap()).collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_user_name_defaults_to_login() {
    let server = create_test_server();
    let id = create_user(&server, "mulder").await;

    let user: Value = server.get(&format!("/users/{}", id)).await.json();
    assert_eq!(user["name"], "mulder");
    assert_eq!(user["birthday"], "1990-05-17");
}

#[tokio::test]
async fn test_unknown_user_returns_not_found_body() {
    let server = create_test_server();
    let response = server.get("/users/99").await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"], "User 99 not found");
}

#[tokio::test]
async fn test_friendship_mutuality_over_http() {
    let server = create_test_server();
    let a = create_user(&server, "a").await;
    let b = create_user(&server, "b").await;

    let first: Value = server.put(&format!("/users/{}/friends/{}", a, b)).await.json();
    assert_eq!(first["isMutual"], false);

    let second: Value = server.put(&format!("/users/{}/friends/{}", b, a)).await.json();
    assert_eq!(second["isMutual"], true);

    let friends: Vec<Value> = server.get(&format!("/users/{}/friends", a)).await.json();
    assert_eq!(ids(&friends), vec![b]);

    server
        .put(&format!("/users/{}/friends/{}", a, a))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_common_friends_route() {
    let server = create_test_server();
    let a = create_user(&server, "a").await;
    let b = create_user(&server, "b").await;
    let c = create_user(&server, "c").await;
    server.put(&format!("/users/{}/friends/{}", a, c)).await;
    server.put(&format!("/users/{}/friends/{}", b, c)).await;

    let common: Vec<Value> = server
        .get(&format!("/users/{}/friends/common/{}", a, b))
        .await
        .json();
    assert_eq!(ids(&common), vec![c]);
}

#[tokio::test]
async fn test_film_payload_is_enriched() {
    let server = create_test_server();
    let id = create_film(&server, "Arrival", "2016-09-01", &[2, 2]).await;

    let film: Value = server.get(&format!("/films/{}", id)).await.json();
    assert_eq!(film["mpa"]["name"], "PG");
    assert_eq!(film["releaseDate"], "2016-09-01");
    assert_eq!(film["genres"].as_array().unwrap().len(), 1);
    assert_eq!(film["directors"], json!([]));
}

#[tokio::test]
async fn test_popular_films_with_filters() {
    let server = create_test_server();
    let u1 = create_user(&server, "u1").await;
    let u2 = create_user(&server, "u2").await;
    let drama = create_film(&server, "Drama", "2001-01-01", &[2]).await;
    let comedy = create_film(&server, "Comedy", "2002-01-01", &[1]).await;

    server.put(&format!("/films/{}/like/{}", comedy, u1)).await.assert_status_ok();
    server.put(&format!("/films/{}/like/{}", comedy, u2)).await.assert_status_ok();
    server.put(&format!("/films/{}/like/{}", drama, u1)).await.assert_status_ok();

    let popular: Vec<Value> = server.get("/films/popular").await.json();
    assert_eq!(ids(&popular), vec![comedy, drama]);

    let top_one: Vec<Value> = server
        .get("/films/popular")
        .add_query_param("count", 1)
        .await
        .json();
    assert_eq!(ids(&top_one), vec![comedy]);

    let dramas: Vec<Value> = server
        .get("/films/popular")
        .add_query_param("genreId", 2)
        .await
        .json();
    assert_eq!(ids(&dramas), vec![drama]);

    let from_2002: Vec<Value> = server
        .get("/films/popular")
        .add_query_param("year", 2002)
        .await
        .json();
    assert_eq!(ids(&from_2002), vec![comedy]);
}

#[tokio::test]
async fn test_common_films_route() {
    let server = create_test_server();
    let a = create_user(&server, "a").await;
    let b = create_user(&server, "b").await;
    let shared = create_film(&server, "Shared", "2010-01-01", &[]).await;
    let only_a = create_film(&server, "Only A", "2011-01-01", &[]).await;

    server.put(&format!("/films/{}/like/{}", shared, a)).await;
    server.put(&format!("/films/{}/like/{}", only_a, a)).await;
    server.put(&format!("/films/{}/like/{}", shared, b)).await;

    let common: Vec<Value> = server
        .get("/films/common")
        .add_query_param("userId", a)
        .add_query_param("friendId", b)
        .await
        .json();
    assert_eq!(ids(&common), vec![shared]);
}

#[tokio::test]
async fn test_recommendations_and_feed() {
    let server = create_test_server();
    let u1 = create_user(&server, "u1").await;
    let u2 = create_user(&server, "u2").await;
    let f1 = create_film(&server, "One", "2001-01-01", &[]).await;
    let f2 = create_film(&server, "Two", "2002-01-01", &[]).await;

    server.put(&format!("/films/{}/like/{}", f1, u1)).await;
    server.put(&format!("/films/{}/like/{}", f1, u2)).await;
    server.put(&format!("/films/{}/like/{}", f2, u2)).await;

    let recommended: Vec<Value> = server
        .get(&format!("/users/{}/recommendations", u1))
        .await
        .json();
    assert_eq!(ids(&recommended), vec![f2]);

    let feed: Vec<Value> = server.get(&format!("/users/{}/feed", u2)).await.json();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0]["eventType"], "LIKE");
    assert_eq!(feed[0]["operation"], "ADD");
    assert_eq!(feed[1]["entityId"], f2);
}

#[tokio::test]
async fn test_directors_and_director_films() {
    let server = create_test_server();
    let response = server
        .post("/directors")
        .json(&json!({ "name": "Denis Villeneuve" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let director_id = response.json::<Value>()["id"].as_i64().unwrap();

    for (name, date) in [("Dune", "2021-09-03"), ("Sicario", "2015-05-19")] {
        server
            .post("/films")
            .json(&json!({
                "name": name,
                "releaseDate": date,
                "duration": 120,
                "mpa": { "id": 4 },
                "directors": [{ "id": director_id }]
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let by_year: Vec<Value> = server
        .get(&format!("/films/director/{}", director_id))
        .add_query_param("sortBy", "year")
        .await
        .json();
    let names: Vec<&str> = by_year.iter().map(|f| f["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Sicario", "Dune"]);

    let found: Vec<Value> = server
        .get("/films/search")
        .add_query_param("query", "villen")
        .add_query_param("by", "director")
        .await
        .json();
    assert_eq!(found.len(), 2);

    server
        .delete(&format!("/directors/{}", director_id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/films/director/{}", director_id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_reviews_flow() {
    let server = create_test_server();
    let author = create_user(&server, "author").await;
    let reader = create_user(&server, "reader").await;
    let film = create_film(&server, "Her", "2013-12-18", &[2]).await;

    let response = server
        .post("/reviews")
        .json(&json!({
            "content": "Tender and strange",
            "isPositive": true,
            "userId": author,
            "filmId": film
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let review_id = response.json::<Value>()["reviewId"].as_i64().unwrap();

    let liked: Value = server
        .put(&format!("/reviews/{}/like/{}", review_id, reader))
        .await
        .json();
    assert_eq!(liked["useful"], 1);

    let disliked: Value = server
        .put(&format!("/reviews/{}/dislike/{}", review_id, reader))
        .await
        .json();
    assert_eq!(disliked["useful"], -1);

    let listed: Vec<Value> = server
        .get("/reviews")
        .add_query_param("filmId", film)
        .await
        .json();
    assert_eq!(listed.len(), 1);

    server
        .delete(&format!("/reviews/{}", review_id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/reviews/{}", review_id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_catalog_routes() {
    let server = create_test_server();

    let ratings: Vec<Value> = server.get("/mpa").await.json();
    assert_eq!(ratings.len(), 5);
    let genre: Value = server.get("/genres/2").await.json();
    assert_eq!(genre["id"], 2);

    server.get("/mpa/9").await.assert_status_not_found();
}
