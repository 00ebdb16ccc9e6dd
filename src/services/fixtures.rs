//! Services wired over a fresh in-memory store, shared by service tests.

use chrono::NaiveDate;

use crate::{
    models::{
        Director, DirectorId, DirectorPayload, Film, FilmPayload, GenreId, IdRef, User, UserPayload,
    },
    services::{CatalogService, FilmService, ReviewService, UserService},
    storage::Storage,
};

pub struct Fixture {
    pub storage: Storage,
    pub films: FilmService,
    pub users: UserService,
    pub reviews: ReviewService,
    pub catalog: CatalogService,
}

impl Fixture {
    pub fn new() -> Self {
        let storage = Storage::memory();
        Self {
            films: FilmService::new(storage.clone()),
            users: UserService::new(storage.clone()),
            reviews: ReviewService::new(storage.clone()),
            catalog: CatalogService::new(storage.clone()),
            storage,
        }
    }

    pub async fn user(&self, login: &str) -> User {
        self.users.create(user_payload(login)).await.unwrap()
    }

    pub async fn film(&self, name: &str, year: i32, genres: &[GenreId]) -> Film {
        self.films
            .create(film_payload(name, year, genres))
            .await
            .unwrap()
    }

    pub async fn directed_film(&self, name: &str, year: i32, director_id: DirectorId) -> Film {
        let mut payload = film_payload(name, year, &[]);
        payload.directors = vec![IdRef { id: director_id }];
        self.films.create(payload).await.unwrap()
    }

    pub async fn director(&self, name: &str) -> Director {
        self.catalog
            .create_director(DirectorPayload {
                id: None,
                name: name.to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn like(&self, film: &Film, user: &User) {
        self.films.add_like(film.id, user.id).await.unwrap();
    }
}

pub fn user_payload(login: &str) -> UserPayload {
    UserPayload {
        id: None,
        email: format!("{}@example.com", login),
        login: login.to_string(),
        name: None,
        birthday: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
    }
}

pub fn film_payload(name: &str, year: i32, genres: &[GenreId]) -> FilmPayload {
    FilmPayload {
        id: None,
        name: name.to_string(),
        description: format!("About {}", name),
        release_date: NaiveDate::from_ymd_opt(year, 3, 15).unwrap(),
        duration: 120,
        mpa: IdRef { id: 1 },
        genres: genres.iter().map(|id| IdRef { id: *id }).collect(),
        directors: Vec::new(),
    }
}
