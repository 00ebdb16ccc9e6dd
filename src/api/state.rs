use crate::{
    services::{CatalogService, FilmService, ReviewService, UserService},
    storage::Storage,
};

/// Shared application state: one handle per service, all over the same storage
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub films: FilmService,
    pub reviews: ReviewService,
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(storage: Storage) -> Self {
        Self {
            users: UserService::new(storage.clone()),
            films: FilmService::new(storage.clone()),
            reviews: ReviewService::new(storage.clone()),
            catalog: CatalogService::new(storage),
        }
    }

    /// State over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Storage::memory())
    }
}
