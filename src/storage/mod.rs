//! Record-access traits for every table the services touch.
//!
//! Storage adapters hand back raw records; services enrich and recombine
//! them. Lookups by id return `Ok(None)` for a missing row and leave the
//! choice of "not found" error to the caller.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{
        Director, DirectorId, Event, FilmId, FilmRecord, Friendship, Genre, GenreId, Mpa, MpaId,
        NewEvent, Review, ReviewId, ReviewPayload, SearchField, User, UserId,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Inserts the user; the `id` field is ignored and a fresh one assigned
    async fn create(&self, user: &User) -> AppResult<User>;
    async fn update(&self, user: &User) -> AppResult<User>;
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;
    /// All users ordered by id
    async fn find_all(&self) -> AppResult<Vec<User>>;
    async fn delete(&self, id: UserId) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FilmStorage: Send + Sync {
    /// Inserts the film; the `id` field is ignored and a fresh one assigned
    async fn create(&self, film: &FilmRecord) -> AppResult<FilmRecord>;
    async fn update(&self, film: &FilmRecord) -> AppResult<FilmRecord>;
    async fn find_by_id(&self, id: FilmId) -> AppResult<Option<FilmRecord>>;
    /// All films ordered by id
    async fn find_all(&self) -> AppResult<Vec<FilmRecord>>;
    async fn delete(&self, id: FilmId) -> AppResult<bool>;

    /// Genres of a film ordered by genre id
    async fn find_genres(&self, film_id: FilmId) -> AppResult<Vec<Genre>>;
    /// Replaces the film's genre set
    async fn set_genres(&self, film_id: FilmId, genre_ids: &[GenreId]) -> AppResult<()>;
    /// Directors of a film ordered by director id
    async fn find_directors(&self, film_id: FilmId) -> AppResult<Vec<Director>>;
    /// Replaces the film's director set
    async fn set_directors(&self, film_id: FilmId, director_ids: &[DirectorId]) -> AppResult<()>;

    /// Films of one director ordered by id
    async fn find_by_director(&self, director_id: DirectorId) -> AppResult<Vec<FilmRecord>>;

    /// Case-insensitive substring search over the given fields, most liked first
    async fn search(&self, query: &str, fields: &[SearchField]) -> AppResult<Vec<FilmRecord>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LikeStorage: Send + Sync {
    /// Idempotent
    async fn add(&self, film_id: FilmId, user_id: UserId) -> AppResult<()>;
    async fn delete(&self, film_id: FilmId, user_id: UserId) -> AppResult<bool>;
    /// Number of distinct users liking the film
    async fn count(&self, film_id: FilmId) -> AppResult<i64>;
    /// Films liked by the user ordered by film id
    async fn liked_film_ids(&self, user_id: UserId) -> AppResult<Vec<FilmId>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendsStorage: Send + Sync {
    /// Creates the directed edge `user_id -> friend_id`; idempotent
    async fn add(&self, user_id: UserId, friend_id: UserId) -> AppResult<()>;
    async fn delete(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool>;
    /// Targets of the user's outgoing edges ordered by id
    async fn friend_ids(&self, user_id: UserId) -> AppResult<Vec<UserId>>;
    /// The edge `user_id -> friend_id`, with mutuality read from the reverse edge
    async fn get(&self, user_id: UserId, friend_id: UserId) -> AppResult<Option<Friendship>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventsStorage: Send + Sync {
    /// Appends an event stamped with the current time
    async fn add(&self, event: NewEvent) -> AppResult<Event>;
    /// The user's events in insertion order
    async fn user_events(&self, user_id: UserId) -> AppResult<Vec<Event>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenreStorage: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<Genre>>;
    async fn find_by_id(&self, id: GenreId) -> AppResult<Option<Genre>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingMpaStorage: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<Mpa>>;
    async fn find_by_id(&self, id: MpaId) -> AppResult<Option<Mpa>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectorStorage: Send + Sync {
    async fn create(&self, name: &str) -> AppResult<Director>;
    async fn update(&self, director: &Director) -> AppResult<Director>;
    async fn find_by_id(&self, id: DirectorId) -> AppResult<Option<Director>>;
    async fn find_all(&self) -> AppResult<Vec<Director>>;
    async fn delete(&self, id: DirectorId) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewStorage: Send + Sync {
    async fn create(&self, review: &ReviewPayload) -> AppResult<Review>;
    /// Updates content and polarity; author and film never change
    async fn update(&self, id: ReviewId, content: &str, is_positive: bool)
        -> AppResult<Option<Review>>;
    async fn find_by_id(&self, id: ReviewId) -> AppResult<Option<Review>>;
    /// Reviews ordered by usefulness descending, then id
    async fn find_all(&self, film_id: Option<FilmId>, limit: i64) -> AppResult<Vec<Review>>;
    async fn delete(&self, id: ReviewId) -> AppResult<bool>;
    /// Records the user's reaction, replacing any previous one
    async fn set_reaction(&self, id: ReviewId, user_id: UserId, is_useful: bool) -> AppResult<()>;
    /// Removes the user's reaction if it has the given polarity
    async fn remove_reaction(&self, id: ReviewId, user_id: UserId, is_useful: bool)
        -> AppResult<bool>;
}

/// All storage adapters the services depend on
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserStorage>,
    pub films: Arc<dyn FilmStorage>,
    pub likes: Arc<dyn LikeStorage>,
    pub friends: Arc<dyn FriendsStorage>,
    pub events: Arc<dyn EventsStorage>,
    pub genres: Arc<dyn GenreStorage>,
    pub ratings: Arc<dyn RatingMpaStorage>,
    pub directors: Arc<dyn DirectorStorage>,
    pub reviews: Arc<dyn ReviewStorage>,
}

impl Storage {
    /// Adapters backed by PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUserStorage::new(pool.clone())),
            films: Arc::new(postgres::PgFilmStorage::new(pool.clone())),
            likes: Arc::new(postgres::PgLikeStorage::new(pool.clone())),
            friends: Arc::new(postgres::PgFriendsStorage::new(pool.clone())),
            events: Arc::new(postgres::PgEventsStorage::new(pool.clone())),
            genres: Arc::new(postgres::PgGenreStorage::new(pool.clone())),
            ratings: Arc::new(postgres::PgRatingMpaStorage::new(pool.clone())),
            directors: Arc::new(postgres::PgDirectorStorage::new(pool.clone())),
            reviews: Arc::new(postgres::PgReviewStorage::new(pool)),
        }
    }

    /// Adapters sharing one in-memory store
    pub fn memory() -> Self {
        Self::from_memory(MemoryStore::new())
    }

    pub fn from_memory(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            films: Arc::new(store.clone()),
            likes: Arc::new(store.clone()),
            friends: Arc::new(store.clone()),
            events: Arc::new(store.clone()),
            genres: Arc::new(store.clone()),
            ratings: Arc::new(store.clone()),
            directors: Arc::new(store.clone()),
            reviews: Arc::new(store),
        }
    }
}
