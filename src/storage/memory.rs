//! In-memory storage backend.
//!
//! Every adapter trait is implemented by one [`MemoryStore`] sharing a
//! single lock, so a clone handed to each service sees the same data.
//! Orderings and cascades mirror the PostgreSQL schema.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{
        Director, DirectorId, Event, FilmId, FilmRecord, Friendship, Genre, GenreId, Mpa, MpaId,
        NewEvent, Review, ReviewId, ReviewPayload, SearchField, User, UserId,
    },
    storage::{
        DirectorStorage, EventsStorage, FilmStorage, FriendsStorage, GenreStorage, LikeStorage,
        RatingMpaStorage, ReviewStorage, UserStorage,
    },
};

/// Seeded MPA ratings, same as the SQL seed migration
pub const MPA_RATINGS: [(MpaId, &str); 5] =
    [(1, "G"), (2, "PG"), (3, "PG-13"), (4, "R"), (5, "NC-17")];

/// Seeded genres, same as the SQL seed migration
pub const GENRES: [(GenreId, &str); 6] = [
    (1, "Комедия"),
    (2, "Драма"),
    (3, "Мультфильм"),
    (4, "Триллер"),
    (5, "Документальный"),
    (6, "Боевик"),
];

#[derive(Debug, Clone)]
struct ReviewRow {
    id: ReviewId,
    content: String,
    is_positive: bool,
    user_id: UserId,
    film_id: FilmId,
}

#[derive(Default)]
struct Sequences {
    user: i64,
    film: i64,
    director: i64,
    review: i64,
    event: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<UserId, User>,
    films: BTreeMap<FilmId, FilmRecord>,
    film_genres: BTreeSet<(FilmId, GenreId)>,
    film_directors: BTreeSet<(FilmId, DirectorId)>,
    likes: BTreeSet<(FilmId, UserId)>,
    friends: BTreeSet<(UserId, UserId)>,
    events: Vec<Event>,
    genres: BTreeMap<GenreId, Genre>,
    ratings: BTreeMap<MpaId, Mpa>,
    directors: BTreeMap<DirectorId, Director>,
    reviews: BTreeMap<ReviewId, ReviewRow>,
    reactions: HashMap<(ReviewId, UserId), bool>,
    seq: Sequences,
}

impl MemoryState {
    fn seeded() -> Self {
        let mut state = Self::default();
        for (id, name) in MPA_RATINGS {
            state.ratings.insert(id, Mpa { id, name: name.to_string() });
        }
        for (id, name) in GENRES {
            state.genres.insert(id, Genre { id, name: name.to_string() });
        }
        state
    }

    fn like_count(&self, film_id: FilmId) -> i64 {
        self.likes
            .range((film_id, UserId::MIN)..=(film_id, UserId::MAX))
            .count() as i64
    }

    fn to_review(&self, row: &ReviewRow) -> Review {
        let useful = self
            .reactions
            .iter()
            .filter(|((review_id, _), _)| *review_id == row.id)
            .map(|(_, is_useful)| if *is_useful { 1 } else { -1 })
            .sum();

        Review {
            review_id: row.id,
            content: row.content.clone(),
            is_positive: row.is_positive,
            user_id: row.user_id,
            film_id: row.film_id,
            useful,
        }
    }

    fn remove_reviews_where(&mut self, predicate: impl Fn(&ReviewRow) -> bool) {
        let removed: HashSet<ReviewId> = self
            .reviews
            .values()
            .filter(|row| predicate(row))
            .map(|row| row.id)
            .collect();
        self.reviews.retain(|id, _| !removed.contains(id));
        self.reactions
            .retain(|(review_id, _), _| !removed.contains(review_id));
    }
}

/// Shared in-memory store implementing every storage trait
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryState>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates a store seeded with the genre and MPA catalogs
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryState::seeded())),
        }
    }
}

fn missing_row() -> AppError {
    AppError::Database(sqlx::Error::RowNotFound)
}

#[async_trait]
impl UserStorage for MemoryStore {
    async fn create(&self, user: &User) -> AppResult<User> {
        let mut state = self.inner.write().await;
        let id = next(&mut state.seq.user);
        let created = User { id, ..user.clone() };
        state.users.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let mut state = self.inner.write().await;
        let stored = state.users.get_mut(&user.id).ok_or_else(missing_row)?;
        *stored = user.clone();
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        let mut state = self.inner.write().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        state.likes.retain(|(_, user_id)| *user_id != id);
        state
            .friends
            .retain(|(user_id, friend_id)| *user_id != id && *friend_id != id);
        state.remove_reviews_where(|row| row.user_id == id);
        state.reactions.retain(|(_, user_id), _| *user_id != id);
        state.events.retain(|event| event.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl FilmStorage for MemoryStore {
    async fn create(&self, film: &FilmRecord) -> AppResult<FilmRecord> {
        let mut state = self.inner.write().await;
        let id = next(&mut state.seq.film);
        let created = FilmRecord { id, ..film.clone() };
        state.films.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, film: &FilmRecord) -> AppResult<FilmRecord> {
        let mut state = self.inner.write().await;
        let stored = state.films.get_mut(&film.id).ok_or_else(missing_row)?;
        *stored = film.clone();
        Ok(film.clone())
    }

    async fn find_by_id(&self, id: FilmId) -> AppResult<Option<FilmRecord>> {
        Ok(self.inner.read().await.films.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<FilmRecord>> {
        Ok(self.inner.read().await.films.values().cloned().collect())
    }

    async fn delete(&self, id: FilmId) -> AppResult<bool> {
        let mut state = self.inner.write().await;
        if state.films.remove(&id).is_none() {
            return Ok(false);
        }
        state.film_genres.retain(|(film_id, _)| *film_id != id);
        state.film_directors.retain(|(film_id, _)| *film_id != id);
        state.likes.retain(|(film_id, _)| *film_id != id);
        state.remove_reviews_where(|row| row.film_id == id);
        Ok(true)
    }

    async fn find_genres(&self, film_id: FilmId) -> AppResult<Vec<Genre>> {
        let state = self.inner.read().await;
        Ok(state
            .film_genres
            .range((film_id, GenreId::MIN)..=(film_id, GenreId::MAX))
            .filter_map(|(_, genre_id)| state.genres.get(genre_id).cloned())
            .collect())
    }

    async fn set_genres(&self, film_id: FilmId, genre_ids: &[GenreId]) -> AppResult<()> {
        let mut state = self.inner.write().await;
        state.film_genres.retain(|(id, _)| *id != film_id);
        state
            .film_genres
            .extend(genre_ids.iter().map(|genre_id| (film_id, *genre_id)));
        Ok(())
    }

    async fn find_directors(&self, film_id: FilmId) -> AppResult<Vec<Director>> {
        let state = self.inner.read().await;
        Ok(state
            .film_directors
            .range((film_id, DirectorId::MIN)..=(film_id, DirectorId::MAX))
            .filter_map(|(_, director_id)| state.directors.get(director_id).cloned())
            .collect())
    }

    async fn set_directors(&self, film_id: FilmId, director_ids: &[DirectorId]) -> AppResult<()> {
        let mut state = self.inner.write().await;
        state.film_directors.retain(|(id, _)| *id != film_id);
        state
            .film_directors
            .extend(director_ids.iter().map(|director_id| (film_id, *director_id)));
        Ok(())
    }

    async fn find_by_director(&self, director_id: DirectorId) -> AppResult<Vec<FilmRecord>> {
        let state = self.inner.read().await;
        Ok(state
            .film_directors
            .iter()
            .filter(|(_, id)| *id == director_id)
            .filter_map(|(film_id, _)| state.films.get(film_id).cloned())
            .collect())
    }

    async fn search(&self, query: &str, fields: &[SearchField]) -> AppResult<Vec<FilmRecord>> {
        let state = self.inner.read().await;
        let needle = query.to_lowercase();

        let director_matches = |film_id: FilmId| {
            state
                .film_directors
                .range((film_id, DirectorId::MIN)..=(film_id, DirectorId::MAX))
                .filter_map(|(_, director_id)| state.directors.get(director_id))
                .any(|director| director.name.to_lowercase().contains(&needle))
        };

        let mut matches: Vec<(FilmRecord, i64)> = state
            .films
            .values()
            .filter(|film| {
                fields.iter().any(|field| match field {
                    SearchField::Title => film.name.to_lowercase().contains(&needle),
                    SearchField::Director => director_matches(film.id),
                })
            })
            .map(|film| (film.clone(), state.like_count(film.id)))
            .collect();

        matches.sort_by(|(a, a_likes), (b, b_likes)| b_likes.cmp(a_likes).then(a.id.cmp(&b.id)));
        Ok(matches.into_iter().map(|(film, _)| film).collect())
    }
}

#[async_trait]
impl LikeStorage for MemoryStore {
    async fn add(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        self.inner.write().await.likes.insert((film_id, user_id));
        Ok(())
    }

    async fn delete(&self, film_id: FilmId, user_id: UserId) -> AppResult<bool> {
        Ok(self.inner.write().await.likes.remove(&(film_id, user_id)))
    }

    async fn count(&self, film_id: FilmId) -> AppResult<i64> {
        Ok(self.inner.read().await.like_count(film_id))
    }

    async fn liked_film_ids(&self, user_id: UserId) -> AppResult<Vec<FilmId>> {
        let state = self.inner.read().await;
        let mut ids: Vec<FilmId> = state
            .likes
            .iter()
            .filter(|(_, id)| *id == user_id)
            .map(|(film_id, _)| *film_id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[async_trait]
impl FriendsStorage for MemoryStore {
    async fn add(&self, user_id: UserId, friend_id: UserId) -> AppResult<()> {
        self.inner.write().await.friends.insert((user_id, friend_id));
        Ok(())
    }

    async fn delete(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        Ok(self.inner.write().await.friends.remove(&(user_id, friend_id)))
    }

    async fn friend_ids(&self, user_id: UserId) -> AppResult<Vec<UserId>> {
        let state = self.inner.read().await;
        Ok(state
            .friends
            .range((user_id, UserId::MIN)..=(user_id, UserId::MAX))
            .map(|(_, friend_id)| *friend_id)
            .collect())
    }

    async fn get(&self, user_id: UserId, friend_id: UserId) -> AppResult<Option<Friendship>> {
        let state = self.inner.read().await;
        if !state.friends.contains(&(user_id, friend_id)) {
            return Ok(None);
        }
        Ok(Some(Friendship {
            user_id,
            friend_id,
            is_mutual: state.friends.contains(&(friend_id, user_id)),
        }))
    }
}

#[async_trait]
impl EventsStorage for MemoryStore {
    async fn add(&self, event: NewEvent) -> AppResult<Event> {
        let mut state = self.inner.write().await;
        let event = Event {
            event_id: next(&mut state.seq.event),
            user_id: event.user_id,
            entity_id: event.entity_id,
            event_type: event.event_type,
            operation: event.operation,
            timestamp: Utc::now().timestamp_millis(),
        };
        state.events.push(event.clone());
        Ok(event)
    }

    async fn user_events(&self, user_id: UserId) -> AppResult<Vec<Event>> {
        let state = self.inner.read().await;
        Ok(state
            .events
            .iter()
            .filter(|event| event.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GenreStorage for MemoryStore {
    async fn find_all(&self) -> AppResult<Vec<Genre>> {
        Ok(self.inner.read().await.genres.values().cloned().collect())
    }

    async fn find_by_id(&self, id: GenreId) -> AppResult<Option<Genre>> {
        Ok(self.inner.read().await.genres.get(&id).cloned())
    }
}

#[async_trait]
impl RatingMpaStorage for MemoryStore {
    async fn find_all(&self) -> AppResult<Vec<Mpa>> {
        Ok(self.inner.read().await.ratings.values().cloned().collect())
    }

    async fn find_by_id(&self, id: MpaId) -> AppResult<Option<Mpa>> {
        Ok(self.inner.read().await.ratings.get(&id).cloned())
    }
}

#[async_trait]
impl DirectorStorage for MemoryStore {
    async fn create(&self, name: &str) -> AppResult<Director> {
        let mut state = self.inner.write().await;
        let director = Director {
            id: next(&mut state.seq.director),
            name: name.to_string(),
        };
        state.directors.insert(director.id, director.clone());
        Ok(director)
    }

    async fn update(&self, director: &Director) -> AppResult<Director> {
        let mut state = self.inner.write().await;
        let stored = state.directors.get_mut(&director.id).ok_or_else(missing_row)?;
        *stored = director.clone();
        Ok(director.clone())
    }

    async fn find_by_id(&self, id: DirectorId) -> AppResult<Option<Director>> {
        Ok(self.inner.read().await.directors.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Director>> {
        Ok(self.inner.read().await.directors.values().cloned().collect())
    }

    async fn delete(&self, id: DirectorId) -> AppResult<bool> {
        let mut state = self.inner.write().await;
        if state.directors.remove(&id).is_none() {
            return Ok(false);
        }
        state.film_directors.retain(|(_, director_id)| *director_id != id);
        Ok(true)
    }
}

#[async_trait]
impl ReviewStorage for MemoryStore {
    async fn create(&self, review: &ReviewPayload) -> AppResult<Review> {
        let mut state = self.inner.write().await;
        let row = ReviewRow {
            id: next(&mut state.seq.review),
            content: review.content.clone(),
            is_positive: review.is_positive,
            user_id: review.user_id,
            film_id: review.film_id,
        };
        let created = state.to_review(&row);
        state.reviews.insert(row.id, row);
        Ok(created)
    }

    async fn update(
        &self,
        id: ReviewId,
        content: &str,
        is_positive: bool,
    ) -> AppResult<Option<Review>> {
        let mut state = self.inner.write().await;
        let Some(row) = state.reviews.get_mut(&id) else {
            return Ok(None);
        };
        row.content = content.to_string();
        row.is_positive = is_positive;
        let row = row.clone();
        Ok(Some(state.to_review(&row)))
    }

    async fn find_by_id(&self, id: ReviewId) -> AppResult<Option<Review>> {
        let state = self.inner.read().await;
        Ok(state.reviews.get(&id).map(|row| state.to_review(row)))
    }

    async fn find_all(&self, film_id: Option<FilmId>, limit: i64) -> AppResult<Vec<Review>> {
        let state = self.inner.read().await;
        let mut reviews: Vec<Review> = state
            .reviews
            .values()
            .filter(|row| film_id.map_or(true, |id| row.film_id == id))
            .map(|row| state.to_review(row))
            .collect();

        reviews.sort_by(|a, b| b.useful.cmp(&a.useful).then(a.review_id.cmp(&b.review_id)));
        reviews.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(reviews)
    }

    async fn delete(&self, id: ReviewId) -> AppResult<bool> {
        let mut state = self.inner.write().await;
        let existed = state.reviews.contains_key(&id);
        state.remove_reviews_where(|row| row.id == id);
        Ok(existed)
    }

    async fn set_reaction(&self, id: ReviewId, user_id: UserId, is_useful: bool) -> AppResult<()> {
        self.inner
            .write()
            .await
            .reactions
            .insert((id, user_id), is_useful);
        Ok(())
    }

    async fn remove_reaction(
        &self,
        id: ReviewId,
        user_id: UserId,
        is_useful: bool,
    ) -> AppResult<bool> {
        let mut state = self.inner.write().await;
        if state.reactions.get(&(id, user_id)) == Some(&is_useful) {
            state.reactions.remove(&(id, user_id));
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn user(login: &str) -> User {
        User {
            id: 0,
            email: format!("{}@example.com", login),
            login: login.to_string(),
            name: login.to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        }
    }

    fn film(name: &str) -> FilmRecord {
        FilmRecord {
            id: 0,
            name: name.to_string(),
            description: String::new(),
            release_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            duration: 100,
            mpa_id: 1,
        }
    }

    #[tokio::test]
    async fn test_seeded_catalog() {
        let store = MemoryStore::new();
        assert_eq!(GenreStorage::find_all(&store).await.unwrap().len(), 6);
        let pg13 = RatingMpaStorage::find_by_id(&store, 3).await.unwrap().unwrap();
        assert_eq!(pg13.name, "PG-13");
    }

    #[tokio::test]
    async fn test_friendship_mutuality_follows_reverse_edge() {
        let store = MemoryStore::new();
        FriendsStorage::add(&store, 1, 2).await.unwrap();

        let edge = store.get(1, 2).await.unwrap().unwrap();
        assert!(!edge.is_mutual);

        FriendsStorage::add(&store, 2, 1).await.unwrap();
        assert!(store.get(1, 2).await.unwrap().unwrap().is_mutual);

        FriendsStorage::delete(&store, 2, 1).await.unwrap();
        assert!(!store.get(1, 2).await.unwrap().unwrap().is_mutual);
    }

    #[tokio::test]
    async fn test_like_count_tracks_membership() {
        let store = MemoryStore::new();
        LikeStorage::add(&store, 10, 1).await.unwrap();
        LikeStorage::add(&store, 10, 1).await.unwrap();
        LikeStorage::add(&store, 10, 2).await.unwrap();
        LikeStorage::add(&store, 11, 2).await.unwrap();

        assert_eq!(store.count(10).await.unwrap(), 2);
        assert_eq!(store.liked_film_ids(2).await.unwrap(), vec![10, 11]);

        assert!(LikeStorage::delete(&store, 10, 1).await.unwrap());
        assert!(!LikeStorage::delete(&store, 10, 1).await.unwrap());
        assert_eq!(store.count(10).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let store = MemoryStore::new();
        let alice = UserStorage::create(&store, &user("alice")).await.unwrap();
        let bob = UserStorage::create(&store, &user("bob")).await.unwrap();
        let movie = FilmStorage::create(&store, &film("Heat")).await.unwrap();

        LikeStorage::add(&store, movie.id, alice.id).await.unwrap();
        FriendsStorage::add(&store, bob.id, alice.id).await.unwrap();
        let review = ReviewStorage::create(
            &store,
            &ReviewPayload {
                review_id: None,
                content: "Great".to_string(),
                is_positive: true,
                user_id: alice.id,
                film_id: movie.id,
            },
        )
        .await
        .unwrap();

        assert!(UserStorage::delete(&store, alice.id).await.unwrap());

        assert_eq!(store.count(movie.id).await.unwrap(), 0);
        assert!(store.friend_ids(bob.id).await.unwrap().is_empty());
        assert!(ReviewStorage::find_by_id(&store, review.review_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_search_by_title_and_director() {
        let store = MemoryStore::new();
        let alien = FilmStorage::create(&store, &film("Alien")).await.unwrap();
        let aliens = FilmStorage::create(&store, &film("Aliens")).await.unwrap();
        let heat = FilmStorage::create(&store, &film("Heat")).await.unwrap();
        let scott = DirectorStorage::create(&store, "Ridley Scott").await.unwrap();
        store.set_directors(heat.id, &[scott.id]).await.unwrap();
        LikeStorage::add(&store, aliens.id, 1).await.unwrap();

        let by_title = store.search("ALIEN", &[SearchField::Title]).await.unwrap();
        let ids: Vec<FilmId> = by_title.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![aliens.id, alien.id]);

        let by_director = store.search("scott", &[SearchField::Director]).await.unwrap();
        assert_eq!(by_director.len(), 1);
        assert_eq!(by_director[0].id, heat.id);

        let none = store.search("scott", &[SearchField::Title]).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_review_usefulness_balance() {
        let store = MemoryStore::new();
        let review = ReviewStorage::create(
            &store,
            &ReviewPayload {
                review_id: None,
                content: "Meh".to_string(),
                is_positive: false,
                user_id: 1,
                film_id: 1,
            },
        )
        .await
        .unwrap();
        assert_eq!(review.useful, 0);

        store.set_reaction(review.review_id, 2, true).await.unwrap();
        store.set_reaction(review.review_id, 3, true).await.unwrap();
        store.set_reaction(review.review_id, 4, false).await.unwrap();
        let found = ReviewStorage::find_by_id(&store, review.review_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.useful, 1);

        // wrong polarity leaves the reaction in place
        assert!(!store.remove_reaction(review.review_id, 2, false).await.unwrap());
        assert!(store.remove_reaction(review.review_id, 2, true).await.unwrap());
        let found = ReviewStorage::find_by_id(&store, review.review_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.useful, 0);
    }
}
