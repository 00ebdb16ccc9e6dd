use crate::{
    error::{AppError, AppResult},
    models::{
        DirectorId, DirectorSort, EventType, Film, FilmId, FilmPayload, FilmRecord, GenreId,
        NewEvent, Operation, SearchField, UserId,
    },
    services::{ranking, user_service::ensure_user_exists},
    storage::Storage,
};

/// Attaches rating, genres and directors to a stored film
pub(crate) async fn enrich_film(storage: &Storage, record: FilmRecord) -> AppResult<Film> {
    let mpa = storage
        .ratings
        .find_by_id(record.mpa_id)
        .await?
        .ok_or(AppError::MpaNotFound(record.mpa_id))?;
    let genres = storage.films.find_genres(record.id).await?;
    let directors = storage.films.find_directors(record.id).await?;

    Ok(Film {
        id: record.id,
        name: record.name,
        description: record.description,
        release_date: record.release_date,
        duration: record.duration,
        mpa,
        genres,
        directors,
    })
}

/// Enriches films one by one, keeping their order
pub(crate) async fn enrich_films(storage: &Storage, records: Vec<FilmRecord>) -> AppResult<Vec<Film>> {
    let mut films = Vec::with_capacity(records.len());
    for record in records {
        films.push(enrich_film(storage, record).await?);
    }
    Ok(films)
}

/// Loads film records by id, skipping ids that no longer exist
pub(crate) async fn load_films(storage: &Storage, film_ids: &[FilmId]) -> AppResult<Vec<FilmRecord>> {
    let mut records = Vec::with_capacity(film_ids.len());
    for film_id in film_ids {
        if let Some(record) = storage.films.find_by_id(*film_id).await? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Film catalog operations: CRUD, likes, popularity and search
#[derive(Clone)]
pub struct FilmService {
    storage: Storage,
}

impl FilmService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub async fn find_all(&self) -> AppResult<Vec<Film>> {
        let records = self.storage.films.find_all().await?;
        enrich_films(&self.storage, records).await
    }

    pub async fn find_by_id(&self, film_id: FilmId) -> AppResult<Film> {
        let record = self.require_film(film_id).await?;
        enrich_film(&self.storage, record).await
    }

    pub async fn create(&self, payload: FilmPayload) -> AppResult<Film> {
        self.validate_references(&payload).await?;

        let record = self.storage.films.create(&payload.to_record(0)).await?;
        self.storage
            .films
            .set_genres(record.id, &payload.genre_ids())
            .await?;
        self.storage
            .films
            .set_directors(record.id, &payload.director_ids())
            .await?;

        tracing::info!(film_id = record.id, name = %record.name, "Film created");
        enrich_film(&self.storage, record).await
    }

    pub async fn update(&self, payload: FilmPayload) -> AppResult<Film> {
        let film_id = payload
            .id
            .ok_or_else(|| AppError::InvalidInput("film id is required for update".to_string()))?;
        self.require_film(film_id).await?;
        self.validate_references(&payload).await?;

        let record = self.storage.films.update(&payload.to_record(film_id)).await?;
        self.storage
            .films
            .set_genres(film_id, &payload.genre_ids())
            .await?;
        self.storage
            .films
            .set_directors(film_id, &payload.director_ids())
            .await?;

        tracing::info!(film_id, "Film updated");
        enrich_film(&self.storage, record).await
    }

    pub async fn delete(&self, film_id: FilmId) -> AppResult<()> {
        self.require_film(film_id).await?;
        self.storage.films.delete(film_id).await?;
        tracing::info!(film_id, "Film deleted");
        Ok(())
    }

    pub async fn add_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        self.require_film(film_id).await?;
        ensure_user_exists(&self.storage, user_id).await?;

        self.storage.likes.add(film_id, user_id).await?;
        self.storage
            .events
            .add(NewEvent::new(user_id, film_id, EventType::Like, Operation::Add))
            .await?;

        tracing::info!(film_id, user_id, "Like added");
        Ok(())
    }

    pub async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        self.require_film(film_id).await?;
        ensure_user_exists(&self.storage, user_id).await?;

        let removed = self.storage.likes.delete(film_id, user_id).await?;
        self.storage
            .events
            .add(NewEvent::new(user_id, film_id, EventType::Like, Operation::Remove))
            .await?;

        tracing::info!(film_id, user_id, removed, "Like removed");
        Ok(())
    }

    /// Most liked films, optionally narrowed by genre and release year
    ///
    /// The ranking is truncated to `count` first and the filters are applied
    /// to that top list, so filtering never pulls in films from outside it.
    pub async fn top_popular_films(
        &self,
        count: usize,
        genre_id: Option<GenreId>,
        year: Option<i32>,
    ) -> AppResult<Vec<Film>> {
        if let Some(genre_id) = genre_id {
            self.storage
                .genres
                .find_by_id(genre_id)
                .await?
                .ok_or(AppError::GenreNotFound(genre_id))?;
        }

        let records = self.storage.films.find_all().await?;
        let mut top = self.rank_by_popularity(records).await?;
        top.truncate(count);

        let films = enrich_films(&self.storage, top).await?;
        let films = ranking::filter_popular(films, genre_id, year);

        tracing::debug!(count, ?genre_id, ?year, returned = films.len(), "Popular films ranked");
        Ok(films)
    }

    /// Films liked by both users, most popular first
    pub async fn common_films(&self, user_id: UserId, friend_id: UserId) -> AppResult<Vec<Film>> {
        ensure_user_exists(&self.storage, user_id).await?;
        ensure_user_exists(&self.storage, friend_id).await?;

        let user_likes = self.storage.likes.liked_film_ids(user_id).await?;
        let friend_likes = self.storage.likes.liked_film_ids(friend_id).await?;
        let common = ranking::intersect(&friend_likes, &user_likes);

        let records = load_films(&self.storage, &common).await?;
        let ranked = self.rank_by_popularity(records).await?;
        enrich_films(&self.storage, ranked).await
    }

    /// A director's films ordered by `year` or `likes`
    ///
    /// Any other mode returns an empty list rather than an error.
    pub async fn director_films(&self, director_id: DirectorId, sort_by: &str) -> AppResult<Vec<Film>> {
        self.storage
            .directors
            .find_by_id(director_id)
            .await?
            .ok_or(AppError::DirectorNotFound(director_id))?;

        let Some(sort) = DirectorSort::parse(sort_by) else {
            tracing::warn!(director_id, sort_by = %sort_by, "Unknown director sort mode");
            return Ok(Vec::new());
        };

        let mut records = self.storage.films.find_by_director(director_id).await?;
        let records = match sort {
            DirectorSort::Year => {
                records.sort_by_key(|record| record.release_date);
                records
            }
            DirectorSort::Likes => self.rank_by_popularity(records).await?,
        };

        enrich_films(&self.storage, records).await
    }

    /// Free-text search over a comma separated list of fields (`title`, `director`)
    pub async fn search(&self, query: &str, by: &str) -> AppResult<Vec<Film>> {
        let fields = SearchField::parse_list(by).map_err(AppError::InvalidInput)?;
        let records = self.storage.films.search(query, &fields).await?;

        tracing::debug!(query = %query, ?fields, matches = records.len(), "Film search");
        enrich_films(&self.storage, records).await
    }

    /// Sorts by descending like count, counting each film once
    async fn rank_by_popularity(&self, records: Vec<FilmRecord>) -> AppResult<Vec<FilmRecord>> {
        let mut counted = Vec::with_capacity(records.len());
        for record in records {
            let likes = self.storage.likes.count(record.id).await?;
            counted.push((record, likes));
        }
        Ok(ranking::sort_by_popularity(counted))
    }

    async fn require_film(&self, film_id: FilmId) -> AppResult<FilmRecord> {
        self.storage
            .films
            .find_by_id(film_id)
            .await?
            .ok_or_else(|| {
                tracing::debug!(film_id, "Film not found");
                AppError::FilmNotFound(film_id)
            })
    }

    /// Rating, genres and directors named by the payload must exist
    async fn validate_references(&self, payload: &FilmPayload) -> AppResult<()> {
        self.storage
            .ratings
            .find_by_id(payload.mpa.id)
            .await?
            .ok_or(AppError::MpaNotFound(payload.mpa.id))?;

        for genre_id in payload.genre_ids() {
            self.storage
                .genres
                .find_by_id(genre_id)
                .await?
                .ok_or(AppError::GenreNotFound(genre_id))?;
        }

        for director_id in payload.director_ids() {
            self.storage
                .directors
                .find_by_id(director_id)
                .await?
                .ok_or(AppError::DirectorNotFound(director_id))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{film_payload, Fixture};
    use crate::storage::MockFilmStorage;
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    fn ids(films: &[Film]) -> Vec<FilmId> {
        films.iter().map(|film| film.id).collect()
    }

    #[tokio::test]
    async fn test_create_enriches_with_catalog_data() {
        let fx = Fixture::new();
        let scott = fx.director("Ridley Scott").await;
        let mut payload = film_payload("Alien", 1979, &[4, 4, 2]);
        payload.directors = vec![crate::models::IdRef { id: scott.id }];

        let film = fx.films.create(payload).await.unwrap();
        assert_eq!(film.mpa.name, "G");
        assert_eq!(film.genres.iter().map(|g| g.id).collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(film.directors, vec![scott]);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_references() {
        let fx = Fixture::new();

        let mut payload = film_payload("Alien", 1979, &[]);
        payload.mpa.id = 99;
        assert!(matches!(
            fx.films.create(payload).await,
            Err(AppError::MpaNotFound(99))
        ));

        let payload = film_payload("Alien", 1979, &[42]);
        assert!(matches!(
            fx.films.create(payload).await,
            Err(AppError::GenreNotFound(42))
        ));
    }

    #[tokio::test]
    async fn test_update_requires_existing_film() {
        let fx = Fixture::new();
        let mut payload = film_payload("Ghost", 1990, &[]);
        payload.id = Some(77);
        assert!(matches!(
            fx.films.update(payload).await,
            Err(AppError::FilmNotFound(77))
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_genres() {
        let fx = Fixture::new();
        let film = fx.film("Heat", 1995, &[4, 6]).await;

        let mut payload = film_payload("Heat (Director's Cut)", 1995, &[2]);
        payload.id = Some(film.id);
        let updated = fx.films.update(payload).await.unwrap();

        assert_eq!(updated.name, "Heat (Director's Cut)");
        assert_eq!(updated.genres.len(), 1);
        assert_eq!(updated.genres[0].id, 2);
    }

    #[tokio::test]
    async fn test_likes_drive_popularity() {
        let fx = Fixture::new();
        let a = fx.film("A", 2001, &[]).await;
        let b = fx.film("B", 2002, &[]).await;
        let c = fx.film("C", 2003, &[]).await;
        let u1 = fx.user("u1").await;
        let u2 = fx.user("u2").await;

        fx.films.add_like(b.id, u1.id).await.unwrap();
        fx.films.add_like(b.id, u2.id).await.unwrap();
        fx.films.add_like(c.id, u1.id).await.unwrap();

        let top = fx.films.top_popular_films(10, None, None).await.unwrap();
        assert_eq!(ids(&top), vec![b.id, c.id, a.id]);

        let top_two = fx.films.top_popular_films(2, None, None).await.unwrap();
        assert_eq!(ids(&top_two), vec![b.id, c.id]);

        fx.films.remove_like(b.id, u1.id).await.unwrap();
        fx.films.remove_like(b.id, u2.id).await.unwrap();
        let top = fx.films.top_popular_films(10, None, None).await.unwrap();
        assert_eq!(ids(&top), vec![c.id, a.id, b.id]);
    }

    #[tokio::test]
    async fn test_like_records_feed_events() {
        let fx = Fixture::new();
        let film = fx.film("A", 2001, &[]).await;
        let user = fx.user("u1").await;

        fx.films.add_like(film.id, user.id).await.unwrap();
        fx.films.remove_like(film.id, user.id).await.unwrap();

        let feed = fx.users.feed(user.id).await.unwrap();
        let operations: Vec<Operation> = feed.iter().map(|e| e.operation).collect();
        assert_eq!(operations, vec![Operation::Add, Operation::Remove]);
        assert!(feed.iter().all(|e| e.event_type == EventType::Like && e.entity_id == film.id));
    }

    #[tokio::test]
    async fn test_like_unknown_user_fails() {
        let fx = Fixture::new();
        let film = fx.film("A", 2001, &[]).await;
        assert!(matches!(
            fx.films.add_like(film.id, 404).await,
            Err(AppError::UserNotFound(404))
        ));
    }

    #[tokio::test]
    async fn test_genre_filter_applies_after_truncation() {
        let fx = Fixture::new();
        let drama_hit = fx.film("Drama hit", 2010, &[2]).await;
        let comedy_hit = fx.film("Comedy hit", 2010, &[1]).await;
        let obscure_drama = fx.film("Obscure drama", 2010, &[2]).await;
        let u1 = fx.user("u1").await;
        let u2 = fx.user("u2").await;

        fx.films.add_like(drama_hit.id, u1.id).await.unwrap();
        fx.films.add_like(drama_hit.id, u2.id).await.unwrap();
        fx.films.add_like(comedy_hit.id, u1.id).await.unwrap();

        let unfiltered = fx.films.top_popular_films(2, None, None).await.unwrap();
        assert_eq!(ids(&unfiltered), vec![drama_hit.id, comedy_hit.id]);

        // the obscure drama matches the genre but is outside the top two
        let dramas = fx.films.top_popular_films(2, Some(2), None).await.unwrap();
        assert_eq!(ids(&dramas), vec![drama_hit.id]);
        assert!(!ids(&dramas).contains(&obscure_drama.id));
        assert!(ids(&dramas).iter().all(|id| ids(&unfiltered).contains(id)));
    }

    #[tokio::test]
    async fn test_year_and_genre_filters() {
        let fx = Fixture::new();
        let old = fx.film("Old", 1984, &[6]).await;
        let new = fx.film("New", 2019, &[6]).await;

        let from_1984 = fx.films.top_popular_films(10, None, Some(1984)).await.unwrap();
        assert_eq!(ids(&from_1984), vec![old.id]);

        let action_2019 = fx.films.top_popular_films(10, Some(6), Some(2019)).await.unwrap();
        assert_eq!(ids(&action_2019), vec![new.id]);

        assert!(matches!(
            fx.films.top_popular_films(10, Some(99), None).await,
            Err(AppError::GenreNotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_common_films_intersection_ordered_by_popularity() {
        let fx = Fixture::new();
        let a = fx.film("A", 2001, &[]).await;
        let b = fx.film("B", 2002, &[]).await;
        let c = fx.film("C", 2003, &[]).await;
        let alice = fx.user("alice").await;
        let bob = fx.user("bob").await;
        let carol = fx.user("carol").await;

        for film in [&a, &b, &c] {
            fx.films.add_like(film.id, alice.id).await.unwrap();
        }
        fx.films.add_like(a.id, bob.id).await.unwrap();
        fx.films.add_like(b.id, bob.id).await.unwrap();
        // carol makes B globally more popular than A
        fx.films.add_like(b.id, carol.id).await.unwrap();

        let common = fx.films.common_films(alice.id, bob.id).await.unwrap();
        assert_eq!(ids(&common), vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn test_director_films_sorting_modes() {
        let fx = Fixture::new();
        let nolan = fx.director("Christopher Nolan").await;
        let tenet = fx.directed_film("Tenet", 2020, nolan.id).await;
        let memento = fx.directed_film("Memento", 2000, nolan.id).await;
        let user = fx.user("fan").await;
        fx.films.add_like(tenet.id, user.id).await.unwrap();

        let by_year = fx.films.director_films(nolan.id, "year").await.unwrap();
        assert_eq!(ids(&by_year), vec![memento.id, tenet.id]);

        let by_likes = fx.films.director_films(nolan.id, "likes").await.unwrap();
        assert_eq!(ids(&by_likes), vec![tenet.id, memento.id]);

        let unknown = fx.films.director_films(nolan.id, "rating").await.unwrap();
        assert!(unknown.is_empty());

        assert!(matches!(
            fx.films.director_films(999, "year").await,
            Err(AppError::DirectorNotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_search_fields() {
        let fx = Fixture::new();
        let nolan = fx.director("Christopher Nolan").await;
        let tenet = fx.directed_film("Tenet", 2020, nolan.id).await;
        let _heat = fx.film("Heat", 1995, &[]).await;

        let by_director = fx.films.search("nolan", "director").await.unwrap();
        assert_eq!(ids(&by_director), vec![tenet.id]);
        assert_eq!(by_director[0].directors[0].name, "Christopher Nolan");

        assert!(fx.films.search("nolan", "title").await.unwrap().is_empty());
        assert_ok!(fx.films.search("ten", "title,director").await);
        assert!(matches!(
            fx.films.search("ten", "actor").await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_search_propagates_storage_failure_unchanged() {
        let mut films = MockFilmStorage::new();
        films
            .expect_search()
            .returning(|_, _| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let mut storage = Storage::memory();
        storage.films = Arc::new(films);
        let service = FilmService::new(storage);

        let err = assert_err!(service.search("alien", "title").await);
        assert!(matches!(err, AppError::Database(sqlx::Error::PoolTimedOut)));
    }

    #[tokio::test]
    async fn test_delete_film() {
        let fx = Fixture::new();
        let film = fx.film("Gone", 2001, &[]).await;
        assert_ok!(fx.films.delete(film.id).await);
        assert!(matches!(
            fx.films.find_by_id(film.id).await,
            Err(AppError::FilmNotFound(_))
        ));
        assert!(matches!(
            fx.films.delete(film.id).await,
            Err(AppError::FilmNotFound(_))
        ));
    }
}
