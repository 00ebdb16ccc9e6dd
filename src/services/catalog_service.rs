use crate::{
    error::{AppError, AppResult},
    models::{Director, DirectorId, DirectorPayload, Genre, GenreId, Mpa, MpaId},
    storage::Storage,
};

/// Reference data: genres, MPA ratings and directors
#[derive(Clone)]
pub struct CatalogService {
    storage: Storage,
}

impl CatalogService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub async fn genres(&self) -> AppResult<Vec<Genre>> {
        self.storage.genres.find_all().await
    }

    pub async fn genre(&self, genre_id: GenreId) -> AppResult<Genre> {
        self.storage
            .genres
            .find_by_id(genre_id)
            .await?
            .ok_or(AppError::GenreNotFound(genre_id))
    }

    pub async fn ratings(&self) -> AppResult<Vec<Mpa>> {
        self.storage.ratings.find_all().await
    }

    pub async fn rating(&self, mpa_id: MpaId) -> AppResult<Mpa> {
        self.storage
            .ratings
            .find_by_id(mpa_id)
            .await?
            .ok_or(AppError::MpaNotFound(mpa_id))
    }

    pub async fn directors(&self) -> AppResult<Vec<Director>> {
        self.storage.directors.find_all().await
    }

    pub async fn director(&self, director_id: DirectorId) -> AppResult<Director> {
        self.storage
            .directors
            .find_by_id(director_id)
            .await?
            .ok_or(AppError::DirectorNotFound(director_id))
    }

    pub async fn create_director(&self, payload: DirectorPayload) -> AppResult<Director> {
        let name = validated_name(&payload)?;
        let director = self.storage.directors.create(name).await?;
        tracing::info!(director_id = director.id, name = %director.name, "Director created");
        Ok(director)
    }

    pub async fn update_director(&self, payload: DirectorPayload) -> AppResult<Director> {
        let director_id = payload.id.ok_or_else(|| {
            AppError::InvalidInput("director id is required for update".to_string())
        })?;
        let name = validated_name(&payload)?;
        self.director(director_id).await?;

        let director = self
            .storage
            .directors
            .update(&Director {
                id: director_id,
                name: name.to_string(),
            })
            .await?;
        tracing::info!(director_id, "Director updated");
        Ok(director)
    }

    /// Deletes the director and unlinks it from every film
    pub async fn delete_director(&self, director_id: DirectorId) -> AppResult<()> {
        if !self.storage.directors.delete(director_id).await? {
            return Err(AppError::DirectorNotFound(director_id));
        }
        tracing::info!(director_id, "Director deleted");
        Ok(())
    }
}

fn validated_name(payload: &DirectorPayload) -> AppResult<&str> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("director name must not be blank".to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::Fixture;
    use crate::storage::MockGenreStorage;
    use std::sync::Arc;

    fn director(id: Option<DirectorId>, name: &str) -> DirectorPayload {
        DirectorPayload {
            id,
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_seeded_reference_data() {
        let fx = Fixture::new();

        let ratings = fx.catalog.ratings().await.unwrap();
        let names: Vec<&str> = ratings.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["G", "PG", "PG-13", "R", "NC-17"]);
        assert_eq!(fx.catalog.rating(3).await.unwrap().name, "PG-13");

        let genres = fx.catalog.genres().await.unwrap();
        assert_eq!(genres.len(), 6);
        assert_eq!(fx.catalog.genre(1).await.unwrap().id, 1);

        assert!(matches!(fx.catalog.genre(0).await, Err(AppError::GenreNotFound(0))));
        assert!(matches!(fx.catalog.rating(6).await, Err(AppError::MpaNotFound(6))));
    }

    #[tokio::test]
    async fn test_director_lifecycle() {
        let fx = Fixture::new();
        let created = fx
            .catalog
            .create_director(director(None, " Andrei Tarkovsky "))
            .await
            .unwrap();
        assert_eq!(created.name, "Andrei Tarkovsky");

        let updated = fx
            .catalog
            .update_director(director(Some(created.id), "A. Tarkovsky"))
            .await
            .unwrap();
        assert_eq!(updated.name, "A. Tarkovsky");
        assert_eq!(fx.catalog.directors().await.unwrap(), vec![updated]);

        fx.catalog.delete_director(created.id).await.unwrap();
        assert!(matches!(
            fx.catalog.director(created.id).await,
            Err(AppError::DirectorNotFound(_))
        ));
        assert!(matches!(
            fx.catalog.delete_director(created.id).await,
            Err(AppError::DirectorNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_director_validation() {
        let fx = Fixture::new();
        assert!(matches!(
            fx.catalog.create_director(director(None, "  ")).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            fx.catalog.update_director(director(None, "Name")).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            fx.catalog.update_director(director(Some(5), "Name")).await,
            Err(AppError::DirectorNotFound(5))
        ));
    }

    #[tokio::test]
    async fn test_deleting_director_unlinks_films() {
        let fx = Fixture::new();
        let lynch = fx.director("David Lynch").await;
        let film = fx.directed_film("Eraserhead", 1977, lynch.id).await;
        assert_eq!(film.directors.len(), 1);

        fx.catalog.delete_director(lynch.id).await.unwrap();
        let film = fx.films.find_by_id(film.id).await.unwrap();
        assert!(film.directors.is_empty());
    }

    #[tokio::test]
    async fn test_genre_lookup_error_propagates() {
        let mut genres = MockGenreStorage::new();
        genres
            .expect_find_by_id()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolClosed)));

        let mut storage = Storage::memory();
        storage.genres = Arc::new(genres);
        let catalog = CatalogService::new(storage);

        assert!(matches!(
            catalog.genre(1).await,
            Err(AppError::Database(sqlx::Error::PoolClosed))
        ));
    }
}
