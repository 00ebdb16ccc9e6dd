use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{Director, DirectorId, Genre, GenreId, Mpa, MpaId},
    storage::{DirectorStorage, GenreStorage, RatingMpaStorage},
};

#[derive(Clone)]
pub struct PgGenreStorage {
    pool: PgPool,
}

impl PgGenreStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenreStorage for PgGenreStorage {
    async fn find_all(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    async fn find_by_id(&self, id: GenreId) -> AppResult<Option<Genre>> {
        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(genre)
    }
}

#[derive(Clone)]
pub struct PgRatingMpaStorage {
    pool: PgPool,
}

impl PgRatingMpaStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingMpaStorage for PgRatingMpaStorage {
    async fn find_all(&self) -> AppResult<Vec<Mpa>> {
        let ratings = sqlx::query_as::<_, Mpa>("SELECT id, name FROM mpa ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ratings)
    }

    async fn find_by_id(&self, id: MpaId) -> AppResult<Option<Mpa>> {
        let rating = sqlx::query_as::<_, Mpa>("SELECT id, name FROM mpa WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rating)
    }
}

#[derive(Clone)]
pub struct PgDirectorStorage {
    pool: PgPool,
}

impl PgDirectorStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectorStorage for PgDirectorStorage {
    async fn create(&self, name: &str) -> AppResult<Director> {
        let director = sqlx::query_as::<_, Director>(
            "INSERT INTO directors (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(director)
    }

    async fn update(&self, director: &Director) -> AppResult<Director> {
        let updated = sqlx::query_as::<_, Director>(
            "UPDATE directors SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(director.id)
        .bind(&director.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn find_by_id(&self, id: DirectorId) -> AppResult<Option<Director>> {
        let director = sqlx::query_as::<_, Director>("SELECT id, name FROM directors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(director)
    }

    async fn find_all(&self) -> AppResult<Vec<Director>> {
        let directors = sqlx::query_as::<_, Director>("SELECT id, name FROM directors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(directors)
    }

    async fn delete(&self, id: DirectorId) -> AppResult<bool> {
        let affected = sqlx::query("DELETE FROM directors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }
}
