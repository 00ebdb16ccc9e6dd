use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{Director, DirectorId, FilmId, FilmRecord, Genre, GenreId, SearchField},
    storage::FilmStorage,
};

const FILM_COLUMNS: &str = "f.id, f.name, f.description, f.release_date, f.duration, f.mpa_id";

#[derive(Clone)]
pub struct PgFilmStorage {
    pool: PgPool,
}

impl PgFilmStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE wildcards so the query is matched literally
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl FilmStorage for PgFilmStorage {
    async fn create(&self, film: &FilmRecord) -> AppResult<FilmRecord> {
        let created = sqlx::query_as::<_, FilmRecord>(
            r#"
            INSERT INTO films (name, description, release_date, duration, mpa_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, release_date, duration, mpa_id
            "#,
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(film.mpa_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(film_id = created.id, "Inserted film");
        Ok(created)
    }

    async fn update(&self, film: &FilmRecord) -> AppResult<FilmRecord> {
        let updated = sqlx::query_as::<_, FilmRecord>(
            r#"
            UPDATE films
            SET name = $2, description = $3, release_date = $4, duration = $5, mpa_id = $6
            WHERE id = $1
            RETURNING id, name, description, release_date, duration, mpa_id
            "#,
        )
        .bind(film.id)
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(film.mpa_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn find_by_id(&self, id: FilmId) -> AppResult<Option<FilmRecord>> {
        let sql = format!("SELECT {} FROM films f WHERE f.id = $1", FILM_COLUMNS);
        let film = sqlx::query_as::<_, FilmRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(film)
    }

    async fn find_all(&self) -> AppResult<Vec<FilmRecord>> {
        let sql = format!("SELECT {} FROM films f ORDER BY f.id", FILM_COLUMNS);
        let films = sqlx::query_as::<_, FilmRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(films)
    }

    async fn delete(&self, id: FilmId) -> AppResult<bool> {
        let affected = sqlx::query("DELETE FROM films WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    async fn find_genres(&self, film_id: FilmId) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM film_genres fg
            JOIN genres g ON g.id = fg.genre_id
            WHERE fg.film_id = $1
            ORDER BY g.id
            "#,
        )
        .bind(film_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(genres)
    }

    async fn set_genres(&self, film_id: FilmId, genre_ids: &[GenreId]) -> AppResult<()> {
        sqlx::query("DELETE FROM film_genres WHERE film_id = $1")
            .bind(film_id)
            .execute(&self.pool)
            .await?;

        if genre_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO film_genres (film_id, genre_id)
            SELECT $1, UNNEST($2::INTEGER[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(film_id)
        .bind(genre_ids)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_directors(&self, film_id: FilmId) -> AppResult<Vec<Director>> {
        let directors = sqlx::query_as::<_, Director>(
            r#"
            SELECT d.id, d.name
            FROM film_directors fd
            JOIN directors d ON d.id = fd.director_id
            WHERE fd.film_id = $1
            ORDER BY d.id
            "#,
        )
        .bind(film_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(directors)
    }

    async fn set_directors(&self, film_id: FilmId, director_ids: &[DirectorId]) -> AppResult<()> {
        sqlx::query("DELETE FROM film_directors WHERE film_id = $1")
            .bind(film_id)
            .execute(&self.pool)
            .await?;

        if director_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO film_directors (film_id, director_id)
            SELECT $1, UNNEST($2::BIGINT[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(film_id)
        .bind(director_ids)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_director(&self, director_id: DirectorId) -> AppResult<Vec<FilmRecord>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM films f
            JOIN film_directors fd ON fd.film_id = f.id
            WHERE fd.director_id = $1
            ORDER BY f.id
            "#,
            FILM_COLUMNS
        );
        let films = sqlx::query_as::<_, FilmRecord>(&sql)
            .bind(director_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(films)
    }

    async fn search(&self, query: &str, fields: &[SearchField]) -> AppResult<Vec<FilmRecord>> {
        let by_title = fields.contains(&SearchField::Title);
        let by_director = fields.contains(&SearchField::Director);

        let sql = format!(
            r#"
            SELECT {}
            FROM films f
            WHERE ($2 AND f.name ILIKE $1)
               OR ($3 AND EXISTS (
                    SELECT 1
                    FROM film_directors fd
                    JOIN directors d ON d.id = fd.director_id
                    WHERE fd.film_id = f.id AND d.name ILIKE $1
               ))
            ORDER BY (SELECT COUNT(*) FROM likes l WHERE l.film_id = f.id) DESC, f.id
            "#,
            FILM_COLUMNS
        );
        let films = sqlx::query_as::<_, FilmRecord>(&sql)
            .bind(like_pattern(query))
            .bind(by_title)
            .bind(by_director)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(query = %query, matches = films.len(), "Film search executed");
        Ok(films)
    }
}
