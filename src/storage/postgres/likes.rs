use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{FilmId, UserId},
    storage::LikeStorage,
};

#[derive(Clone)]
pub struct PgLikeStorage {
    pool: PgPool,
}

impl PgLikeStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeStorage for PgLikeStorage {
    async fn add(&self, film_id: FilmId, user_id: UserId) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO likes (film_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (film_id, user_id) DO NOTHING
            "#,
        )
        .bind(film_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, film_id: FilmId, user_id: UserId) -> AppResult<bool> {
        let affected = sqlx::query("DELETE FROM likes WHERE film_id = $1 AND user_id = $2")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    async fn count(&self, film_id: FilmId) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE film_id = $1")
            .bind(film_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn liked_film_ids(&self, user_id: UserId) -> AppResult<Vec<FilmId>> {
        let film_ids: Vec<FilmId> =
            sqlx::query_scalar("SELECT film_id FROM likes WHERE user_id = $1 ORDER BY film_id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(film_ids)
    }
}
