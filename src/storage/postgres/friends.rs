use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{Friendship, UserId},
    storage::FriendsStorage,
};

#[derive(Clone)]
pub struct PgFriendsStorage {
    pool: PgPool,
}

impl PgFriendsStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendsStorage for PgFriendsStorage {
    async fn add(&self, user_id: UserId, friend_id: UserId) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO friends (user_id, friend_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, friend_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, user_id: UserId, friend_id: UserId) -> AppResult<bool> {
        let affected = sqlx::query("DELETE FROM friends WHERE user_id = $1 AND friend_id = $2")
            .bind(user_id)
            .bind(friend_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    async fn friend_ids(&self, user_id: UserId) -> AppResult<Vec<UserId>> {
        let ids: Vec<UserId> =
            sqlx::query_scalar("SELECT friend_id FROM friends WHERE user_id = $1 ORDER BY friend_id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids)
    }

    async fn get(&self, user_id: UserId, friend_id: UserId) -> AppResult<Option<Friendship>> {
        let row: Option<(UserId, UserId, bool)> = sqlx::query_as(
            r#"
            SELECT f.user_id, f.friend_id,
                   EXISTS(
                       SELECT 1 FROM friends r
                       WHERE r.user_id = f.friend_id AND r.friend_id = f.user_id
                   ) AS is_mutual
            FROM friends f
            WHERE f.user_id = $1 AND f.friend_id = $2
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(user_id, friend_id, is_mutual)| Friendship {
            user_id,
            friend_id,
            is_mutual,
        }))
    }
}
