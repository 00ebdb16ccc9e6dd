use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{FilmId, Review, ReviewId, ReviewPayload, UserId},
    storage::ReviewStorage,
};

/// Reviews joined with their reaction balance
const REVIEW_SELECT: &str = r#"
    SELECT r.id AS review_id, r.content, r.is_positive, r.user_id, r.film_id,
           COALESCE(SUM(CASE WHEN rr.is_useful THEN 1 ELSE -1 END)
                    FILTER (WHERE rr.review_id IS NOT NULL), 0)::INTEGER AS useful
    FROM reviews r
    LEFT JOIN review_reactions rr ON rr.review_id = r.id
"#;

#[derive(Clone)]
pub struct PgReviewStorage {
    pool: PgPool,
}

impl PgReviewStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStorage for PgReviewStorage {
    async fn create(&self, review: &ReviewPayload) -> AppResult<Review> {
        let id: ReviewId = sqlx::query_scalar(
            r#"
            INSERT INTO reviews (content, is_positive, user_id, film_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&review.content)
        .bind(review.is_positive)
        .bind(review.user_id)
        .bind(review.film_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Review {
            review_id: id,
            content: review.content.clone(),
            is_positive: review.is_positive,
            user_id: review.user_id,
            film_id: review.film_id,
            useful: 0,
        })
    }

    async fn update(
        &self,
        id: ReviewId,
        content: &str,
        is_positive: bool,
    ) -> AppResult<Option<Review>> {
        let affected = sqlx::query("UPDATE reviews SET content = $2, is_positive = $3 WHERE id = $1")
            .bind(id)
            .bind(content)
            .bind(is_positive)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn find_by_id(&self, id: ReviewId) -> AppResult<Option<Review>> {
        let sql = format!("{} WHERE r.id = $1 GROUP BY r.id", REVIEW_SELECT);
        let review = sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    async fn find_all(&self, film_id: Option<FilmId>, limit: i64) -> AppResult<Vec<Review>> {
        let sql = format!(
            "{} WHERE ($1::BIGINT IS NULL OR r.film_id = $1) GROUP BY r.id ORDER BY useful DESC, r.id LIMIT $2",
            REVIEW_SELECT
        );
        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(film_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(reviews)
    }

    async fn delete(&self, id: ReviewId) -> AppResult<bool> {
        let affected = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn set_reaction(&self, id: ReviewId, user_id: UserId, is_useful: bool) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO review_reactions (review_id, user_id, is_useful)
            VALUES ($1, $2, $3)
            ON CONFLICT (review_id, user_id) DO UPDATE SET is_useful = EXCLUDED.is_useful
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(is_useful)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_reaction(
        &self,
        id: ReviewId,
        user_id: UserId,
        is_useful: bool,
    ) -> AppResult<bool> {
        let affected = sqlx::query(
            "DELETE FROM review_reactions WHERE review_id = $1 AND user_id = $2 AND is_useful = $3",
        )
        .bind(id)
        .bind(user_id)
        .bind(is_useful)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(affected > 0)
    }
}
