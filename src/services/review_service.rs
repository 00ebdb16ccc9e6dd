use crate::{
    error::{AppError, AppResult},
    models::{EventType, FilmId, NewEvent, Operation, Review, ReviewId, ReviewPayload, UserId},
    services::user_service::ensure_user_exists,
    storage::Storage,
};

/// Film reviews and their usefulness reactions
#[derive(Clone)]
pub struct ReviewService {
    storage: Storage,
}

impl ReviewService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub async fn create(&self, payload: ReviewPayload) -> AppResult<Review> {
        require_content(&payload)?;
        ensure_user_exists(&self.storage, payload.user_id).await?;
        self.ensure_film_exists(payload.film_id).await?;

        let review = self.storage.reviews.create(&payload).await?;
        self.record_event(&review, Operation::Add).await?;

        tracing::info!(
            review_id = review.review_id,
            film_id = review.film_id,
            user_id = review.user_id,
            "Review created"
        );
        Ok(review)
    }

    /// Updates content and polarity; the author and film are kept
    pub async fn update(&self, payload: ReviewPayload) -> AppResult<Review> {
        let review_id = payload.review_id.ok_or_else(|| {
            AppError::InvalidInput("review id is required for update".to_string())
        })?;
        require_content(&payload)?;

        let review = self
            .storage
            .reviews
            .update(review_id, &payload.content, payload.is_positive)
            .await?
            .ok_or(AppError::ReviewNotFound(review_id))?;
        self.record_event(&review, Operation::Update).await?;

        tracing::info!(review_id, "Review updated");
        Ok(review)
    }

    pub async fn delete(&self, review_id: ReviewId) -> AppResult<()> {
        let review = self.find_by_id(review_id).await?;
        self.storage.reviews.delete(review_id).await?;
        self.record_event(&review, Operation::Remove).await?;

        tracing::info!(review_id, "Review deleted");
        Ok(())
    }

    pub async fn find_by_id(&self, review_id: ReviewId) -> AppResult<Review> {
        self.storage
            .reviews
            .find_by_id(review_id)
            .await?
            .ok_or(AppError::ReviewNotFound(review_id))
    }

    /// Most useful reviews first, optionally for one film only
    pub async fn find_all(&self, film_id: Option<FilmId>, count: usize) -> AppResult<Vec<Review>> {
        if let Some(film_id) = film_id {
            self.ensure_film_exists(film_id).await?;
        }
        let limit = i64::try_from(count).unwrap_or(i64::MAX);
        self.storage.reviews.find_all(film_id, limit).await
    }

    pub async fn add_like(&self, review_id: ReviewId, user_id: UserId) -> AppResult<Review> {
        self.react(review_id, user_id, true).await
    }

    pub async fn add_dislike(&self, review_id: ReviewId, user_id: UserId) -> AppResult<Review> {
        self.react(review_id, user_id, false).await
    }

    pub async fn remove_like(&self, review_id: ReviewId, user_id: UserId) -> AppResult<Review> {
        self.unreact(review_id, user_id, true).await
    }

    pub async fn remove_dislike(&self, review_id: ReviewId, user_id: UserId) -> AppResult<Review> {
        self.unreact(review_id, user_id, false).await
    }

    async fn react(&self, review_id: ReviewId, user_id: UserId, is_useful: bool) -> AppResult<Review> {
        self.find_by_id(review_id).await?;
        ensure_user_exists(&self.storage, user_id).await?;

        self.storage
            .reviews
            .set_reaction(review_id, user_id, is_useful)
            .await?;
        tracing::debug!(review_id, user_id, is_useful, "Review reaction set");
        self.find_by_id(review_id).await
    }

    async fn unreact(&self, review_id: ReviewId, user_id: UserId, is_useful: bool) -> AppResult<Review> {
        self.find_by_id(review_id).await?;
        ensure_user_exists(&self.storage, user_id).await?;

        let removed = self
            .storage
            .reviews
            .remove_reaction(review_id, user_id, is_useful)
            .await?;
        tracing::debug!(review_id, user_id, is_useful, removed, "Review reaction removed");
        self.find_by_id(review_id).await
    }

    async fn ensure_film_exists(&self, film_id: FilmId) -> AppResult<()> {
        self.storage
            .films
            .find_by_id(film_id)
            .await?
            .ok_or(AppError::FilmNotFound(film_id))?;
        Ok(())
    }

    // events are attributed to the review's author
    async fn record_event(&self, review: &Review, operation: Operation) -> AppResult<()> {
        self.storage
            .events
            .add(NewEvent::new(
                review.user_id,
                review.review_id,
                EventType::Review,
                operation,
            ))
            .await?;
        Ok(())
    }
}

fn require_content(payload: &ReviewPayload) -> AppResult<()> {
    if payload.content.trim().is_empty() {
        return Err(AppError::InvalidInput("review content must not be blank".to_string()));
    }
    Ok(())
}
