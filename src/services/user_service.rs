use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::{Event, EventType, Film, FilmId, Friendship, NewEvent, Operation, User, UserId, UserPayload},
    services::{
        film_service::{enrich_films, load_films},
        ranking,
    },
    storage::Storage,
};

/// Loads a user or fails with `UserNotFound`
pub(crate) async fn ensure_user_exists(storage: &Storage, user_id: UserId) -> AppResult<User> {
    storage.users.find_by_id(user_id).await?.ok_or_else(|| {
        tracing::debug!(user_id, "User not found");
        AppError::UserNotFound(user_id)
    })
}

/// Users, friendships, activity feed and recommendations
#[derive(Clone)]
pub struct UserService {
    storage: Storage,
}

impl UserService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        self.storage.users.find_all().await
    }

    pub async fn find_by_id(&self, user_id: UserId) -> AppResult<User> {
        ensure_user_exists(&self.storage, user_id).await
    }

    /// Creates a user; a blank name is replaced by the login
    pub async fn create(&self, payload: UserPayload) -> AppResult<User> {
        let user = self.storage.users.create(&payload.into_user(0)).await?;
        tracing::info!(user_id = user.id, login = %user.login, "User created");
        Ok(user)
    }

    pub async fn update(&self, payload: UserPayload) -> AppResult<User> {
        let user_id = payload
            .id
            .ok_or_else(|| AppError::InvalidInput("user id is required for update".to_string()))?;
        ensure_user_exists(&self.storage, user_id).await?;

        let user = self.storage.users.update(&payload.into_user(user_id)).await?;
        tracing::info!(user_id, "User updated");
        Ok(user)
    }

    pub async fn delete(&self, user_id: UserId) -> AppResult<()> {
        ensure_user_exists(&self.storage, user_id).await?;
        self.storage.users.delete(user_id).await?;
        tracing::info!(user_id, "User deleted");
        Ok(())
    }

    /// Adds the directed edge `user_id -> friend_id`
    ///
    /// The returned edge is mutual when `friend_id` already lists `user_id`.
    pub async fn add_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<Friendship> {
        if user_id == friend_id {
            return Err(AppError::InvalidInput(
                "a user cannot befriend themselves".to_string(),
            ));
        }
        ensure_user_exists(&self.storage, user_id).await?;
        ensure_user_exists(&self.storage, friend_id).await?;

        self.storage.friends.add(user_id, friend_id).await?;
        let edge = self
            .storage
            .friends
            .get(user_id, friend_id)
            .await?
            .ok_or_else(|| AppError::Internal("friendship missing after insert".to_string()))?;

        self.storage
            .events
            .add(NewEvent::new(user_id, friend_id, EventType::Friend, Operation::Add))
            .await?;

        tracing::info!(user_id, friend_id, is_mutual = edge.is_mutual, "Friend added");
        Ok(edge)
    }

    /// Removes only the edge `user_id -> friend_id`; the reverse edge is kept
    pub async fn remove_friend(&self, user_id: UserId, friend_id: UserId) -> AppResult<()> {
        ensure_user_exists(&self.storage, user_id).await?;
        ensure_user_exists(&self.storage, friend_id).await?;

        let removed = self.storage.friends.delete(user_id, friend_id).await?;
        self.storage
            .events
            .add(NewEvent::new(user_id, friend_id, EventType::Friend, Operation::Remove))
            .await?;

        tracing::info!(user_id, friend_id, removed, "Friend removed");
        Ok(())
    }

    pub async fn friends(&self, user_id: UserId) -> AppResult<Vec<User>> {
        ensure_user_exists(&self.storage, user_id).await?;
        let friend_ids = self.storage.friends.friend_ids(user_id).await?;
        self.load_users(&friend_ids).await
    }

    /// Users on both friend lists
    pub async fn common_friends(&self, user_id: UserId, other_id: UserId) -> AppResult<Vec<User>> {
        ensure_user_exists(&self.storage, user_id).await?;
        ensure_user_exists(&self.storage, other_id).await?;

        let others: HashSet<UserId> = self
            .storage
            .friends
            .friend_ids(other_id)
            .await?
            .into_iter()
            .collect();
        let common: Vec<UserId> = self
            .storage
            .friends
            .friend_ids(user_id)
            .await?
            .into_iter()
            .filter(|id| others.contains(id))
            .collect();

        self.load_users(&common).await
    }

    pub async fn feed(&self, user_id: UserId) -> AppResult<Vec<Event>> {
        ensure_user_exists(&self.storage, user_id).await?;
        self.storage.events.user_events(user_id).await
    }

    /// Films liked by other users that this user has not liked
    ///
    /// Users sharing the most likes are consulted first; users sharing none
    /// are still consulted, last.
    pub async fn recommend_films(&self, user_id: UserId) -> AppResult<Vec<Film>> {
        ensure_user_exists(&self.storage, user_id).await?;

        let target: HashSet<FilmId> = self
            .storage
            .likes
            .liked_film_ids(user_id)
            .await?
            .into_iter()
            .collect();

        let mut others = Vec::new();
        for user in self.storage.users.find_all().await? {
            if user.id == user_id {
                continue;
            }
            let liked = self.storage.likes.liked_film_ids(user.id).await?;
            others.push((user.id, liked));
        }

        let candidates = ranking::rank_candidates(&target, others);
        let film_ids = ranking::collect_recommendations(&target, &candidates);

        tracing::info!(
            user_id,
            liked = target.len(),
            candidates = candidates.len(),
            recommended = film_ids.len(),
            "Recommendations computed"
        );

        let records = load_films(&self.storage, &film_ids).await?;
        enrich_films(&self.storage, records).await
    }

    async fn load_users(&self, user_ids: &[UserId]) -> AppResult<Vec<User>> {
        let mut users = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            if let Some(user) = self.storage.users.find_by_id(*id).await? {
                users.push(user);
            }
        }
        Ok(users)
    }
}
