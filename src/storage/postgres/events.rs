use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{Event, NewEvent, UserId},
    storage::EventsStorage,
};

#[derive(Clone)]
pub struct PgEventsStorage {
    pool: PgPool,
}

impl PgEventsStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Event row with type and operation stored as text
#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    user_id: UserId,
    entity_id: i64,
    event_type: String,
    operation: String,
    created_at: i64,
}

impl TryFrom<EventRow> for Event {
    type Error = AppError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Event {
            event_id: row.id,
            user_id: row.user_id,
            entity_id: row.entity_id,
            event_type: row.event_type.parse().map_err(AppError::Internal)?,
            operation: row.operation.parse().map_err(AppError::Internal)?,
            timestamp: row.created_at,
        })
    }
}

#[async_trait]
impl EventsStorage for PgEventsStorage {
    async fn add(&self, event: NewEvent) -> AppResult<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (user_id, entity_id, event_type, operation, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, entity_id, event_type, operation, created_at
            "#,
        )
        .bind(event.user_id)
        .bind(event.entity_id)
        .bind(event.event_type.as_str())
        .bind(event.operation.as_str())
        .bind(Utc::now().timestamp_millis())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn user_events(&self, user_id: UserId) -> AppResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, user_id, entity_id, event_type, operation, created_at
            FROM events
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Event::try_from).collect()
    }
}
