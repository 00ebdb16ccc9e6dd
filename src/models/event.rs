use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use super::user::UserId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Like,
    Friend,
    Review,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Add,
    Remove,
    Update,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Like => "LIKE",
            EventType::Friend => "FRIEND",
            EventType::Review => "REVIEW",
        }
    }
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "ADD",
            Operation::Remove => "REMOVE",
            Operation::Update => "UPDATE",
        }
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LIKE" => Ok(EventType::Like),
            "FRIEND" => Ok(EventType::Friend),
            "REVIEW" => Ok(EventType::Review),
            other => Err(format!("unknown event type '{}'", other)),
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(Operation::Add),
            "REMOVE" => Ok(Operation::Remove),
            "UPDATE" => Ok(Operation::Update),
            other => Err(format!("unknown operation '{}'", other)),
        }
    }
}

/// Activity feed entry, append-only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_id: i64,
    pub user_id: UserId,
    pub entity_id: i64,
    pub event_type: EventType,
    pub operation: Operation,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Event about to be appended; the store assigns id and timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewEvent {
    pub user_id: UserId,
    pub entity_id: i64,
    pub event_type: EventType,
    pub operation: Operation,
}

impl NewEvent {
    pub fn new(user_id: UserId, entity_id: i64, event_type: EventType, operation: Operation) -> Self {
        Self {
            user_id,
            entity_id,
            event_type,
            operation,
        }
    }
}
