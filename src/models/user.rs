use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: NaiveDate,
}

/// User fields accepted on create and update
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub id: Option<UserId>,
    pub email: String,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    pub birthday: NaiveDate,
}

impl UserPayload {
    /// Display name, falling back to the login when absent or blank
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => self.login.clone(),
        }
    }

    /// Materializes the payload as a user with the given id
    pub fn into_user(self, id: UserId) -> User {
        let name = self.display_name();
        User {
            id,
            email: self.email,
            login: self.login,
            name,
            birthday: self.birthday,
        }
    }
}

/// Directed friendship edge
///
/// `is_mutual` is derived from the presence of the reverse edge when the
/// edge is read; it is never persisted.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    pub user_id: UserId,
    pub friend_id: UserId,
    pub is_mutual: bool,
}
