use serde::{Deserialize, Serialize};

use super::{film::FilmId, user::UserId};

pub type ReviewId = i64;

/// A user's review of a film
///
/// `useful` is the number of "useful" reactions minus the number of
/// "useless" ones, so a fresh review starts at 0.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub review_id: ReviewId,
    pub content: String,
    pub is_positive: bool,
    pub user_id: UserId,
    pub film_id: FilmId,
    pub useful: i32,
}

/// Review fields accepted on create and update
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    #[serde(default)]
    pub review_id: Option<ReviewId>,
    pub content: String,
    pub is_positive: bool,
    pub user_id: UserId,
    pub film_id: FilmId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_payload_deserialization() {
        let json = r#"{"content": "Too long", "isPositive": false, "userId": 1, "filmId": 2}"#;
        let payload: ReviewPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.review_id, None);
        assert!(!payload.is_positive);
        assert_eq!(payload.film_id, 2);
    }
}
