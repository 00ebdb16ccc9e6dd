//! PostgreSQL adapters. Schema lives in `migrations/`.

mod catalog;
mod events;
mod films;
mod friends;
mod likes;
mod reviews;
mod users;

pub use catalog::{PgDirectorStorage, PgGenreStorage, PgRatingMpaStorage};
pub use events::PgEventsStorage;
pub use films::PgFilmStorage;
pub use friends::PgFriendsStorage;
pub use likes::PgLikeStorage;
pub use reviews::PgReviewStorage;
pub use users::PgUserStorage;
