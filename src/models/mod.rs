mod catalog;
mod event;
mod film;
mod review;
mod user;

pub use catalog::{Director, DirectorId, DirectorPayload, Genre, GenreId, IdRef, Mpa, MpaId};
pub use event::{Event, EventType, NewEvent, Operation};
pub use film::{DirectorSort, Film, FilmId, FilmPayload, FilmRecord, SearchField};
pub use review::{Review, ReviewId, ReviewPayload};
pub use user::{Friendship, User, UserId, UserPayload};
