use serde::{Deserialize, Serialize};

pub type GenreId = i32;
pub type MpaId = i32;
pub type DirectorId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// Motion Picture Association rating (G, PG, PG-13, R, NC-17)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Mpa {
    pub id: MpaId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Director {
    pub id: DirectorId,
    pub name: String,
}

/// Director fields accepted on create and update
#[derive(Debug, Clone, Deserialize)]
pub struct DirectorPayload {
    #[serde(default)]
    pub id: Option<DirectorId>,
    pub name: String,
}

/// Reference to an existing catalog entry by id, as sent by clients
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct IdRef<T> {
    pub id: T,
}
