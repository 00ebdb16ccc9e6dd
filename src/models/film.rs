use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::catalog::{Director, DirectorId, Genre, GenreId, IdRef, Mpa, MpaId};

pub type FilmId = i64;

/// Film row as stored, before genres, rating and directors are attached
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FilmRecord {
    pub id: FilmId,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub mpa_id: MpaId,
}

/// Film returned to clients, enriched with its catalog data
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    pub id: FilmId,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub mpa: Mpa,
    pub genres: Vec<Genre>,
    pub directors: Vec<Director>,
}

impl Film {
    pub fn release_year(&self) -> i32 {
        self.release_date.year()
    }

    pub fn has_genre(&self, genre_id: GenreId) -> bool {
        self.genres.iter().any(|genre| genre.id == genre_id)
    }
}

/// Film fields accepted on create and update
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmPayload {
    #[serde(default)]
    pub id: Option<FilmId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub mpa: IdRef<MpaId>,
    #[serde(default)]
    pub genres: Vec<IdRef<GenreId>>,
    #[serde(default)]
    pub directors: Vec<IdRef<DirectorId>>,
}

impl FilmPayload {
    pub fn to_record(&self, id: FilmId) -> FilmRecord {
        FilmRecord {
            id,
            name: self.name.clone(),
            description: self.description.clone(),
            release_date: self.release_date,
            duration: self.duration,
            mpa_id: self.mpa.id,
        }
    }

    /// Genre ids in request order, duplicates removed
    pub fn genre_ids(&self) -> Vec<GenreId> {
        dedup_ids(self.genres.iter().map(|genre| genre.id))
    }

    /// Director ids in request order, duplicates removed
    pub fn director_ids(&self) -> Vec<DirectorId> {
        dedup_ids(self.directors.iter().map(|director| director.id))
    }
}

fn dedup_ids<T>(ids: impl Iterator<Item = T>) -> Vec<T>
where
    T: Copy + Eq + std::hash::Hash,
{
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

/// Ordering for a director's filmography
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorSort {
    /// Release date ascending
    Year,
    /// Like count descending
    Likes,
}

impl DirectorSort {
    /// Parses the `sortBy` query value; unknown modes yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "year" => Some(DirectorSort::Year),
            "likes" => Some(DirectorSort::Likes),
            _ => None,
        }
    }
}

/// Film field matched by free-text search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    Title,
    Director,
}

impl SearchField {
    /// Parses a comma separated list such as `title,director`
    pub fn parse_list(value: &str) -> Result<Vec<Self>, String> {
        let mut fields = Vec::new();
        for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let field = match part.to_ascii_lowercase().as_str() {
                "title" => SearchField::Title,
                "director" => SearchField::Director,
                other => return Err(format!("unknown search field '{}'", other)),
            };
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        if fields.is_empty() {
            fields.push(SearchField::Title);
        }
        Ok(fields)
    }
}
