//! Popularity ordering and the shared-likes recommender.
//!
//! Everything here is pure: callers fetch like counts and like lists from
//! storage and pass them in, which keeps the ordering rules testable
//! without a datastore.

use std::collections::HashSet;

use crate::models::{Film, FilmId, GenreId, UserId};

/// Orders items by descending like count
///
/// The sort is stable, so items with equal counts keep their input order.
pub fn sort_by_popularity<T>(mut items: Vec<(T, i64)>) -> Vec<T> {
    items.sort_by(|(_, a), (_, b)| b.cmp(a));
    items.into_iter().map(|(item, _)| item).collect()
}

/// Keeps only films matching the optional genre and release year
///
/// Applied to an already truncated top list, so the result is always a
/// subset of the unfiltered ranking.
pub fn filter_popular(films: Vec<Film>, genre_id: Option<GenreId>, year: Option<i32>) -> Vec<Film> {
    films
        .into_iter()
        .filter(|film| genre_id.map_or(true, |genre_id| film.has_genre(genre_id)))
        .filter(|film| year.map_or(true, |year| film.release_year() == year))
        .collect()
}

/// Films present in both lists, in the order of `first`, without duplicates
pub fn intersect(first: &[FilmId], second: &[FilmId]) -> Vec<FilmId> {
    let other: HashSet<FilmId> = second.iter().copied().collect();
    let mut seen = HashSet::new();
    first
        .iter()
        .copied()
        .filter(|id| other.contains(id) && seen.insert(*id))
        .collect()
}

/// Number of films liked by both users
pub fn overlap_score(target_liked: &HashSet<FilmId>, other_liked: &[FilmId]) -> usize {
    let distinct: HashSet<FilmId> = other_liked.iter().copied().collect();
    distinct.intersection(target_liked).count()
}

/// Another user considered as a source of recommendations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub user_id: UserId,
    pub overlap: usize,
    pub liked: Vec<FilmId>,
}

/// Scores every other user against the target's likes
///
/// Every user is kept; overlap only decides the visiting order. Users are
/// ordered by descending overlap, ties broken by ascending user id, so users
/// sharing nothing with the target come last.
pub fn rank_candidates(
    target_liked: &HashSet<FilmId>,
    others: Vec<(UserId, Vec<FilmId>)>,
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = others
        .into_iter()
        .map(|(user_id, liked)| Candidate {
            user_id,
            overlap: overlap_score(target_liked, &liked),
            liked,
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.overlap
            .cmp(&a.overlap)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    candidates
}

/// Walks ranked candidates and collects films the target has not liked
///
/// Each film appears once, attributed to the first candidate that offers it.
pub fn collect_recommendations(
    target_liked: &HashSet<FilmId>,
    candidates: &[Candidate],
) -> Vec<FilmId> {
    let mut seen: HashSet<FilmId> = target_liked.clone();
    let mut recommended = Vec::new();

    for candidate in candidates {
        for film_id in &candidate.liked {
            if seen.insert(*film_id) {
                recommended.push(*film_id);
            }
        }
    }

    recommended
}
