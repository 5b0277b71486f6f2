use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{KeyValueStore, StoreError, read_json, write_json};
use crate::validation::{ValidationError, require};

pub const MOVIES_KEY: &str = "movies";
const DEFAULT_SHARE_TARGET: &str = "friend";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default)]
    pub poster: String,
    pub rating: f32,
    pub year: i32,
    pub genre: String,
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub is_watched: bool,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_with: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieDraft {
    pub title: String,
    pub kind: MediaKind,
    pub poster: String,
    pub rating: f32,
    pub year: i32,
    pub genre: String,
    pub description: String,
    pub duration: String,
}

impl MovieDraft {
    pub fn new(title: impl Into<String>, kind: MediaKind, year: i32) -> Self {
        Self {
            title: title.into(),
            kind,
            poster: String::new(),
            rating: 8.0,
            year,
            genre: String::new(),
            description: String::new(),
            duration: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieFilter {
    All,
    Only(MediaKind),
}

impl MovieFilter {
    pub fn matches(self, item: &MovieItem) -> bool {
        match self {
            MovieFilter::All => true,
            MovieFilter::Only(kind) => item.kind == kind,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn preset(
    id: &str,
    title: &str,
    kind: MediaKind,
    poster: &str,
    rating: f32,
    year: i32,
    genre: &str,
    description: &str,
    duration: &str,
    created_at: i64,
) -> MovieItem {
    MovieItem {
        id: id.to_string(),
        title: title.to_string(),
        kind,
        poster: poster.to_string(),
        rating,
        year,
        genre: genre.to_string(),
        description: description.to_string(),
        duration: duration.to_string(),
        is_watched: false,
        is_shared: false,
        shared_with: None,
        created_at,
    }
}

/// Watch-list contents written the first time the list is found empty.
pub fn default_movies(created_at: i64) -> Vec<MovieItem> {
    vec![
        preset(
            "1",
            "Titanic",
            MediaKind::Movie,
            "https://img2.doubanio.com/view/photo/s_ratio_poster/public/p457760035.jpg",
            9.4,
            1997,
            "Romance/Disaster",
            "A luxury liner strikes an iceberg on its maiden voyage in April 1912.",
            "194 min",
            created_at,
        ),
        preset(
            "2",
            "The Shawshank Redemption",
            MediaKind::Movie,
            "https://img2.doubanio.com/view/photo/s_ratio_poster/public/p480747492.jpg",
            9.7,
            1994,
            "Drama/Crime",
            "A banker wrongly convicted of murder spends decades in Shawshank prison.",
            "142 min",
            created_at,
        ),
        preset(
            "3",
            "Game of Thrones",
            MediaKind::Tv,
            "https://img1.doubanio.com/view/photo/s_ratio_poster/public/p2869056072.jpg",
            9.3,
            2011,
            "Fantasy/Drama",
            "Noble houses of Westeros fight for the Iron Throne.",
            "8 seasons",
            created_at,
        ),
        preset(
            "4",
            "Friends",
            MediaKind::Tv,
            "https://img2.doubanio.com/view/photo/s_ratio_poster/public/p1910895711.jpg",
            9.7,
            1994,
            "Comedy/Romance",
            "Six friends share ten years of life in Manhattan.",
            "10 seasons",
            created_at,
        ),
    ]
}

pub struct Watchlist<'s> {
    store: &'s mut dyn KeyValueStore,
}

impl<'s> Watchlist<'s> {
    pub fn new(store: &'s mut dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn all(&self) -> Vec<MovieItem> {
        read_json(&*self.store, MOVIES_KEY)
    }

    pub fn filtered(&self, filter: MovieFilter) -> Vec<MovieItem> {
        self.all().into_iter().filter(|m| filter.matches(m)).collect()
    }

    /// Writes the presets if the list is empty. Returns whether it did.
    pub fn seed_defaults(&mut self, now: NaiveDateTime) -> Result<bool, StoreError> {
        if !self.all().is_empty() {
            return Ok(false);
        }
        let defaults = default_movies(now.and_utc().timestamp_millis());
        write_json(self.store, MOVIES_KEY, &defaults)?;
        debug!(count = defaults.len(), "seeded default watch-list");
        Ok(true)
    }

    pub fn add(&mut self, draft: MovieDraft, now: NaiveDateTime) -> Result<MovieItem, ValidationError> {
        let item = MovieItem {
            id: uuid::Uuid::new_v4().to_string(),
            title: require("title", &draft.title)?,
            kind: draft.kind,
            poster: draft.poster.trim().to_string(),
            rating: draft.rating,
            year: draft.year,
            genre: require("genre", &draft.genre)?,
            description: require("description", &draft.description)?,
            duration: draft.duration.trim().to_string(),
            is_watched: false,
            is_shared: false,
            shared_with: None,
            created_at: now.and_utc().timestamp_millis(),
        };
        let mut next = self.all();
        next.push(item.clone());
        write_json(self.store, MOVIES_KEY, &next)?;
        Ok(item)
    }

    fn update<F>(&mut self, id: &str, change: F) -> Result<MovieItem, ValidationError>
    where
        F: FnOnce(MovieItem) -> MovieItem,
    {
        let mut list = self.all();
        let index = list
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| ValidationError::NotFound(id.to_string()))?;
        let updated = change(list[index].clone());
        list[index] = updated.clone();
        write_json(self.store, MOVIES_KEY, &list)?;
        Ok(updated)
    }

    pub fn toggle_watched(&mut self, id: &str) -> Result<MovieItem, ValidationError> {
        self.update(id, |m| MovieItem {
            is_watched: !m.is_watched,
            ..m
        })
    }

    /// Marks the entry shared with `target`, or a generic label when no
    /// friend is known.
    pub fn share(&mut self, id: &str, target: Option<&str>) -> Result<MovieItem, ValidationError> {
        let shared_with = target.unwrap_or(DEFAULT_SHARE_TARGET).to_string();
        self.update(id, |m| MovieItem {
            is_shared: true,
            shared_with: Some(shared_with),
            ..m
        })
    }

    pub fn delete(&mut self, id: &str) -> Result<bool, ValidationError> {
        let before = self.all();
        let next: Vec<MovieItem> = before.iter().filter(|m| m.id != id).cloned().collect();
        if next.len() == before.len() {
            return Ok(false);
        }
        write_json(self.store, MOVIES_KEY, &next)?;
        Ok(true)
    }

    pub fn watched_count(&self) -> usize {
        self.all().iter().filter(|m| m.is_watched).count()
    }

    pub fn shared_count(&self) -> usize {
        self.all().iter().filter(|m| m.is_shared).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_under_type() {
        let item = &default_movies(0)[2];
        let json = serde_json::to_value(item).unwrap();
        assert_eq!(json["type"], "tv");
        assert_eq!(json["isWatched"], false);
        assert!(json.get("sharedWith").is_none());
    }
}
