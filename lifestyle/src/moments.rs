use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::store::{KeyValueStore, StoreError, read_json, read_text, write_json};
use crate::validation::{ValidationError, require};

pub const POSTS_KEY: &str = "posts";
pub const BACKGROUND_KEY: &str = "momentBg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    Me,
    Friend,
}

impl Author {
    /// Anything other than `"friend"` is the local user.
    fn lenient(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("friend") => Author::Friend,
            _ => Author::Me,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author: Author,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author: Author,
    pub likes: u32,
    pub liked: bool,
    pub comments: Vec<Comment>,
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn time_of(value: Option<&Value>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    value
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(fallback)
}

fn count_of(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(n)) => n.as_f64().map_or(0, |f| f.max(0.0) as u32),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Builds a post from whatever shape was stored. A missing `liked` flag is
/// inferred from a positive like count.
pub fn normalize_post(raw: &Value, now: DateTime<Utc>) -> Post {
    let likes = count_of(raw.get("likes"));
    let liked = raw
        .get("liked")
        .and_then(Value::as_bool)
        .unwrap_or(likes > 0);
    let comments = raw
        .get("comments")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .map(|c| Comment {
                    id: text_of(c.get("id")),
                    text: text_of(c.get("text")),
                    author: Author::lenient(c.get("author")),
                    created_at: time_of(c.get("createdAt"), now),
                })
                .collect()
        })
        .unwrap_or_default();

    Post {
        id: text_of(raw.get("id")),
        text: text_of(raw.get("text")),
        image: raw
            .get("image")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        created_at: time_of(raw.get("createdAt"), now),
        author: Author::lenient(raw.get("author")),
        likes,
        liked,
        comments,
    }
}

pub struct Moments<'s> {
    store: &'s mut dyn KeyValueStore,
}

impl<'s> Moments<'s> {
    pub fn new(store: &'s mut dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Newest first.
    pub fn posts(&self, now: DateTime<Utc>) -> Vec<Post> {
        let raw: Vec<Value> = read_json(&*self.store, POSTS_KEY);
        raw.iter().map(|p| normalize_post(p, now)).collect()
    }

    /// Posts whose text contains `keyword`; a blank keyword matches all.
    pub fn search(&self, keyword: &str, now: DateTime<Utc>) -> Vec<Post> {
        let keyword = keyword.trim();
        self.posts(now)
            .into_iter()
            .filter(|p| keyword.is_empty() || p.text.contains(keyword))
            .collect()
    }

    pub fn publish(
        &mut self,
        text: &str,
        image: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Post, ValidationError> {
        let text = text.trim().to_string();
        let image = image.filter(|i| !i.trim().is_empty());
        if text.is_empty() && image.is_none() {
            return Err(ValidationError::Required("text or image"));
        }
        let post = Post {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            image,
            created_at: now,
            author: Author::Me,
            likes: 0,
            liked: false,
            comments: Vec::new(),
        };
        let mut next = vec![post.clone()];
        next.extend(self.posts(now));
        write_json(self.store, POSTS_KEY, &next)?;
        debug!(id = %post.id, "moment published");
        Ok(post)
    }

    fn update<F>(&mut self, id: &str, now: DateTime<Utc>, change: F) -> Result<Post, ValidationError>
    where
        F: FnOnce(&mut Post),
    {
        let mut posts = self.posts(now);
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ValidationError::NotFound(id.to_string()))?;
        change(post);
        let updated = post.clone();
        write_json(self.store, POSTS_KEY, &posts)?;
        Ok(updated)
    }

    pub fn toggle_like(&mut self, id: &str, now: DateTime<Utc>) -> Result<Post, ValidationError> {
        self.update(id, now, |p| {
            if p.liked {
                p.likes = p.likes.saturating_sub(1);
            } else {
                p.likes += 1;
            }
            p.liked = !p.liked;
        })
    }

    pub fn add_comment(
        &mut self,
        id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Post, ValidationError> {
        let comment = Comment {
            id: uuid::Uuid::new_v4().to_string(),
            text: require("comment", text)?,
            author: Author::Me,
            created_at: now,
        };
        self.update(id, now, |p| p.comments.push(comment))
    }

    pub fn delete(&mut self, id: &str, now: DateTime<Utc>) -> Result<bool, ValidationError> {
        let before = self.posts(now);
        let next: Vec<Post> = before.iter().filter(|p| p.id != id).cloned().collect();
        if next.len() == before.len() {
            return Ok(false);
        }
        write_json(self.store, POSTS_KEY, &next)?;
        Ok(true)
    }

    pub fn background(&self) -> Option<String> {
        read_text(&*self.store, BACKGROUND_KEY)
    }

    pub fn set_background(&mut self, image: &str) -> Result<(), StoreError> {
        self.store.set(BACKGROUND_KEY, image.to_string())
    }
}
