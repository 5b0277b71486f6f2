use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{AppEvent, EventBus};
use crate::store::{KeyValueStore, read_json, write_json};
use crate::validation::{ValidationError, require};

pub const ANNIVERSARIES_KEY: &str = "anniversaries";
pub const DEFAULT_COLOR: &str = "#ff6b6b";
pub const DEFAULT_BACKGROUND: &str = "#ffe8e8";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anniversary {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub reminder: bool,
    pub color: String,
    pub background_color: String,
    pub is_top: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnniversaryDraft {
    pub name: String,
    pub date: NaiveDate,
    /// Pins the entry to the top, unpinning any other.
    pub reminder: bool,
    pub color: String,
    pub background_color: String,
}

impl AnniversaryDraft {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
            reminder: false,
            color: DEFAULT_COLOR.to_string(),
            background_color: DEFAULT_BACKGROUND.to_string(),
        }
    }

    pub fn pinned(mut self) -> Self {
        self.reminder = true;
        self
    }
}

/// Partial update; `None` keeps the stored value. The pin always follows
/// the resulting `reminder`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnniversaryPatch {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub reminder: Option<bool>,
    pub color: Option<String>,
    pub background_color: Option<String>,
}

pub struct Anniversaries<'s> {
    store: &'s mut dyn KeyValueStore,
    events: Option<EventBus>,
}

impl<'s> Anniversaries<'s> {
    pub fn new(store: &'s mut dyn KeyValueStore) -> Self {
        Self { store, events: None }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn all(&self) -> Vec<Anniversary> {
        read_json(&*self.store, ANNIVERSARIES_KEY)
    }

    pub fn top(&self) -> Option<Anniversary> {
        self.all().into_iter().find(|a| a.is_top)
    }

    fn save(&mut self, list: &[Anniversary]) -> Result<(), ValidationError> {
        write_json(self.store, ANNIVERSARIES_KEY, list)?;
        if let Some(events) = &self.events {
            events.publish(AppEvent::AnniversaryUpdated);
        }
        Ok(())
    }

    pub fn add(&mut self, draft: AnniversaryDraft, now: NaiveDateTime) -> Result<Anniversary, ValidationError> {
        let name = require("name", &draft.name)?;
        let stamp = now.and_utc().timestamp_millis();
        let item = Anniversary {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            date: draft.date,
            reminder: draft.reminder,
            color: draft.color,
            background_color: draft.background_color,
            is_top: draft.reminder,
            created_at: stamp,
            updated_at: stamp,
        };

        let mut next: Vec<Anniversary> = self
            .all()
            .into_iter()
            .map(|a| Anniversary {
                is_top: a.is_top && !item.is_top,
                ..a
            })
            .collect();
        next.push(item.clone());
        self.save(&next)?;
        debug!(id = %item.id, pinned = item.is_top, "anniversary added");
        Ok(item)
    }

    pub fn update(
        &mut self,
        id: &str,
        patch: AnniversaryPatch,
        now: NaiveDateTime,
    ) -> Result<Anniversary, ValidationError> {
        let list = self.all();
        let Some(current) = list.iter().find(|a| a.id == id).cloned() else {
            return Err(ValidationError::NotFound(id.to_string()));
        };
        let name = match patch.name {
            Some(name) => require("name", &name)?,
            None => current.name.clone(),
        };
        let reminder = patch.reminder.unwrap_or(current.reminder);
        let updated = Anniversary {
            name,
            date: patch.date.unwrap_or(current.date),
            reminder,
            color: patch.color.unwrap_or(current.color),
            background_color: patch.background_color.unwrap_or(current.background_color),
            is_top: reminder,
            updated_at: now.and_utc().timestamp_millis(),
            ..current
        };

        let next: Vec<Anniversary> = list
            .into_iter()
            .map(|a| {
                if a.id == id {
                    updated.clone()
                } else {
                    Anniversary {
                        is_top: a.is_top && !reminder,
                        ..a
                    }
                }
            })
            .collect();
        self.save(&next)?;
        Ok(updated)
    }

    pub fn set_top(&mut self, id: &str, now: NaiveDateTime) -> Result<bool, ValidationError> {
        let list = self.all();
        if !list.iter().any(|a| a.id == id) {
            return Ok(false);
        }
        let stamp = now.and_utc().timestamp_millis();
        let next: Vec<Anniversary> = list
            .into_iter()
            .map(|a| {
                let is_target = a.id == id;
                Anniversary {
                    is_top: is_target,
                    updated_at: if is_target { stamp } else { a.updated_at },
                    ..a
                }
            })
            .collect();
        self.save(&next)?;
        Ok(true)
    }

    pub fn delete(&mut self, id: &str) -> Result<bool, ValidationError> {
        let before = self.all();
        let next: Vec<Anniversary> = before.iter().filter(|a| a.id != id).cloned().collect();
        if next.len() == before.len() {
            return Ok(false);
        }
        self.save(&next)?;
        Ok(true)
    }
}

/// Days until the next yearly occurrence of `date`, 0 when it is today.
/// A Feb 29 date falls on Mar 1 in common years.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    let this_year = occurrence_in(date, today.year());
    let next = if this_year < today {
        occurrence_in(date, today.year() + 1)
    } else {
        this_year
    };
    (next - today).num_days()
}

fn occurrence_in(date: NaiveDate, year: i32) -> NaiveDate {
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(date)
}

pub fn status_label(date: NaiveDate, today: NaiveDate) -> String {
    match days_until(date, today) {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {n} days"),
    }
}
