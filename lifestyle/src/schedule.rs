use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{KeyValueStore, read_json, write_json};
use crate::validation::{ValidationError, require};

pub const SCHEDULES_KEY: &str = "schedules";

pub const DEFAULT_COLOR: &str = "#4ecdc4";
pub const DEFAULT_BACKGROUND: &str = "#e8f8f5";
pub const DEFAULT_DURATION_MINUTES: u32 = 60;
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    #[serde(with = "crate::timestamp::clock")]
    pub time: NaiveTime,
    /// Minutes.
    pub duration: u32,
    pub color: String,
    pub background_color: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ScheduleItem {
    /// `[start, end)` in minutes since midnight; `end` may pass 24h.
    pub fn span(&self) -> (u32, u32) {
        span(self.time, self.duration)
    }
}

fn span(time: NaiveTime, duration: u32) -> (u32, u32) {
    let start = time.hour() * 60 + time.minute();
    (start, start.saturating_add(duration))
}

/// Half-open intervals: back-to-back entries do not overlap.
pub fn overlaps(a: (u32, u32), b: (u32, u32)) -> bool {
    !(a.1 <= b.0 || a.0 >= b.1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDraft {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: u32,
    pub color: String,
    pub background_color: String,
}

impl ScheduleDraft {
    pub fn new(title: impl Into<String>, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            date,
            time,
            duration: DEFAULT_DURATION_MINUTES,
            color: DEFAULT_COLOR.to_string(),
            background_color: DEFAULT_BACKGROUND.to_string(),
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration = minutes;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

pub struct Planner<'s> {
    store: &'s mut dyn KeyValueStore,
}

impl<'s> Planner<'s> {
    pub fn new(store: &'s mut dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn all(&self) -> Vec<ScheduleItem> {
        read_json(&*self.store, SCHEDULES_KEY)
    }

    pub fn for_date(&self, date: NaiveDate) -> Vec<ScheduleItem> {
        let mut items: Vec<ScheduleItem> =
            self.all().into_iter().filter(|s| s.date == date).collect();
        items.sort_by_key(|s| s.time);
        items
    }

    /// Every entry, most recent date first.
    pub fn history(&self) -> Vec<ScheduleItem> {
        let mut items = self.all();
        items.sort_by(|a, b| b.date.cmp(&a.date).then(a.time.cmp(&b.time)));
        items
    }

    /// The first existing entry on the same date whose interval overlaps.
    pub fn find_conflict(&self, date: NaiveDate, time: NaiveTime, duration: u32) -> Option<ScheduleItem> {
        let wanted = span(time, duration);
        self.all()
            .into_iter()
            .find(|s| s.date == date && overlaps(wanted, s.span()))
    }

    pub fn add(&mut self, draft: ScheduleDraft, now: NaiveDateTime) -> Result<ScheduleItem, ValidationError> {
        let title = require("title", &draft.title)?;
        if draft.duration == 0 {
            return Err(ValidationError::NotPositive("duration"));
        }
        if draft.duration > MAX_DURATION_MINUTES {
            return Err(ValidationError::TooLong {
                field: "duration",
                max: MAX_DURATION_MINUTES,
            });
        }
        if let Some(existing) = self.find_conflict(draft.date, draft.time, draft.duration) {
            return Err(ValidationError::ScheduleConflict(existing.title));
        }

        let stamp = now.and_utc().timestamp_millis();
        let item = ScheduleItem {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description: draft.description.trim().to_string(),
            date: draft.date,
            time: draft.time,
            duration: draft.duration,
            color: draft.color,
            background_color: draft.background_color,
            created_at: stamp,
            updated_at: stamp,
        };

        let mut next = self.all();
        next.push(item.clone());
        write_json(self.store, SCHEDULES_KEY, &next)?;
        debug!(id = %item.id, date = %item.date, "schedule added");
        Ok(item)
    }

    pub fn delete(&mut self, id: &str) -> Result<bool, ValidationError> {
        let before = self.all();
        let next: Vec<ScheduleItem> = before.iter().filter(|s| s.id != id).cloned().collect();
        if next.len() == before.len() {
            return Ok(false);
        }
        write_json(self.store, SCHEDULES_KEY, &next)?;
        Ok(true)
    }
}

/// Monday-to-Sunday strip shown above the day view. The week is anchored
/// on the Sunday that starts `day`'s calendar week, so a Sunday shows the
/// days after it.
pub fn week_dates(day: NaiveDate) -> [NaiveDate; 7] {
    let sunday = day - Duration::days(i64::from(day.weekday().num_days_from_sunday()));
    let monday = sunday + Duration::days(1);
    std::array::from_fn(|i| monday + Duration::days(i as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn span_saturates_on_huge_stored_durations() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(span(nine, u32::MAX), (540, u32::MAX));
    }

    #[test]
    fn durations_past_a_day_are_rejected() {
        let mut store = MemoryStore::new();
        let mut planner = Planner::new(&mut store);
        let day = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let now = day.and_time(nine);

        let err = planner
            .add(ScheduleDraft::new("Marathon", day, nine).with_duration(u32::MAX), now)
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { field: "duration", .. }));
        assert!(planner.all().is_empty());

        planner
            .add(ScheduleDraft::new("Trip", day, nine).with_duration(MAX_DURATION_MINUTES), now)
            .unwrap();
        assert_eq!(planner.all().len(), 1);
    }

    #[test]
    fn back_to_back_is_not_an_overlap() {
        assert!(!overlaps((600, 660), (660, 720)));
        assert!(overlaps((600, 661), (660, 720)));
        assert!(overlaps((650, 670), (600, 720)));
    }

    #[test]
    fn week_strip_starts_on_monday() {
        let wed = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let week = week_dates(wed);
        assert_eq!(week[0], NaiveDate::from_ymd_opt(2024, 5, 13).unwrap());
        assert_eq!(week[6], NaiveDate::from_ymd_opt(2024, 5, 19).unwrap());

        let sun = NaiveDate::from_ymd_opt(2024, 5, 19).unwrap();
        assert_eq!(week_dates(sun)[0], NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
    }
}
