use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{KeyValueStore, StoreError, read_json, write_json};
use crate::timestamp;

pub const KEY_PREFIX: &str = "notes:byDate:";
pub const SAVE_DELAY: Duration = Duration::from_millis(500);

pub fn key_for(date: NaiveDate) -> String {
    format!("{KEY_PREFIX}{}", date.format(timestamp::DATE_FORMAT))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryNote {
    pub date: NaiveDate,
    pub html: String,
    #[serde(with = "crate::timestamp::minute")]
    pub updated_at: NaiveDateTime,
}

pub struct Diary<'s> {
    store: &'s mut dyn KeyValueStore,
}

impl<'s> Diary<'s> {
    pub fn new(store: &'s mut dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn note(&self, date: NaiveDate) -> Option<DiaryNote> {
        read_json::<Option<DiaryNote>>(&*self.store, &key_for(date))
    }

    /// Body for the day, empty when nothing was written yet.
    pub fn html_for(&self, date: NaiveDate) -> String {
        self.note(date).map(|note| note.html).unwrap_or_default()
    }

    pub fn save(
        &mut self,
        date: NaiveDate,
        html: &str,
        now: NaiveDateTime,
    ) -> Result<DiaryNote, StoreError> {
        let note = DiaryNote {
            date,
            html: html.to_string(),
            updated_at: now,
        };
        write_json(self.store, &key_for(date), &note)?;
        debug!(%date, len = html.len(), "diary saved");
        Ok(note)
    }

    /// Days that have a note, newest first.
    pub fn history_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .store
            .keys()
            .iter()
            .filter_map(|key| key.strip_prefix(KEY_PREFIX))
            .filter_map(timestamp::parse_date)
            .collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates
    }
}

/// Trailing-edge debounce: each `touch` restarts the wait, `take_due`
/// fires once the wait has elapsed without another touch.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    pending_since: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending_since: None,
        }
    }

    pub fn touch(&mut self, now: Instant) {
        self.pending_since = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(since) if now.duration_since(since) >= self.delay => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }
}

/// Today's note being edited; writes happen once typing pauses.
#[derive(Debug, Clone)]
pub struct DiaryDraft {
    date: NaiveDate,
    html: String,
    debounce: Debounce,
}

impl DiaryDraft {
    pub fn open(diary: &Diary<'_>, date: NaiveDate) -> Self {
        Self {
            date,
            html: diary.html_for(date),
            debounce: Debounce::new(SAVE_DELAY),
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn edit(&mut self, html: impl Into<String>, now: Instant) {
        self.html = html.into();
        self.debounce.touch(now);
    }

    /// Saves if the debounce window has closed. Returns whether it wrote.
    pub fn poll(
        &mut self,
        diary: &mut Diary<'_>,
        now: Instant,
        wall_clock: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        if !self.debounce.take_due(now) {
            return Ok(false);
        }
        diary.save(self.date, &self.html, wall_clock)?;
        Ok(true)
    }

    /// Writes any pending edit immediately.
    pub fn flush(&mut self, diary: &mut Diary<'_>, wall_clock: NaiveDateTime) -> Result<(), StoreError> {
        if self.debounce.is_pending() {
            self.debounce = Debounce::new(SAVE_DELAY);
            diary.save(self.date, &self.html, wall_clock)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn debounce_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debounce = Debounce::new(SAVE_DELAY);
        debounce.touch(start);
        assert!(!debounce.take_due(start + Duration::from_millis(499)));

        debounce.touch(start + Duration::from_millis(300));
        assert!(!debounce.take_due(start + Duration::from_millis(600)));
        assert!(debounce.take_due(start + Duration::from_millis(800)));
        assert!(!debounce.take_due(start + Duration::from_millis(2000)));
    }

    #[test]
    fn history_is_newest_first() {
        let mut store = MemoryStore::new();
        let mut diary = Diary::new(&mut store);
        let at = day(1).and_hms_opt(9, 0, 0).unwrap();
        for d in [3, 12, 7] {
            diary.save(day(d), "<p>hi</p>", at).unwrap();
        }
        assert_eq!(diary.history_dates(), vec![day(12), day(7), day(3)]);
    }

    #[test]
    fn draft_saves_once_typing_pauses() {
        let mut store = MemoryStore::new();
        let mut diary = Diary::new(&mut store);
        let at = day(2).and_hms_opt(21, 30, 0).unwrap();
        let start = Instant::now();

        let mut draft = DiaryDraft::open(&diary, day(2));
        assert_eq!(draft.html(), "");
        draft.edit("<b>dinner</b>", start);
        assert!(!draft.poll(&mut diary, start, at).unwrap());
        assert!(diary.note(day(2)).is_none());

        assert!(draft.poll(&mut diary, start + SAVE_DELAY, at).unwrap());
        let note = diary.note(day(2)).unwrap();
        assert_eq!(note.html, "<b>dinner</b>");
        assert_eq!(note.updated_at, at);
    }
}
