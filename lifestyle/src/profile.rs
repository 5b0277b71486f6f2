use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::events::{AppEvent, EventBus};
use crate::store::{KeyValueStore, StoreError, read_text};
use crate::timestamp::{DATE_FORMAT, parse_date};
use crate::validation::{ValidationError, validate_phone};

pub const NICKNAME_KEY: &str = "myNickname";
pub const AVATAR_KEY: &str = "myAvatar";
pub const MET_AT_KEY: &str = "metAt";
pub const LOGGED_IN_KEY: &str = "isLoggedIn";
pub const USER_PHONE_KEY: &str = "userPhone";

pub const CODE_LENGTH: usize = 6;

/// `138****1234`, or `None` for anything too short to mask.
pub fn mask_phone(phone: &str) -> Option<String> {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() < 7 {
        return None;
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    Some(format!("{head}****{tail}"))
}

/// The day they met counts as day 1; a future date still reads 1.
pub fn days_together(met_at: NaiveDate, today: NaiveDate) -> i64 {
    ((today - met_at).num_days() + 1).max(1)
}

/// The local user's profile and client-side login flag.
pub struct Profile<'s> {
    store: &'s mut dyn KeyValueStore,
    events: Option<EventBus>,
}

impl<'s> Profile<'s> {
    pub fn new(store: &'s mut dyn KeyValueStore) -> Self {
        Self { store, events: None }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    fn publish(&self, event: AppEvent) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }

    pub fn nickname(&self) -> Option<String> {
        read_text(&*self.store, NICKNAME_KEY)
    }

    /// Stores the trimmed nickname; blank clears it.
    pub fn set_nickname(&mut self, nickname: &str) -> Result<(), StoreError> {
        self.store.set(NICKNAME_KEY, nickname.trim().to_string())?;
        self.publish(AppEvent::NicknameUpdated);
        Ok(())
    }

    pub fn avatar(&self) -> Option<String> {
        read_text(&*self.store, AVATAR_KEY)
    }

    pub fn set_avatar(&mut self, avatar: &str) -> Result<(), StoreError> {
        self.store.set(AVATAR_KEY, avatar.to_string())?;
        self.publish(AppEvent::AvatarUpdated);
        Ok(())
    }

    pub fn met_at(&self) -> Option<NaiveDate> {
        let raw = read_text(&*self.store, MET_AT_KEY)?;
        let parsed = parse_date(&raw);
        if parsed.is_none() {
            warn!(raw = %raw, "stored meeting date is not a date");
        }
        parsed
    }

    pub fn set_met_at(&mut self, date: NaiveDate) -> Result<(), StoreError> {
        self.store
            .set(MET_AT_KEY, date.format(DATE_FORMAT).to_string())
    }

    /// Counts from today when no meeting date is stored.
    pub fn days_together(&self, today: NaiveDate) -> i64 {
        days_together(self.met_at().unwrap_or(today), today)
    }

    pub fn is_logged_in(&self) -> bool {
        read_text(&*self.store, LOGGED_IN_KEY).is_some_and(|v| v == "true")
    }

    pub fn user_phone(&self) -> Option<String> {
        read_text(&*self.store, USER_PHONE_KEY)
    }

    pub fn masked_phone(&self) -> Option<String> {
        self.user_phone().as_deref().and_then(mask_phone)
    }

    /// Client-side login: a well-formed phone plus any 6-character code.
    pub fn login(&mut self, phone: &str, code: &str) -> Result<String, ValidationError> {
        if phone.trim().is_empty() {
            return Err(ValidationError::Required("phone"));
        }
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::Required("code"));
        }
        let phone = validate_phone(phone)?;
        if code.chars().count() != CODE_LENGTH {
            return Err(ValidationError::InvalidCode);
        }
        self.store.set(LOGGED_IN_KEY, "true".to_string())?;
        self.store.set(USER_PHONE_KEY, phone.clone())?;
        debug!(phone = %mask_phone(&phone).unwrap_or_default(), "logged in");
        Ok(phone)
    }

    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.store.remove(LOGGED_IN_KEY)?;
        self.store.remove(USER_PHONE_KEY)
    }
}
