use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::{KeyValueStore, StoreError, read_json, read_text, write_json};
use crate::validation::{ValidationError, require};

pub const ITEMS_KEY: &str = "roulette_items";
pub const DURATION_KEY: &str = "roulette_duration";
pub const SPEED_KEY: &str = "roulette_speed";

pub const DEFAULT_DURATION_SECS: f64 = 3.0;
/// Degrees per second.
pub const DEFAULT_SPEED: f64 = 360.0;
pub const MIN_SPEED: f64 = 60.0;
pub const MAX_SPEED: f64 = 1080.0;

/// Where the fixed pointer sits, in the wheel's counter-clockwise degrees
/// measured from three o'clock.
const POINTER_ANGLE: f64 = 90.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouletteItem {
    pub id: String,
    pub text: String,
}

pub fn default_items() -> Vec<RouletteItem> {
    [
        ("1", "Order takeout"),
        ("4", "Hotpot"),
        ("5", "Barbecue"),
        ("6", "See a movie"),
    ]
    .into_iter()
    .map(|(id, text)| RouletteItem {
        id: id.to_string(),
        text: text.to_string(),
    })
    .collect()
}

pub struct Roulette<'s> {
    store: &'s mut dyn KeyValueStore,
}

impl<'s> Roulette<'s> {
    pub fn new(store: &'s mut dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Stored choices, or the defaults when none are stored.
    pub fn items(&self) -> Vec<RouletteItem> {
        let items: Vec<RouletteItem> = read_json(&*self.store, ITEMS_KEY);
        if items.is_empty() {
            default_items()
        } else {
            items
        }
    }

    pub fn add_item(&mut self, text: &str) -> Result<RouletteItem, ValidationError> {
        let item = RouletteItem {
            id: uuid::Uuid::new_v4().to_string(),
            text: require("text", text)?,
        };
        let mut next = self.items();
        next.push(item.clone());
        write_json(self.store, ITEMS_KEY, &next)?;
        Ok(item)
    }

    pub fn remove_item(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.items();
        let next: Vec<RouletteItem> = before.iter().filter(|i| i.id != id).cloned().collect();
        if next.len() == before.len() {
            return Ok(false);
        }
        write_json(self.store, ITEMS_KEY, &next)?;
        Ok(true)
    }

    fn number(&self, key: &str) -> Option<f64> {
        let raw = read_text(&*self.store, key)?;
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(n),
            _ => {
                warn!(key, raw = %raw, "stored roulette setting is not a number");
                None
            }
        }
    }

    /// Seconds; anything stored that is not positive reads as the default.
    pub fn duration_secs(&self) -> f64 {
        self.number(DURATION_KEY)
            .filter(|n| *n > 0.0)
            .unwrap_or(DEFAULT_DURATION_SECS)
    }

    pub fn set_duration_secs(&mut self, secs: f64) -> Result<f64, ValidationError> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ValidationError::NotPositive("duration"));
        }
        self.store.set(DURATION_KEY, secs.to_string())?;
        Ok(secs)
    }

    pub fn speed(&self) -> f64 {
        clamp_speed(self.number(SPEED_KEY).unwrap_or(DEFAULT_SPEED))
    }

    /// Stores the speed clamped into range and returns what was stored.
    pub fn set_speed(&mut self, speed: f64) -> Result<f64, StoreError> {
        let speed = if speed.is_finite() {
            clamp_speed(speed)
        } else {
            DEFAULT_SPEED
        };
        self.store.set(SPEED_KEY, speed.to_string())?;
        Ok(speed)
    }
}

pub fn clamp_speed(speed: f64) -> f64 {
    speed.clamp(MIN_SPEED, MAX_SPEED)
}

/// Free-spinning wheel driven by frame deltas. Slices are laid clockwise
/// from `angle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wheel {
    angle: f64,
    speed: f64,
    spinning: bool,
}

impl Wheel {
    pub fn new(speed: f64) -> Self {
        Self {
            angle: 0.0,
            speed: clamp_speed(speed),
            spinning: false,
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    pub fn toggle(&mut self) -> bool {
        self.spinning = !self.spinning;
        self.spinning
    }

    pub fn advance(&mut self, dt: Duration) {
        if self.spinning {
            self.angle = (self.angle + self.speed * dt.as_secs_f64()).rem_euclid(360.0);
        }
    }

    /// Index of the slice under the pointer, `None` for an empty wheel.
    pub fn landed_index(&self, slices: usize) -> Option<usize> {
        if slices == 0 {
            return None;
        }
        let width = 360.0 / slices as f64;
        let offset = (self.angle - POINTER_ANGLE).rem_euclid(360.0);
        Some(((offset / width) as usize).min(slices - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn settings_fall_back_and_clamp() {
        let mut store = MemoryStore::new();
        store.set(DURATION_KEY, "-2".into()).unwrap();
        store.set(SPEED_KEY, "5000".into()).unwrap();
        let roulette = Roulette::new(&mut store);
        assert_eq!(roulette.duration_secs(), DEFAULT_DURATION_SECS);
        assert_eq!(roulette.speed(), MAX_SPEED);
        assert_eq!(roulette.items(), default_items());
    }

    #[test]
    fn added_items_extend_the_defaults() {
        let mut store = MemoryStore::new();
        let mut roulette = Roulette::new(&mut store);
        let added = roulette.add_item("Picnic").unwrap();
        assert_eq!(roulette.items().len(), 5);
        assert!(roulette.remove_item(&added.id).unwrap());
        assert!(!roulette.remove_item(&added.id).unwrap());
        assert!(matches!(
            roulette.set_duration_secs(0.0),
            Err(ValidationError::NotPositive("duration"))
        ));
    }

    #[test]
    fn wheel_only_turns_while_spinning() {
        let mut wheel = Wheel::new(360.0);
        wheel.advance(Duration::from_millis(500));
        assert_eq!(wheel.angle(), 0.0);

        wheel.toggle();
        wheel.advance(Duration::from_millis(500));
        assert!((wheel.angle() - 180.0).abs() < 1e-9);
        wheel.advance(Duration::from_millis(750));
        assert!((wheel.angle() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn pointer_picks_slice() {
        let mut wheel = Wheel::new(360.0);
        // At 0 degrees slice 0 spans 0..-90, so twelve o'clock is in slice 3.
        assert_eq!(wheel.landed_index(4), Some(3));
        wheel.toggle();
        wheel.advance(Duration::from_millis(300));
        // 108 degrees: slice 0 now covers 108..18.
        assert_eq!(wheel.landed_index(4), Some(0));
        assert_eq!(wheel.landed_index(0), None);
    }
}
