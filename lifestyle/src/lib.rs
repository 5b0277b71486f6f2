//! Record books for the companion's everyday features. Each book borrows a
//! [`KeyValueStore`] and keeps its records under its own keys.

pub mod anniversary;
pub mod diary;
pub mod elf;
pub mod events;
pub mod friend;
pub mod ledger;
pub mod moments;
pub mod movies;
pub mod profile;
pub mod roulette;
pub mod schedule;
pub mod settings;
pub mod store;
pub mod timestamp;
pub mod validation;
pub mod weather;

pub use events::{AppEvent, EventBus};
pub use settings::{CompanionSettings, SettingsStore};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use validation::ValidationError;
