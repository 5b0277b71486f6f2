pub mod catalog;
pub mod gomoku;
pub mod match3;
pub mod puzzle;
pub mod serde_duration;
pub mod snake;
pub mod tetris_core;
pub mod xiangqi;

pub use catalog::{GameId, GameInfo, CATALOG};
