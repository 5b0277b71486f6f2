pub mod board;
pub mod play;
pub mod script;

pub use play::{PlayReport, play};
