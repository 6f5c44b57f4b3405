//! Core data models for the pairing engine.

mod color;
mod competitor;
mod ids;
mod pairing;
mod player_state;
mod standings;

pub use color::*;
pub use competitor::*;
pub use ids::*;
pub use pairing::*;
pub use player_state::*;
pub use standings::*;
