//! # Swiss Pairing
//!
//! Swiss-system pairing engine with board allocation and tie-break standings.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (competitors, pairings, player states, standings)
//! - **ledger**: Per-competitor state derived from roster and history
//! - **policy**: Eligibility, score groups, edge weights and colors
//! - **pairing**: Matching strategies and the pairing engine
//! - **boards**: Physical board allocation
//! - **calculate**: Buchholz, Direct Encounter and standings
//! - **round**: One full pairing pass over stored data
//! - **storage**: JSONL data directory operations
//! - **config**: Configuration loading and validation

pub mod boards;
pub mod calculate;
pub mod config;
pub mod ledger;
pub mod models;
pub mod pairing;
pub mod policy;
pub mod round;
pub mod storage;

pub use models::*;
