//! Roster model.

use serde::{Deserialize, Serialize};

use super::CompetitorId;

/// A registered competitor, one row of the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    /// Unique roster id
    pub id: CompetitorId,

    /// First name
    #[serde(alias = "firstName")]
    pub first_name: String,

    /// Last name
    #[serde(alias = "lastName")]
    pub last_name: String,
}

impl Competitor {
    /// Create a new roster entry.
    pub fn new(id: impl Into<CompetitorId>, first_name: &str, last_name: &str) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }

    /// Name shown in pairings and standings.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}
