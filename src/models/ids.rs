//! Competitor identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Roster identifier of a competitor.
///
/// Ids come from the registration sheet and are unique within a roster.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetitorId(u32);

impl CompetitorId {
    /// Wrap a raw roster id.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw roster id.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CompetitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for CompetitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompetitorId({})", self.0)
    }
}

impl From<u32> for CompetitorId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}
