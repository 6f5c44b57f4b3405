//! Standings models.

use serde::{Deserialize, Serialize};

use super::CompetitorId;

/// Which tie-break criteria order the standings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tiebreaks {
    /// Points, Direct Encounter, Buchholz Cut-1, Buchholz Total
    #[default]
    Full,
    /// Points, Buchholz Total
    Buchholz,
}

impl std::fmt::Display for Tiebreaks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tiebreaks::Full => write!(f, "full"),
            Tiebreaks::Buchholz => write!(f, "buchholz"),
        }
    }
}

/// One line of the standings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    /// 1-based position
    pub rank: u32,

    /// Roster id
    pub id: CompetitorId,

    /// Display name
    pub name: String,

    /// Primary score
    pub points: f64,

    /// Sum of all opponents' current points
    pub buchholz_total: f64,

    /// Buchholz total minus the weakest opponent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buchholz_cut1: Option<f64>,

    /// Score against opponents currently tied on points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_encounter: Option<f64>,

    /// Sum of result times opponent's current points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sonneborn_berger: Option<f64>,
}
