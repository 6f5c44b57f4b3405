//! Per-competitor state derived from the match history.

use std::collections::BTreeSet;

use super::{Color, CompetitorId};

/// Score obtained in one finished game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameScore {
    pub opponent: CompetitorId,
    pub score: f64,
}

/// Everything the pairing engine and the standings need to know about one
/// competitor. Rebuilt from scratch by the ledger on every run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    /// Roster id
    pub id: CompetitorId,

    /// Display name
    pub name: String,

    /// Cumulative score of finished games
    pub points: f64,

    /// Finished games only, byes included
    pub games_played: u32,

    /// Byes received; they score but have no opponent or color
    pub byes: u32,

    /// Color of the most recent finished game
    pub last_color: Option<Color>,

    /// One entry per finished game against an opponent, oldest first
    pub color_history: Vec<Color>,

    /// Everyone ever paired with, finished or pending
    pub opponents: BTreeSet<CompetitorId>,

    /// Current points of each finished-game opponent, byes excluded
    pub opponent_scores: Vec<f64>,

    /// Per finished game against an opponent: who and score obtained
    pub results: Vec<GameScore>,

    /// Has an unfinished game right now
    pub currently_playing: bool,
}

impl PlayerState {
    /// Fresh state for a competitor with no games.
    pub fn new(id: CompetitorId, name: String) -> Self {
        Self {
            id,
            name,
            points: 0.0,
            games_played: 0,
            byes: 0,
            last_color: None,
            color_history: Vec::new(),
            opponents: BTreeSet::new(),
            opponent_scores: Vec::new(),
            results: Vec::new(),
            currently_playing: false,
        }
    }

    /// No color played yet.
    pub fn is_new(&self) -> bool {
        self.last_color.is_none()
    }

    /// Already paired with `other` at some point.
    pub fn has_met(&self, other: CompetitorId) -> bool {
        self.opponents.contains(&other)
    }

    /// Trailing run of identical colors, e.g. `(White, 2)` after W-B-W-W.
    pub fn color_streak(&self) -> Option<(Color, usize)> {
        let last = *self.color_history.last()?;
        let run = self
            .color_history
            .iter()
            .rev()
            .take_while(|&&c| c == last)
            .count();
        Some((last, run))
    }

    /// Playing `next` would make three identical colors in a row.
    pub fn would_repeat_thrice(&self, next: Color) -> bool {
        matches!(self.color_streak(), Some((color, run)) if color == next && run >= 2)
    }
}
