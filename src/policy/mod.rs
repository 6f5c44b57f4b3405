//! Eligibility and weight policy.
//!
//! Decides whether two waiting competitors may meet and how much the
//! matcher should want them to. Competitors are bucketed by
//! `(games played, points)`; pairings inside a bucket share one high weight,
//! and pairings across buckets are only allowed to rescue a competitor who
//! is alone in their bucket.

mod colors;

pub use colors::*;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::PairingWeights;
use crate::models::PlayerState;

/// How strictly colors must alternate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorRule {
    /// Two experienced competitors may only meet if their last colors differ.
    #[default]
    Strict,
    /// Last colors may coincide as long as nobody gets the same color three
    /// times in a row.
    Soft,
}

impl std::fmt::Display for ColorRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorRule::Strict => write!(f, "strict"),
            ColorRule::Soft => write!(f, "soft"),
        }
    }
}

/// Score group key. Points are keyed by bit pattern so equal totals share a
/// bucket exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub games_played: u32,
    points_bits: u64,
}

impl BucketKey {
    pub fn of(player: &PlayerState) -> Self {
        Self {
            games_played: player.games_played,
            points_bits: player.points.to_bits(),
        }
    }
}

/// Pairing policy over one set of waiting competitors.
#[derive(Debug, Clone)]
pub struct PairingPolicy<'a> {
    rule: ColorRule,
    weights: &'a PairingWeights,
    bucket_sizes: HashMap<BucketKey, usize>,
}

impl<'a> PairingPolicy<'a> {
    /// Build the policy for the competitors waiting to be paired.
    pub fn new<'p>(
        waiting: impl IntoIterator<Item = &'p PlayerState>,
        rule: ColorRule,
        weights: &'a PairingWeights,
    ) -> Self {
        let mut bucket_sizes = HashMap::new();
        for player in waiting {
            *bucket_sizes.entry(BucketKey::of(player)).or_insert(0) += 1;
        }

        Self {
            rule,
            weights,
            bucket_sizes,
        }
    }

    /// Number of waiting competitors in the player's score group.
    pub fn bucket_size(&self, player: &PlayerState) -> usize {
        self.bucket_sizes
            .get(&BucketKey::of(player))
            .copied()
            .unwrap_or(0)
    }

    /// Whether the two competitors share a score group.
    pub fn same_bucket(a: &PlayerState, b: &PlayerState) -> bool {
        BucketKey::of(a) == BucketKey::of(b)
    }

    /// Colors can be legally assigned under the configured rule.
    pub fn colors_compatible(&self, a: &PlayerState, b: &PlayerState) -> bool {
        match self.rule {
            ColorRule::Strict => {
                a.is_new() || b.is_new() || a.last_color != b.last_color
            }
            ColorRule::Soft => plan_colors(a, b).is_possible(),
        }
    }

    /// Whether `a` and `b` may be paired at all.
    pub fn eligible(&self, a: &PlayerState, b: &PlayerState) -> bool {
        if a.id == b.id || a.has_met(b.id) || b.has_met(a.id) {
            return false;
        }

        if !Self::same_bucket(a, b) && self.bucket_size(a) != 1 && self.bucket_size(b) != 1 {
            return false;
        }

        self.colors_compatible(a, b)
    }

    /// Desirability of pairing `a` with `b`; `None` if they may not meet.
    ///
    /// A cross-bucket weight is always below the same-bucket weight and falls
    /// with the score and game-count distance.
    pub fn weight(&self, a: &PlayerState, b: &PlayerState) -> Option<f64> {
        if !self.eligible(a, b) {
            return None;
        }

        if Self::same_bucket(a, b) {
            return Some(self.weights.same_bucket);
        }

        let points_gap = (a.points - b.points).abs();
        let games_gap = a.games_played.abs_diff(b.games_played) as f64;
        Some(
            self.weights.cross_bucket
                - self.weights.points_penalty * points_gap
                - self.weights.games_penalty * games_gap,
        )
    }
}
