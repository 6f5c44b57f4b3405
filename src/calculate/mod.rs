//! Standings calculation engine.
//!
//! Computes, per competitor:
//! - Buchholz Total: sum of every opponent's current points
//! - Buchholz Cut-1: the same without the weakest opponent
//! - Direct Encounter: score against opponents currently tied on points
//! - Sonneborn-Berger: result times opponent's current points (reported only)
//!
//! and ranks by points, then the tie-breaks of the configured [`Tiebreaks`].

use std::cmp::Ordering;

use crate::ledger::Ledger;
use crate::models::{PlayerState, StandingsRow, Tiebreaks};

/// Points closer than this are treated as equal.
const POINTS_EPSILON: f64 = 1e-9;

/// Sum of opponents' current points.
pub fn buchholz_total(player: &PlayerState) -> f64 {
    player.opponent_scores.iter().sum()
}

/// Buchholz total without the lowest opponent score; 0 without opponents.
pub fn buchholz_cut1(player: &PlayerState) -> f64 {
    let lowest = player
        .opponent_scores
        .iter()
        .copied()
        .min_by(f64::total_cmp);

    match lowest {
        Some(lowest) => buchholz_total(player) - lowest,
        None => 0.0,
    }
}

/// Score obtained against opponents who now have the same points.
pub fn direct_encounter(player: &PlayerState, ledger: &Ledger) -> f64 {
    player
        .results
        .iter()
        .filter(|game| {
            ledger
                .get(game.opponent)
                .is_some_and(|opp| (opp.points - player.points).abs() < POINTS_EPSILON)
        })
        .map(|game| game.score)
        .sum()
}

/// Sum of each game's result times the opponent's current points.
pub fn sonneborn_berger(player: &PlayerState) -> f64 {
    player
        .results
        .iter()
        .zip(&player.opponent_scores)
        .map(|(game, opp_points)| game.score * opp_points)
        .sum()
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

fn compare(a: &StandingsRow, b: &StandingsRow, tiebreaks: Tiebreaks) -> Ordering {
    let points = descending(a.points, b.points);
    match tiebreaks {
        Tiebreaks::Full => points
            .then_with(|| {
                descending(
                    a.direct_encounter.unwrap_or(0.0),
                    b.direct_encounter.unwrap_or(0.0),
                )
            })
            .then_with(|| {
                descending(
                    a.buchholz_cut1.unwrap_or(0.0),
                    b.buchholz_cut1.unwrap_or(0.0),
                )
            })
            .then_with(|| descending(a.buchholz_total, b.buchholz_total)),
        Tiebreaks::Buchholz => points.then_with(|| descending(a.buchholz_total, b.buchholz_total)),
    }
}

/// Ranked standings table.
///
/// Competitors tied on every criterion keep their roster order.
pub fn compute_standings(ledger: &Ledger, tiebreaks: Tiebreaks) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = ledger
        .players()
        .iter()
        .map(|player| {
            let full = tiebreaks == Tiebreaks::Full;
            StandingsRow {
                rank: 0,
                id: player.id,
                name: player.name.clone(),
                points: player.points,
                buchholz_total: buchholz_total(player),
                buchholz_cut1: full.then(|| buchholz_cut1(player)),
                direct_encounter: full.then(|| direct_encounter(player, ledger)),
                sonneborn_berger: Some(sonneborn_berger(player)),
            }
        })
        .collect();

    // `sort_by` is stable.
    rows.sort_by(|a, b| compare(a, b, tiebreaks));

    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i as u32 + 1;
    }

    rows
}
