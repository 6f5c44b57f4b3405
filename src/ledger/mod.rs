//! Player ledger.
//!
//! Derives one [`PlayerState`] per competitor from the roster and the full
//! pairing history. The ledger is rebuilt from scratch on every run and is
//! the single read model shared by the pairing engine and the standings.
//!
//! Buchholz inputs need every competitor's final total, so opponent scores
//! are resolved in a second pass once all points are known.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Color, Competitor, CompetitorId, GameScore, Pairing, PlayerState};

/// Errors that abort a ledger build.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Duplicate competitor id in roster: {0}")]
    DuplicateCompetitor(CompetitorId),
}

/// What happened to the history rows during a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerReport {
    /// Games with both results recorded
    pub finished: usize,

    /// Games still running
    pub pending: usize,

    /// Rows naming an id that is not on the roster
    pub unknown_competitor: usize,

    /// Rows pairing a competitor with themselves
    pub self_pairing: usize,

    /// Bye rows credited
    pub byes: usize,
}

impl LedgerReport {
    /// Rows that were ignored.
    pub fn skipped(&self) -> usize {
        self.unknown_competitor + self.self_pairing
    }
}

/// Player states in roster order, indexed by id.
#[derive(Debug, Clone)]
pub struct Ledger {
    players: Vec<PlayerState>,
    index: HashMap<CompetitorId, usize>,
    report: LedgerReport,
}

impl Ledger {
    /// Build the ledger from a roster and the full pairing history.
    pub fn build(roster: &[Competitor], history: &[Pairing]) -> Result<Self, LedgerError> {
        let mut players = Vec::with_capacity(roster.len());
        let mut index = HashMap::with_capacity(roster.len());

        for competitor in roster {
            if index.insert(competitor.id, players.len()).is_some() {
                return Err(LedgerError::DuplicateCompetitor(competitor.id));
            }
            players.push(PlayerState::new(competitor.id, competitor.display_name()));
        }

        let mut report = LedgerReport::default();

        for (row, pairing) in history.iter().enumerate() {
            let Some(&white) = index.get(&pairing.white_id) else {
                warn!(
                    "Skipping history row {}: {} is not on the roster",
                    row + 1,
                    pairing.white_id
                );
                report.unknown_competitor += 1;
                continue;
            };

            let Some(black_id) = pairing.black_id else {
                record_bye(&mut players[white], pairing.bye_points());
                report.byes += 1;
                continue;
            };

            let Some(&black) = index.get(&black_id) else {
                warn!(
                    "Skipping history row {}: {} vs {} references an unknown competitor",
                    row + 1,
                    pairing.white_id,
                    black_id
                );
                report.unknown_competitor += 1;
                continue;
            };

            if white == black {
                warn!(
                    "Skipping history row {}: competitor {} paired with themselves",
                    row + 1,
                    pairing.white_id
                );
                report.self_pairing += 1;
                continue;
            }

            players[white].opponents.insert(black_id);
            players[black].opponents.insert(pairing.white_id);

            match (pairing.result_white, pairing.result_black) {
                (Some(result_white), Some(result_black)) => {
                    record_game(&mut players[white], Color::White, black_id, result_white);
                    record_game(&mut players[black], Color::Black, pairing.white_id, result_black);
                    report.finished += 1;
                }
                _ => {
                    players[white].currently_playing = true;
                    players[black].currently_playing = true;
                    report.pending += 1;
                }
            }
        }

        // Second pass: every total is final now.
        let totals: Vec<f64> = players.iter().map(|p| p.points).collect();
        for player in &mut players {
            player.opponent_scores = player
                .results
                .iter()
                .map(|game| index.get(&game.opponent).map_or(0.0, |&i| totals[i]))
                .collect();
        }

        debug!(
            "Ledger built: {} competitors, {} finished, {} byes, {} pending, {} skipped",
            players.len(),
            report.finished,
            report.byes,
            report.pending,
            report.skipped()
        );

        Ok(Self {
            players,
            index,
            report,
        })
    }

    /// State of one competitor.
    pub fn get(&self, id: CompetitorId) -> Option<&PlayerState> {
        self.index.get(&id).map(|&i| &self.players[i])
    }

    /// All states in roster order.
    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Row accounting from the build.
    pub fn report(&self) -> &LedgerReport {
        &self.report
    }

    /// Display name of a competitor.
    pub fn name_of(&self, id: CompetitorId) -> Option<&str> {
        self.get(id).map(|p| p.name.as_str())
    }

    /// Competitors with an unfinished game.
    pub fn currently_playing(&self) -> BTreeSet<CompetitorId> {
        self.players
            .iter()
            .filter(|p| p.currently_playing)
            .map(|p| p.id)
            .collect()
    }

    /// Fewest finished games of any competitor.
    pub fn min_games_played(&self) -> Option<u32> {
        self.players.iter().map(|p| p.games_played).min()
    }

    /// Sum of everyone's points.
    pub fn total_points(&self) -> f64 {
        self.players.iter().map(|p| p.points).sum()
    }
}

fn record_game(player: &mut PlayerState, color: Color, opponent: CompetitorId, score: f64) {
    player.points += score;
    player.games_played += 1;
    player.last_color = Some(color);
    player.color_history.push(color);
    player.results.push(GameScore { opponent, score });
}

fn record_bye(player: &mut PlayerState, points: f64) {
    player.points += points;
    player.games_played += 1;
    player.byes += 1;
}

/// Build the ledger; see [`Ledger::build`].
pub fn build_state(roster: &[Competitor], history: &[Pairing]) -> Result<Ledger, LedgerError> {
    Ledger::build(roster, history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(n: u32) -> CompetitorId {
        CompetitorId::new(n)
    }

    fn roster() -> Vec<Competitor> {
        vec![
            Competitor::new(1, "Alice", "Smith"),
            Competitor::new(2, "Bob", "Jones"),
            Competitor::new(3, "Charlie", "Brown"),
            Competitor::new(4, "David", "Wilson"),
        ]
    }

    fn game(round: u32, white: u32, black: u32, rw: f64, rb: f64) -> Pairing {
        Pairing::new(round, id(white), id(black)).with_results(rw, rb)
    }

    fn pending(round: u32, white: u32, black: u32) -> Pairing {
        Pairing::new(round, id(white), id(black))
    }

    fn assert_invariants(ledger: &Ledger) {
        for p in ledger.players() {
            let games = (p.games_played - p.byes) as usize;
            assert_eq!(games, p.color_history.len());
            assert_eq!(games, p.opponent_scores.len());
            assert_eq!(games, p.results.len());
            let recorded: f64 = p.results.iter().map(|g| g.score).sum();
            assert!(p.points + 1e-9 >= recorded);
            if p.byes == 0 {
                assert!((p.points - recorded).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_empty_history() {
        let ledger = build_state(&roster(), &[]).unwrap();

        assert_eq!(ledger.len(), 4);
        let alice = ledger.get(id(1)).unwrap();
        assert_eq!(alice.name, "Alice Smith");
        assert_eq!(alice.points, 0.0);
        assert_eq!(alice.games_played, 0);
        assert!(!alice.currently_playing);
        assert!(alice.last_color.is_none());
        assert_invariants(&ledger);
    }

    #[test]
    fn test_single_finished_game() {
        let ledger = build_state(&roster(), &[game(1, 1, 2, 1.0, 0.0)]).unwrap();

        let alice = ledger.get(id(1)).unwrap();
        assert_eq!(alice.points, 1.0);
        assert_eq!(alice.games_played, 1);
        assert_eq!(alice.last_color, Some(Color::White));
        assert!(alice.has_met(id(2)));

        let bob = ledger.get(id(2)).unwrap();
        assert_eq!(bob.points, 0.0);
        assert_eq!(bob.last_color, Some(Color::Black));
        assert!(bob.has_met(id(1)));
        assert_invariants(&ledger);
    }

    #[test]
    fn test_ongoing_game() {
        let ledger = build_state(&roster(), &[pending(1, 1, 2)]).unwrap();

        let alice = ledger.get(id(1)).unwrap();
        assert!(alice.currently_playing);
        assert_eq!(alice.games_played, 0);
        assert_eq!(alice.points, 0.0);
        // Pending games still count for the no-rematch rule.
        assert!(alice.has_met(id(2)));
        assert!(ledger.get(id(2)).unwrap().currently_playing);
        assert_eq!(ledger.report().pending, 1);
        assert_invariants(&ledger);
    }

    #[test]
    fn test_mixed_finished_and_ongoing() {
        let history = vec![
            game(1, 1, 2, 1.0, 0.0),
            game(1, 3, 4, 0.5, 0.5),
            pending(2, 1, 3),
        ];
        let ledger = build_state(&roster(), &history).unwrap();

        assert_eq!(ledger.get(id(1)).unwrap().points, 1.0);
        assert!(ledger.get(id(1)).unwrap().currently_playing);
        assert!(!ledger.get(id(2)).unwrap().currently_playing);
        assert_eq!(ledger.get(id(3)).unwrap().points, 0.5);
        assert!(ledger.get(id(3)).unwrap().currently_playing);
        assert_eq!(ledger.currently_playing(), [id(1), id(3)].into_iter().collect::<BTreeSet<_>>());
        assert_invariants(&ledger);
    }

    #[test]
    fn test_opponent_scores_use_final_totals() {
        // Bob loses to Alice in round 1, then Alice keeps winning. Bob's
        // opponent score must reflect Alice's total now, not back then.
        let history = vec![
            game(1, 1, 2, 1.0, 0.0),
            game(1, 3, 4, 0.5, 0.5),
            game(2, 3, 1, 0.0, 1.0),
        ];
        let ledger = build_state(&roster(), &history).unwrap();

        assert_eq!(ledger.get(id(2)).unwrap().opponent_scores, vec![2.0]);
        assert_eq!(ledger.get(id(1)).unwrap().opponent_scores, vec![0.0, 0.5]);
        assert_eq!(ledger.get(id(4)).unwrap().opponent_scores, vec![0.5]);
        assert_invariants(&ledger);
    }

    #[test]
    fn test_unknown_ids_are_skipped() {
        let history = vec![game(1, 1, 999, 1.0, 0.0), game(1, 2, 3, 0.0, 1.0)];
        let ledger = build_state(&roster(), &history).unwrap();

        assert_eq!(ledger.report().unknown_competitor, 1);
        assert_eq!(ledger.report().finished, 1);
        assert_eq!(ledger.get(id(1)).unwrap().points, 0.0);
        assert_eq!(ledger.get(id(3)).unwrap().points, 1.0);
        assert_invariants(&ledger);
    }

    #[test]
    fn test_self_pairing_is_skipped() {
        let ledger = build_state(&roster(), &[game(1, 2, 2, 1.0, 0.0)]).unwrap();
        assert_eq!(ledger.report().self_pairing, 1);
        assert_eq!(ledger.report().skipped(), 1);
        assert!(ledger.get(id(2)).unwrap().opponents.is_empty());
    }

    #[test]
    fn test_duplicate_roster_id_is_fatal() {
        let mut roster = roster();
        roster.push(Competitor::new(2, "Bobby", "Twice"));

        let err = build_state(&roster, &[]).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateCompetitor(dup) if dup == id(2)));
    }

    #[test]
    fn test_total_points_match_awarded_points() {
        let history = vec![
            game(1, 1, 2, 1.0, 0.0),
            game(1, 3, 4, 0.5, 0.5),
            game(2, 4, 1, 0.0, 1.0),
            game(2, 2, 3, 1.0, 0.0),
            pending(3, 1, 3),
        ];
        let ledger = build_state(&roster(), &history).unwrap();

        let awarded: f64 = history
            .iter()
            .filter(|p| p.is_finished())
            .map(|p| p.result_white.unwrap_or(0.0) + p.result_black.unwrap_or(0.0))
            .sum();
        assert!((ledger.total_points() - awarded).abs() < 1e-9);
        assert_eq!(ledger.min_games_played(), Some(2));
        assert_invariants(&ledger);
    }

    #[test]
    fn test_bye_scores_without_opponent() {
        let history = vec![
            game(1, 1, 2, 1.0, 0.0),
            Pairing::bye(1, id(3)),
            game(2, 3, 1, 0.0, 1.0),
        ];
        let ledger = build_state(&roster(), &history).unwrap();

        let charlie = ledger.get(id(3)).unwrap();
        assert_eq!(charlie.points, 1.0);
        assert_eq!(charlie.games_played, 2);
        assert_eq!(charlie.byes, 1);
        assert_eq!(charlie.color_history, vec![Color::White]);
        assert_eq!(charlie.opponents, [id(1)].into_iter().collect::<BTreeSet<_>>());
        assert_eq!(charlie.opponent_scores, vec![2.0]);
        assert!(!charlie.currently_playing);

        assert_eq!(ledger.report().byes, 1);
        assert_eq!(ledger.report().finished, 2);
        assert_eq!(ledger.report().skipped(), 0);
        assert_invariants(&ledger);
    }

    #[test]
    fn test_bye_row_from_history_file() {
        let row = r#"{"round": 1, "board": "?", "white_id": 3, "black_id": "bye", "result_white": "1"}"#;
        let bye: Pairing = serde_json::from_str(row).unwrap();
        let ledger = build_state(&roster(), &[bye]).unwrap();

        assert_eq!(ledger.get(id(3)).unwrap().points, 1.0);
        assert_eq!(ledger.min_games_played(), Some(0));
        assert!(ledger.currently_playing().is_empty());
    }

    #[test]
    fn test_bye_for_unknown_competitor_is_skipped() {
        let ledger = build_state(&roster(), &[Pairing::bye(1, id(42))]).unwrap();
        assert_eq!(ledger.report().unknown_competitor, 1);
        assert_eq!(ledger.report().byes, 0);
        assert_eq!(ledger.total_points(), 0.0);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let history = vec![game(1, 1, 2, 1.0, 0.0), game(1, 3, 4, 0.5, 0.5)];
        let first = build_state(&roster(), &history).unwrap();
        let second = build_state(&roster(), &history).unwrap();
        assert_eq!(first.players(), second.players());
    }
}
