//! Round planning.
//!
//! Runs one full pass over the stored data: ledger, pairing, board
//! allocation and standings. Nothing here touches the filesystem; the
//! caller decides what gets written.

use rand::Rng;
use tracing::info;

use crate::boards::assign_boards;
use crate::calculate::compute_standings;
use crate::config::AppConfig;
use crate::ledger::{Ledger, LedgerError, LedgerReport};
use crate::models::{Competitor, Pairing, StandingsRow, BYE};
use crate::pairing::PairingEngine;

/// Everything produced by one pairing pass.
#[derive(Debug, Clone)]
pub struct RoundPlan {
    /// New pairings with boards and names, ordered by round
    pub pairings: Vec<Pairing>,

    /// Waiting competitors left without an opponent
    pub unpaired_names: Vec<String>,

    /// Competitors that were waiting for a game
    pub available: usize,

    /// Matcher that produced the pairs
    pub strategy: Option<&'static str>,

    /// How the history rows were used
    pub ledger_report: LedgerReport,

    /// Standings from the history as supplied
    pub standings: Vec<StandingsRow>,
}

/// Pair everyone who is waiting and allocate boards.
pub fn plan_round<R: Rng + ?Sized>(
    config: &AppConfig,
    roster: &[Competitor],
    history: &[Pairing],
    rng: &mut R,
) -> Result<RoundPlan, LedgerError> {
    let ledger = Ledger::build(roster, history)?;
    let engine = PairingEngine::new(config.pairing.clone());

    let outcome = engine.generate(&ledger, &ledger.currently_playing(), rng);
    let unpaired_names = outcome.unpaired_names(&ledger);

    let named: Vec<Pairing> = outcome
        .pairings
        .into_iter()
        .map(|p| {
            let white = ledger.name_of(p.white_id).unwrap_or_default().to_string();
            let black = p
                .black_id
                .and_then(|id| ledger.name_of(id))
                .unwrap_or(BYE)
                .to_string();
            p.with_names(white, black)
        })
        .collect();
    let pairings = assign_boards(named, history, &config.boards);

    let standings = compute_standings(&ledger, config.standings.tiebreaks);

    info!(
        "Planned {} pairing(s) for {} waiting competitor(s)",
        pairings.len(),
        outcome.available
    );

    Ok(RoundPlan {
        pairings,
        unpaired_names,
        available: outcome.available,
        strategy: outcome.strategy,
        ledger_report: ledger.report().clone(),
        standings,
    })
}

/// Standings without generating pairings.
pub fn compute_standings_only(
    config: &AppConfig,
    roster: &[Competitor],
    history: &[Pairing],
) -> Result<(Vec<StandingsRow>, LedgerReport), LedgerError> {
    let ledger = Ledger::build(roster, history)?;
    let standings = compute_standings(&ledger, config.standings.tiebreaks);
    Ok((standings, ledger.report().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Board, CompetitorId};
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn id(n: u32) -> CompetitorId {
        CompetitorId::new(n)
    }

    fn roster() -> Vec<Competitor> {
        vec![
            Competitor::new(1, "Alice", "A"),
            Competitor::new(2, "Bob", "B"),
            Competitor::new(3, "Charlie", "C"),
            Competitor::new(4, "David", "D"),
        ]
    }

    #[test]
    fn test_first_round_for_four() {
        let config = AppConfig::default();
        let mut rng = StdRng::seed_from_u64(11);

        let plan = plan_round(&config, &roster(), &[], &mut rng).unwrap();

        assert_eq!(plan.pairings.len(), 2);
        assert!(plan.unpaired_names.is_empty());
        assert!(plan.pairings.iter().all(|p| p.round == 1));
        // Two games fit on board 1 with the default limit of 2.
        assert!(plan.pairings.iter().all(|p| p.board == Board::Assigned(1)));
        assert!(plan.pairings.iter().all(|p| p.white_name.is_some() && p.black_name.is_some()));
        assert_eq!(plan.standings.len(), 4);
    }

    #[test]
    fn test_pending_games_block_players_and_boards() {
        let mut config = AppConfig::default();
        config.boards.count = 2;
        config.boards.per_board_limit = 1;
        let roster: Vec<Competitor> = (1..=6)
            .map(|i| Competitor::new(i, &format!("P{}", i), ""))
            .collect();
        let history = vec![Pairing::new(1, id(1), id(2)).with_board(Board::Assigned(1))];
        let mut rng = StepRng::new(0, 0);

        let plan = plan_round(&config, &roster, &history, &mut rng).unwrap();

        assert_eq!(plan.available, 4);
        assert_eq!(plan.pairings.len(), 2);
        assert!(plan
            .pairings
            .iter()
            .all(|p| !p.involves(id(1)) && !p.involves(id(2))));
        let boards: Vec<Board> = plan.pairings.iter().map(|p| p.board).collect();
        assert_eq!(boards, vec![Board::Assigned(2), Board::Unassigned]);
        assert_eq!(plan.ledger_report.pending, 1);
    }

    #[test]
    fn test_new_pairings_do_not_change_standings() {
        let config = AppConfig::default();
        let history = vec![
            Pairing::new(1, id(1), id(2)).with_results(1.0, 0.0),
            Pairing::new(1, id(3), id(4)).with_results(0.5, 0.5),
        ];
        let mut rng = StepRng::new(0, 0);

        let plan = plan_round(&config, &roster(), &history, &mut rng).unwrap();
        let (standings, report) = compute_standings_only(&config, &roster(), &history).unwrap();

        assert_eq!(plan.standings, standings);
        assert_eq!(report.finished, 2);
        assert_eq!(standings[0].id, id(1));
    }

    #[test]
    fn test_bye_holder_is_paired_next_round() {
        let config = AppConfig::default();
        let roster: Vec<Competitor> = (1..=5)
            .map(|i| Competitor::new(i, &format!("P{}", i), ""))
            .collect();
        let history = vec![
            Pairing::new(1, id(1), id(2)).with_results(1.0, 0.0),
            Pairing::new(1, id(3), id(4)).with_results(1.0, 0.0),
            Pairing::bye(1, id(5)),
        ];
        let mut rng = StepRng::new(0, 0);

        let plan = plan_round(&config, &roster, &history, &mut rng).unwrap();

        assert_eq!(plan.ledger_report.byes, 1);
        assert_eq!(plan.available, 5);
        assert!(plan.pairings.iter().all(|p| p.round == 2));
        // 5 has played no color yet, so is the only partner for 1 or 3.
        assert_eq!(plan.pairings.len(), 1);
        assert!(plan.pairings[0].involves(id(5)));
        let five = plan.standings.iter().find(|r| r.id == id(5)).unwrap();
        assert_eq!(five.points, 1.0);
        assert_eq!(five.buchholz_total, 0.0);
    }

    #[test]
    fn test_duplicate_roster_is_fatal() {
        let config = AppConfig::default();
        let roster = vec![Competitor::new(1, "A", "A"), Competitor::new(1, "B", "B")];
        let mut rng = StepRng::new(0, 0);

        assert!(matches!(
            plan_round(&config, &roster, &[], &mut rng),
            Err(LedgerError::DuplicateCompetitor(_))
        ));
        assert!(compute_standings_only(&config, &roster, &[]).is_err());
    }
}
