//! Board allocation.
//!
//! First-fit over a pool of identical boards. Boards still hosting an
//! unfinished game count against their per-board limit; earlier rounds get
//! the scarce boards first. When the pool is full the pairing is still
//! issued, with the unassigned sentinel instead of a board number.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::BoardConfig;
use crate::models::{Board, Pairing};

/// Games currently running on each board.
pub fn board_usage(existing: &[Pairing]) -> HashMap<u32, u32> {
    let mut usage = HashMap::new();
    for pairing in existing.iter().filter(|p| p.is_pending()) {
        if let Some(board) = pairing.board.number() {
            *usage.entry(board).or_insert(0) += 1;
        }
    }
    usage
}

/// Give each new pairing the lowest-numbered board with spare capacity.
///
/// Returns the pairings ordered by round, ascending.
pub fn assign_boards(
    mut new_pairings: Vec<Pairing>,
    existing: &[Pairing],
    config: &BoardConfig,
) -> Vec<Pairing> {
    if new_pairings.is_empty() {
        return new_pairings;
    }

    let mut usage = board_usage(existing);
    debug!("{} board(s) busy before allocation", usage.len());

    new_pairings.sort_by_key(|p| p.round);

    let mut unassigned = 0;
    for pairing in &mut new_pairings {
        let free = (1..=config.count)
            .find(|board| usage.get(board).copied().unwrap_or(0) < config.per_board_limit);

        pairing.board = match free {
            Some(board) => {
                *usage.entry(board).or_insert(0) += 1;
                Board::Assigned(board)
            }
            None => {
                unassigned += 1;
                Board::Unassigned
            }
        };
    }

    if unassigned > 0 {
        warn!(
            "No free board for {} pairing(s) ({} games fit at once); marked as unassigned",
            unassigned,
            config.capacity()
        );
    }

    new_pairings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompetitorId;
    use pretty_assertions::assert_eq;

    fn pairing(round: u32, white: u32, black: u32) -> Pairing {
        Pairing::new(round, CompetitorId::new(white), CompetitorId::new(black))
    }

    fn boards(pairings: &[Pairing]) -> Vec<Board> {
        pairings.iter().map(|p| p.board).collect()
    }

    #[test]
    fn test_single_board_capacity_two() {
        let config = BoardConfig {
            count: 1,
            per_board_limit: 2,
        };
        let new = vec![pairing(1, 1, 2), pairing(1, 3, 4), pairing(1, 5, 6)];

        let assigned = assign_boards(new, &[], &config);

        assert_eq!(
            boards(&assigned),
            vec![Board::Assigned(1), Board::Assigned(1), Board::Unassigned]
        );
    }

    #[test]
    fn test_busy_boards_are_skipped() {
        let config = BoardConfig {
            count: 3,
            per_board_limit: 1,
        };
        let existing = vec![
            pairing(1, 1, 2).with_board(Board::Assigned(1)),
            pairing(1, 3, 4)
                .with_board(Board::Assigned(2))
                .with_results(1.0, 0.0),
        ];
        let new = vec![pairing(2, 3, 5), pairing(1, 6, 7)];

        let assigned = assign_boards(new, &existing, &config);

        // Board 1 is still playing; board 2 is free again once its game ended.
        assert_eq!(assigned[0].round, 1);
        assert_eq!(
            boards(&assigned),
            vec![Board::Assigned(2), Board::Assigned(3)]
        );
    }

    #[test]
    fn test_earlier_rounds_first() {
        let config = BoardConfig {
            count: 1,
            per_board_limit: 1,
        };
        let new = vec![pairing(3, 1, 2), pairing(2, 3, 4)];

        let assigned = assign_boards(new, &[], &config);

        assert_eq!(assigned[0].round, 2);
        assert_eq!(assigned[0].board, Board::Assigned(1));
        assert_eq!(assigned[1].board, Board::Unassigned);
    }

    #[test]
    fn test_board_usage_ignores_unassigned_and_finished() {
        let existing = vec![
            pairing(1, 1, 2),
            pairing(1, 3, 4).with_board(Board::Assigned(4)),
            pairing(1, 5, 6).with_board(Board::Assigned(4)),
            pairing(1, 7, 8)
                .with_board(Board::Assigned(5))
                .with_results(0.5, 0.5),
        ];

        let usage = board_usage(&existing);
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[&4], 2);
    }

    #[test]
    fn test_empty_batch() {
        let assigned = assign_boards(Vec::new(), &[], &BoardConfig::default());
        assert!(assigned.is_empty());
    }
}
