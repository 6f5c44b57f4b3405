//! Color assignment.
//!
//! Alternation is the default. When both competitors arrive with the same
//! last color one of them has to repeat it, which is only allowed if it does
//! not give them three identical colors in a row.

use rand::Rng;

use crate::models::{Color, CompetitorId, PlayerState};

/// How a pair's colors are decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorPlan {
    /// Both competitors are new: toss a coin.
    CoinFlip,
    /// Colors follow from history.
    Fixed {
        white: CompetitorId,
        black: CompetitorId,
    },
    /// Every orientation breaks the three-in-a-row rule.
    Impossible,
}

impl ColorPlan {
    pub fn is_possible(&self) -> bool {
        !matches!(self, ColorPlan::Impossible)
    }
}

fn orient(a: &PlayerState, b: &PlayerState, a_color: Color) -> ColorPlan {
    match a_color {
        Color::White => ColorPlan::Fixed {
            white: a.id,
            black: b.id,
        },
        Color::Black => ColorPlan::Fixed {
            white: b.id,
            black: a.id,
        },
    }
}

/// Decide colors for `a` vs `b` without tossing any coin.
pub fn plan_colors(a: &PlayerState, b: &PlayerState) -> ColorPlan {
    match (a.last_color, b.last_color) {
        (None, None) => ColorPlan::CoinFlip,
        (None, Some(b_last)) => orient(a, b, b_last),
        (Some(a_last), None) => orient(a, b, a_last.opposite()),
        (Some(a_last), Some(b_last)) if a_last != b_last => orient(a, b, a_last.opposite()),
        (Some(shared), Some(_)) => {
            let streak = |p: &PlayerState| p.color_streak().map_or(0, |(_, run)| run);

            // Flipping `a` means `b` repeats the shared color, and vice versa.
            let flip_a = (!b.would_repeat_thrice(shared)).then(|| orient(a, b, shared.opposite()));
            let flip_b = (!a.would_repeat_thrice(shared)).then(|| orient(a, b, shared));

            let preferred = if streak(b) > streak(a) {
                flip_b.or(flip_a)
            } else {
                flip_a.or(flip_b)
            };
            preferred.unwrap_or(ColorPlan::Impossible)
        }
    }
}

/// Assign `(white, black)` for a pair, or `None` when no orientation is legal.
pub fn assign_colors<R: Rng + ?Sized>(
    a: &PlayerState,
    b: &PlayerState,
    rng: &mut R,
) -> Option<(CompetitorId, CompetitorId)> {
    match plan_colors(a, b) {
        ColorPlan::CoinFlip => {
            if rng.gen::<bool>() {
                Some((a.id, b.id))
            } else {
                Some((b.id, a.id))
            }
        }
        ColorPlan::Fixed { white, black } => Some((white, black)),
        ColorPlan::Impossible => None,
    }
}
