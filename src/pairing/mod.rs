//! Pairing engine.
//!
//! Turns the competitors who are waiting for a game into new pairings:
//! builds the eligibility graph from the [`PairingPolicy`], runs the first
//! available [`Matcher`], then assigns colors and round numbers. Anyone left
//! over is reported, never silently dropped.

mod matcher;

pub use matcher::*;

use std::collections::BTreeSet;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::PairingConfig;
use crate::ledger::Ledger;
use crate::models::{CompetitorId, Pairing, PlayerState};
use crate::policy::{assign_colors, PairingPolicy};

/// Result of one pairing pass.
#[derive(Debug, Clone, Default)]
pub struct PairingOutcome {
    /// New pairings, boards not yet assigned
    pub pairings: Vec<Pairing>,

    /// Waiting competitors who did not get an opponent
    pub unpaired: Vec<CompetitorId>,

    /// Competitors that were waiting
    pub available: usize,

    /// Matcher that produced the pairs, if one ran
    pub strategy: Option<&'static str>,
}

impl PairingOutcome {
    /// Names of the unpaired competitors.
    pub fn unpaired_names(&self, ledger: &Ledger) -> Vec<String> {
        self.unpaired
            .iter()
            .map(|&id| {
                ledger
                    .name_of(id)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", id))
            })
            .collect()
    }
}

/// Swiss pairing engine.
pub struct PairingEngine {
    config: PairingConfig,
    matchers: Vec<Box<dyn Matcher>>,
}

impl PairingEngine {
    /// Engine with the exact matcher and the greedy fallback.
    pub fn new(config: PairingConfig) -> Self {
        let matchers: Vec<Box<dyn Matcher>> = vec![
            Box::new(ExactMatcher::new(config.exact_solver_limit)),
            Box::new(GreedyMatcher),
        ];
        Self::with_matchers(config, matchers)
    }

    /// Engine with custom strategies, tried in order.
    pub fn with_matchers(config: PairingConfig, matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { config, matchers }
    }

    /// Competitors waiting for a game, ascending by id.
    ///
    /// With a round window, competitors who are already `window` rounds
    /// ahead of the slowest competitor have to wait.
    pub fn available<'l>(
        &self,
        ledger: &'l Ledger,
        excluded: &BTreeSet<CompetitorId>,
    ) -> Vec<&'l PlayerState> {
        let ceiling = self
            .config
            .round_window
            .map(|window| ledger.min_games_played().unwrap_or(0).saturating_add(window));

        let mut waiting: Vec<&PlayerState> = ledger
            .players()
            .iter()
            .filter(|p| !excluded.contains(&p.id))
            .filter(|p| ceiling.map_or(true, |c| p.games_played < c))
            .collect();
        waiting.sort_by_key(|p| p.id);
        waiting
    }

    /// Eligibility graph over the waiting competitors.
    pub fn build_graph(&self, waiting: &[&PlayerState], policy: &PairingPolicy<'_>) -> PairingGraph {
        let mut graph = PairingGraph::new(waiting.iter().map(|p| p.id).collect());
        for (i, a) in waiting.iter().enumerate() {
            for (j, b) in waiting.iter().enumerate().skip(i + 1) {
                if let Some(weight) = policy.weight(a, b) {
                    graph.add_edge(i, j, weight);
                }
            }
        }
        graph
    }

    fn run_matchers(&self, graph: &PairingGraph) -> (Vec<(usize, usize)>, Option<&'static str>) {
        for matcher in self.matchers.iter().filter(|m| m.is_available(graph)) {
            match matcher.find_matching(graph) {
                Ok(matching) => {
                    debug!(
                        "Matcher '{}' chose {} pair(s), total weight {}",
                        matcher.name(),
                        matching.len(),
                        matching_weight(graph, &matching)
                    );
                    return (matching, Some(matcher.name()));
                }
                Err(e) => warn!("Matcher '{}' failed, trying next: {}", matcher.name(), e),
            }
        }
        warn!("No matcher could pair {} competitors", graph.vertex_count());
        (Vec::new(), None)
    }

    /// Pair everyone waiting who is not in `excluded`.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        ledger: &Ledger,
        excluded: &BTreeSet<CompetitorId>,
        rng: &mut R,
    ) -> PairingOutcome {
        let waiting = self.available(ledger, excluded);

        if waiting.len() < 2 {
            info!("Only {} competitor(s) ready for pairing", waiting.len());
            return PairingOutcome {
                unpaired: waiting.iter().map(|p| p.id).collect(),
                available: waiting.len(),
                ..Default::default()
            };
        }

        info!("Pairing {} waiting competitors", waiting.len());

        let policy = PairingPolicy::new(
            waiting.iter().copied(),
            self.config.color_rule,
            &self.config.weights,
        );
        let graph = self.build_graph(&waiting, &policy);
        debug!(
            "Eligibility graph: {} vertices, {} edges",
            graph.vertex_count(),
            graph.edges().len()
        );

        let (matching, strategy) = self.run_matchers(&graph);

        let mut paired = vec![false; waiting.len()];
        let mut pairings = Vec::with_capacity(matching.len());

        for (i, j) in matching {
            let (a, b) = (waiting[i], waiting[j]);
            let Some((white, black)) = assign_colors(a, b, &mut *rng) else {
                warn!(
                    "No legal color assignment for {} vs {}, leaving both unpaired",
                    a.name, b.name
                );
                continue;
            };

            let round = a.games_played.max(b.games_played) + 1;
            pairings.push(Pairing::new(round, white, black));
            paired[i] = true;
            paired[j] = true;
        }

        let unpaired: Vec<CompetitorId> = waiting
            .iter()
            .zip(&paired)
            .filter(|(_, &done)| !done)
            .map(|(p, _)| p.id)
            .collect();

        for id in &unpaired {
            if let Some(name) = ledger.name_of(*id) {
                warn!("{} could not be paired this pass", name);
            }
        }

        info!(
            "Generated {} pairing(s), {} competitor(s) unpaired",
            pairings.len(),
            unpaired.len()
        );

        PairingOutcome {
            pairings,
            unpaired,
            available: waiting.len(),
            strategy,
        }
    }
}
