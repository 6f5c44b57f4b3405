//! Matching strategies.
//!
//! The engine asks each [`Matcher`] in turn whether it can handle the graph
//! and uses the first that can. [`ExactMatcher`] maximises the number of
//! pairs and then the total weight; [`GreedyMatcher`] is always available
//! and takes the heaviest remaining edge first.

use std::cmp::Ordering;

use thiserror::Error;
use tracing::warn;

use crate::models::CompetitorId;

const WEIGHT_EPSILON: f64 = 1e-9;

/// Errors a matching strategy may report.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Exact matcher handles components of at most {limit} competitors, found {size}")]
    ComponentTooLarge { limit: usize, size: usize },
}

/// An allowed pairing between two vertices, `a < b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub weight: f64,
}

/// Eligibility graph over waiting competitors.
///
/// Vertices are indices into `ids`, which are kept in ascending id order so
/// that index order and id order agree.
#[derive(Debug, Clone, Default)]
pub struct PairingGraph {
    ids: Vec<CompetitorId>,
    edges: Vec<Edge>,
}

impl PairingGraph {
    pub fn new(mut ids: Vec<CompetitorId>) -> Self {
        ids.sort();
        ids.dedup();
        Self {
            ids,
            edges: Vec::new(),
        }
    }

    /// Add an undirected edge between two vertex indices.
    ///
    /// Self loops and indices outside the graph are dropped with a warning.
    pub fn add_edge(&mut self, a: usize, b: usize, weight: f64) {
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        if a == b {
            warn!("Ignoring self edge on vertex {}", a);
            return;
        }
        if b >= self.ids.len() {
            warn!(
                "Ignoring edge {}-{}: graph has {} vertices",
                a,
                b,
                self.ids.len()
            );
            return;
        }
        self.edges.push(Edge { a, b, weight });
    }

    pub fn vertex_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn ids(&self) -> &[CompetitorId] {
        &self.ids
    }

    pub fn id(&self, vertex: usize) -> CompetitorId {
        self.ids[vertex]
    }

    /// Connected components, each as ascending vertex indices, ordered by
    /// their smallest vertex.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let n = self.ids.len();
        let mut parent: Vec<usize> = (0..n).collect();

        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        for edge in &self.edges {
            let ra = find(&mut parent, edge.a);
            let rb = find(&mut parent, edge.b);
            if ra != rb {
                parent[ra.max(rb)] = ra.min(rb);
            }
        }

        let mut by_root: Vec<Vec<usize>> = vec![Vec::new(); n];
        for v in 0..n {
            let root = find(&mut parent, v);
            by_root[root].push(v);
        }
        by_root.into_iter().filter(|c| !c.is_empty()).collect()
    }
}

/// Total weight of a matching.
pub fn matching_weight(graph: &PairingGraph, matching: &[(usize, usize)]) -> f64 {
    matching
        .iter()
        .filter_map(|&(a, b)| {
            graph
                .edges
                .iter()
                .find(|e| (e.a, e.b) == (a.min(b), a.max(b)))
                .map(|e| e.weight)
        })
        .sum()
}

/// A strategy that turns a graph into a set of disjoint pairs.
pub trait Matcher {
    /// Strategy identifier for logging.
    fn name(&self) -> &'static str;

    /// Whether the strategy can handle this graph.
    fn is_available(&self, graph: &PairingGraph) -> bool;

    /// Disjoint vertex pairs, each `(a, b)` with `a < b`.
    fn find_matching(&self, graph: &PairingGraph) -> Result<Vec<(usize, usize)>, MatchError>;
}

/// Exact maximum-cardinality, maximum-weight matching.
///
/// Solves each connected component with a dynamic program over vertex
/// subsets, so it is only available while every component stays within
/// `max_component`.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    max_component: usize,
}

impl ExactMatcher {
    pub fn new(max_component: usize) -> Self {
        Self { max_component }
    }

    fn largest_component(graph: &PairingGraph) -> usize {
        graph.components().iter().map(Vec::len).max().unwrap_or(0)
    }

    fn solve_component(graph: &PairingGraph, vertices: &[usize]) -> Vec<(usize, usize)> {
        let n = vertices.len();
        if n < 2 {
            return Vec::new();
        }

        let mut local = vec![usize::MAX; graph.vertex_count()];
        for (i, &v) in vertices.iter().enumerate() {
            local[v] = i;
        }

        let mut weights: Vec<Option<f64>> = vec![None; n * n];
        for edge in &graph.edges {
            let (la, lb) = (local[edge.a], local[edge.b]);
            if la == usize::MAX || lb == usize::MAX {
                continue;
            }
            weights[la * n + lb] = Some(edge.weight);
            weights[lb * n + la] = Some(edge.weight);
        }

        const UNMATCHED: u8 = u8::MAX;
        let size = 1usize << n;
        let mut pairs = vec![0u32; size];
        let mut total = vec![0.0f64; size];
        let mut choice = vec![UNMATCHED; size];

        // Masks are visited in increasing order, so every strict subset of
        // `mask` is already solved.
        for mask in 1..size {
            let i = mask.trailing_zeros() as usize;
            let rest = mask & !(1 << i);

            let mut best_pairs = pairs[rest];
            let mut best_total = total[rest];
            let mut best_choice = UNMATCHED;

            for j in (i + 1)..n {
                if rest & (1 << j) == 0 {
                    continue;
                }
                let Some(w) = weights[i * n + j] else {
                    continue;
                };
                let sub = rest & !(1 << j);
                let cand_pairs = pairs[sub] + 1;
                let cand_total = total[sub] + w;

                let better = cand_pairs > best_pairs
                    || (cand_pairs == best_pairs && cand_total > best_total + WEIGHT_EPSILON);
                if better {
                    best_pairs = cand_pairs;
                    best_total = cand_total;
                    best_choice = j as u8;
                }
            }

            pairs[mask] = best_pairs;
            total[mask] = best_total;
            choice[mask] = best_choice;
        }

        let mut matching = Vec::with_capacity(n / 2);
        let mut mask = size - 1;
        while mask != 0 {
            let i = mask.trailing_zeros() as usize;
            match choice[mask] {
                UNMATCHED => mask &= !(1 << i),
                j => {
                    let j = j as usize;
                    matching.push((vertices[i], vertices[j]));
                    mask &= !((1 << i) | (1 << j));
                }
            }
        }
        matching
    }
}

impl Matcher for ExactMatcher {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn is_available(&self, graph: &PairingGraph) -> bool {
        Self::largest_component(graph) <= self.max_component
    }

    fn find_matching(&self, graph: &PairingGraph) -> Result<Vec<(usize, usize)>, MatchError> {
        let components = graph.components();
        if let Some(too_big) = components.iter().find(|c| c.len() > self.max_component) {
            return Err(MatchError::ComponentTooLarge {
                limit: self.max_component,
                size: too_big.len(),
            });
        }

        let mut matching: Vec<(usize, usize)> = components
            .iter()
            .flat_map(|component| Self::solve_component(graph, component))
            .collect();
        matching.sort();
        Ok(matching)
    }
}

/// Heaviest-edge-first matching.
///
/// May return fewer or lighter pairs than the exact strategy. Weight ties
/// are broken by ascending vertex pair, which is ascending id pair.
#[derive(Debug, Clone, Default)]
pub struct GreedyMatcher;

impl Matcher for GreedyMatcher {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn is_available(&self, _graph: &PairingGraph) -> bool {
        true
    }

    fn find_matching(&self, graph: &PairingGraph) -> Result<Vec<(usize, usize)>, MatchError> {
        let mut edges = graph.edges.clone();
        edges.sort_by(|x, y| match y.weight.total_cmp(&x.weight) {
            Ordering::Equal => (x.a, x.b).cmp(&(y.a, y.b)),
            other => other,
        });

        let mut matched = vec![false; graph.vertex_count()];
        let mut matching = Vec::new();
        for edge in edges {
            if !matched[edge.a] && !matched[edge.b] {
                matched[edge.a] = true;
                matched[edge.b] = true;
                matching.push((edge.a, edge.b));
            }
        }
        matching.sort();
        Ok(matching)
    }
}
