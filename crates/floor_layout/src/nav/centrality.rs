//! Per-node centrality scores used as a congestion proxy.
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::nav::NavGraph;
use crate::random::sample_distinct;

/// Number of betweenness sources accumulated per parallel task.
const SOURCES_PER_TASK: usize = 64;

/// Centrality measure backing the [`CongestionModel`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Centrality {
    /// Degree divided by `n - 1`.
    #[default]
    Degree,
    /// Weighted shortest-path betweenness, normalised to [0, 1].
    ///
    /// With `samples = Some(k)` only `k` seeded random sources are used and the result is
    /// rescaled by `n / k`.
    Betweenness {
        #[serde(default)]
        samples: Option<usize>,
        #[serde(default)]
        seed: u64,
    },
}

/// Precomputed centrality score per graph node, each in [0, 1].
#[derive(Clone, Debug)]
pub struct CongestionModel {
    scores: Vec<f64>,
}

impl CongestionModel {
    pub fn build(graph: &NavGraph, centrality: &Centrality) -> Self {
        let scores = match centrality {
            Centrality::Degree => degree_centrality(graph),
            Centrality::Betweenness { samples, seed } => {
                betweenness_centrality(graph, *samples, *seed)
            }
        };
        info!(
            "Computed {:?} centrality for {} nodes.",
            centrality,
            scores.len()
        );
        Self { scores }
    }

    pub fn from_scores(scores: Vec<f64>) -> Self {
        Self { scores }
    }

    #[inline]
    pub fn score(&self, node: usize) -> f64 {
        self.scores[node]
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Mean score of the given nodes; `0.0` for an empty selection.
    pub fn mean(&self, nodes: &[usize]) -> f64 {
        if nodes.is_empty() {
            return 0.0;
        }
        nodes.iter().map(|&n| self.scores[n]).sum::<f64>() / nodes.len() as f64
    }
}

fn degree_centrality(graph: &NavGraph) -> Vec<f64> {
    let n = graph.node_count();
    if n <= 1 {
        return vec![1.0; n];
    }
    let scale = 1.0 / (n - 1) as f64;
    (0..n).map(|v| graph.degree(v) as f64 * scale).collect()
}

fn betweenness_centrality(graph: &NavGraph, samples: Option<usize>, seed: u64) -> Vec<f64> {
    let n = graph.node_count();
    if n <= 2 {
        return vec![0.0; n];
    }

    let sources: Vec<usize> = match samples {
        Some(k) if k < n => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut picked = sample_distinct(&mut rng, n, k.max(1));
            picked.sort_unstable();
            picked
        }
        _ => (0..n).collect(),
    };

    // Fixed-size chunks summed in order keep the result independent of thread scheduling.
    let partials: Vec<Vec<f64>> = sources
        .par_chunks(SOURCES_PER_TASK)
        .map(|chunk| {
            let mut acc = vec![0.0; n];
            let mut scratch = BrandesScratch::new(n);
            for &s in chunk {
                scratch.accumulate(graph, s, &mut acc);
            }
            acc
        })
        .collect();

    let mut scores = vec![0.0; n];
    for partial in &partials {
        for (total, v) in scores.iter_mut().zip(partial) {
            *total += v;
        }
    }

    let mut scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
    if sources.len() < n {
        scale *= n as f64 / sources.len() as f64;
    }
    for s in &mut scores {
        *s = (*s * scale).clamp(0.0, 1.0);
    }
    scores
}

#[derive(Clone, Copy)]
struct Settle {
    dist: f64,
    node: usize,
}

impl PartialEq for Settle {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Settle {}

impl PartialOrd for Settle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Settle {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Reusable buffers for one Brandes single-source pass.
struct BrandesScratch {
    dist: Vec<f64>,
    sigma: Vec<f64>,
    delta: Vec<f64>,
    settled: Vec<bool>,
    preds: Vec<Vec<usize>>,
    order: Vec<usize>,
    heap: BinaryHeap<Settle>,
}

impl BrandesScratch {
    fn new(n: usize) -> Self {
        Self {
            dist: vec![f64::INFINITY; n],
            sigma: vec![0.0; n],
            delta: vec![0.0; n],
            settled: vec![false; n],
            preds: vec![Vec::new(); n],
            order: Vec::with_capacity(n),
            heap: BinaryHeap::new(),
        }
    }

    fn reset(&mut self) {
        self.dist.fill(f64::INFINITY);
        self.sigma.fill(0.0);
        self.delta.fill(0.0);
        self.settled.fill(false);
        for p in &mut self.preds {
            p.clear();
        }
        self.order.clear();
        self.heap.clear();
    }

    fn accumulate(&mut self, graph: &NavGraph, source: usize, acc: &mut [f64]) {
        self.reset();
        self.dist[source] = 0.0;
        self.sigma[source] = 1.0;
        self.heap.push(Settle {
            dist: 0.0,
            node: source,
        });

        while let Some(Settle { dist, node: v }) = self.heap.pop() {
            if self.settled[v] {
                continue;
            }
            self.settled[v] = true;
            self.order.push(v);
            for edge in graph.neighbors(v) {
                let w = edge.target;
                if self.settled[w] {
                    continue;
                }
                let candidate = dist + edge.weight;
                if candidate < self.dist[w] {
                    self.dist[w] = candidate;
                    self.sigma[w] = self.sigma[v];
                    self.preds[w].clear();
                    self.preds[w].push(v);
                    self.heap.push(Settle {
                        dist: candidate,
                        node: w,
                    });
                } else if candidate == self.dist[w] {
                    self.sigma[w] += self.sigma[v];
                    self.preds[w].push(v);
                }
            }
        }

        while let Some(w) = self.order.pop() {
            let coeff = (1.0 + self.delta[w]) / self.sigma[w];
            for i in 0..self.preds[w].len() {
                let v = self.preds[w][i];
                self.delta[v] += self.sigma[v] * coeff;
            }
            if w != source {
                acc[w] += self.delta[w];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::geometry::GridMask;

    fn path_graph(n: usize) -> NavGraph {
        let positions = (0..n).map(|i| DVec2::new(i as f64, 0.0)).collect();
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1, 1.0)).collect();
        NavGraph::from_edges(positions, &edges).unwrap()
    }

    #[test]
    fn degree_centrality_normalises_by_n_minus_one() {
        let graph = NavGraph::from_mask(&GridMask::filled(3, 3, true), 1, 1.0).unwrap();
        let model = CongestionModel::build(&graph, &Centrality::Degree);
        assert_eq!(model.score(4), 1.0);
        assert_eq!(model.score(0), 3.0 / 8.0);
        assert_eq!(model.mean(&[0, 4]), (1.0 + 3.0 / 8.0) / 2.0);
        assert_eq!(model.mean(&[]), 0.0);
    }

    #[test]
    fn betweenness_on_path_peaks_in_the_middle() {
        let graph = path_graph(5);
        let model = CongestionModel::build(
            &graph,
            &Centrality::Betweenness {
                samples: None,
                seed: 0,
            },
        );
        // middle node lies on 4 of the 6 unordered pairs not involving it: 2*4 / (4*3)
        assert!((model.score(2) - 8.0 / 12.0).abs() < 1e-12);
        assert!((model.score(1) - 6.0 / 12.0).abs() < 1e-12);
        assert_eq!(model.score(0), 0.0);
        assert_eq!(model.score(4), 0.0);
    }

    #[test]
    fn betweenness_splits_equal_paths() {
        // square 0-1-3-2-0: two equal shortest paths between opposite corners
        let positions = vec![DVec2::ZERO; 4];
        let graph =
            NavGraph::from_edges(positions, &[(0, 1, 1.0), (1, 3, 1.0), (3, 2, 1.0), (2, 0, 1.0)])
                .unwrap();
        let scores = betweenness_centrality(&graph, None, 0);
        for s in &scores {
            assert!((s - scores[0]).abs() < 1e-12);
            assert!(*s > 0.0 && *s <= 1.0);
        }
    }

    #[test]
    fn sampled_betweenness_is_seed_deterministic_and_bounded() {
        let graph = NavGraph::from_mask(&GridMask::filled(12, 12, true), 1, 1.0).unwrap();
        let c = Centrality::Betweenness {
            samples: Some(20),
            seed: 99,
        };
        let a = CongestionModel::build(&graph, &c);
        let b = CongestionModel::build(&graph, &c);
        assert_eq!(a.scores(), b.scores());
        assert!(a.scores().iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn centrality_deserializes_from_config_shapes() {
        let degree: Centrality = serde_json::from_str("\"degree\"").unwrap();
        assert_eq!(degree, Centrality::Degree);
        let between: Centrality =
            serde_json::from_str(r#"{"betweenness": {"samples": 32}}"#).unwrap();
        assert_eq!(
            between,
            Centrality::Betweenness {
                samples: Some(32),
                seed: 0
            }
        );
    }
}
