//! Single-source shortest paths and the precomputed entrance distance table.
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::DVec2;
use rayon::prelude::*;
use tracing::info;

use crate::error::{Error, Result};
use crate::nav::{NavGraph, NearestNodeIndex};

/// Distance reported for nodes that cannot be reached from a source.
pub const UNREACHABLE: f64 = 1e12;

#[derive(Clone, Copy, Debug)]
struct QueueEntry {
    cost: f64,
    node: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    // Reversed so that `BinaryHeap` pops the cheapest entry first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Shortest-path length from `source` to every node; unreachable nodes get [`UNREACHABLE`].
///
/// # Panics
/// Panics if `source` is not a node of `graph`.
pub fn shortest_path_lengths(graph: &NavGraph, source: usize) -> Vec<f64> {
    let mut dist = vec![f64::INFINITY; graph.node_count()];
    let mut heap = BinaryHeap::new();
    dist[source] = 0.0;
    heap.push(QueueEntry {
        cost: 0.0,
        node: source,
    });

    while let Some(QueueEntry { cost, node }) = heap.pop() {
        if cost > dist[node] {
            continue;
        }
        for edge in graph.neighbors(node) {
            let next = cost + edge.weight;
            if next < dist[edge.target] {
                dist[edge.target] = next;
                heap.push(QueueEntry {
                    cost: next,
                    node: edge.target,
                });
            }
        }
    }

    for d in &mut dist {
        if !d.is_finite() {
            *d = UNREACHABLE;
        }
    }
    dist
}

/// Dense `[entrances x nodes]` matrix of shortest-path distances, computed once.
#[derive(Clone, Debug)]
pub struct EntranceDistanceTable {
    entrance_nodes: Vec<usize>,
    node_count: usize,
    distances: Vec<f64>,
}

impl EntranceDistanceTable {
    /// Runs one Dijkstra per entrance, rooted at the graph node nearest to it.
    pub fn build(graph: &NavGraph, index: &NearestNodeIndex, entrances: &[DVec2]) -> Result<Self> {
        if entrances.is_empty() {
            return Err(Error::NoEntrances);
        }
        if let Some(bad) = entrances.iter().find(|e| !e.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "entrance coordinates must be finite, got {bad}"
            )));
        }
        if graph.is_empty() {
            return Err(Error::EmptyGraph);
        }

        let entrance_nodes = entrances
            .iter()
            .map(|&e| index.nearest(e).ok_or(Error::EmptyGraph))
            .collect::<Result<Vec<_>>>()?;
        let rows: Vec<Vec<f64>> = entrance_nodes
            .par_iter()
            .map(|&node| shortest_path_lengths(graph, node))
            .collect();

        info!(
            "Precomputed shortest paths from {} entrances over {} nodes.",
            entrance_nodes.len(),
            graph.node_count()
        );
        Ok(Self {
            entrance_nodes,
            node_count: graph.node_count(),
            distances: rows.concat(),
        })
    }

    pub fn entrance_count(&self) -> usize {
        self.entrance_nodes.len()
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Graph node each entrance was snapped to.
    pub fn entrance_nodes(&self) -> &[usize] {
        &self.entrance_nodes
    }

    /// Distances from entrance `entrance` to every node.
    pub fn row(&self, entrance: usize) -> &[f64] {
        &self.distances[entrance * self.node_count..(entrance + 1) * self.node_count]
    }

    #[inline]
    pub fn distance(&self, entrance: usize, node: usize) -> f64 {
        self.distances[entrance * self.node_count + node]
    }

    /// Mean over entrances of the distance to the closest of `nodes`.
    ///
    /// Returns [`UNREACHABLE`] when `nodes` is empty.
    pub fn mean_min_distance(&self, nodes: &[usize]) -> f64 {
        if nodes.is_empty() {
            return UNREACHABLE;
        }
        let total: f64 = (0..self.entrance_count())
            .map(|e| {
                let row = self.row(e);
                nodes
                    .iter()
                    .map(|&n| row[n])
                    .fold(f64::INFINITY, f64::min)
            })
            .sum();
        total / self.entrance_count() as f64
    }
}
