//! Coarse 8-connected navigation graph over walkable cells.
use glam::DVec2;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::GridMask;

/// Neighbour offsets (in coarse cells) for 8-connectivity.
const NEIGHBOURS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Half of an undirected edge, stored on its source node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavEdge {
    pub target: usize,
    pub weight: f64,
}

/// Undirected weighted graph in compressed adjacency form.
///
/// Nodes are numbered `0..node_count()`; every undirected edge is stored once on each
/// endpoint.
#[derive(Clone, Debug)]
pub struct NavGraph {
    positions: Vec<DVec2>,
    offsets: Vec<usize>,
    edges: Vec<NavEdge>,
}

impl NavGraph {
    /// Builds the graph over every walkable pixel on a `step_px` lattice.
    ///
    /// Two lattice neighbours (including diagonals) are connected iff both are walkable;
    /// the weight is the Euclidean step length times `meters_per_pixel`. Nodes are
    /// numbered row by row.
    pub fn from_mask(mask: &GridMask, step_px: usize, meters_per_pixel: f64) -> Result<Self> {
        if step_px == 0 {
            return Err(Error::InvalidConfig("graph step must be > 0".into()));
        }
        if !meters_per_pixel.is_finite() || meters_per_pixel <= 0.0 {
            return Err(Error::InvalidConfig(
                "meters_per_pixel must be finite and > 0".into(),
            ));
        }

        let (w, h) = mask.size();
        let cols = w.div_ceil(step_px);
        let rows = h.div_ceil(step_px);

        let mut lattice = vec![usize::MAX; cols * rows];
        let mut positions = Vec::new();
        for gy in 0..rows {
            for gx in 0..cols {
                let (px, py) = (gx * step_px, gy * step_px);
                if mask.get(px as isize, py as isize) {
                    lattice[gy * cols + gx] = positions.len();
                    positions.push(DVec2::new(px as f64, py as f64) * meters_per_pixel);
                }
            }
        }

        let orthogonal = step_px as f64 * meters_per_pixel;
        let diagonal = orthogonal * std::f64::consts::SQRT_2;

        let mut offsets = Vec::with_capacity(positions.len() + 1);
        let mut edges = Vec::new();
        offsets.push(0);
        for gy in 0..rows {
            for gx in 0..cols {
                if lattice[gy * cols + gx] == usize::MAX {
                    continue;
                }
                for (dx, dy) in NEIGHBOURS {
                    let (nx, ny) = (gx as isize + dx, gy as isize + dy);
                    if nx < 0 || ny < 0 || nx >= cols as isize || ny >= rows as isize {
                        continue;
                    }
                    let target = lattice[ny as usize * cols + nx as usize];
                    if target == usize::MAX {
                        continue;
                    }
                    let weight = if dx != 0 && dy != 0 {
                        diagonal
                    } else {
                        orthogonal
                    };
                    edges.push(NavEdge { target, weight });
                }
                offsets.push(edges.len());
            }
        }

        debug!(
            "Built navigation graph: {} nodes, {} edges (step {} px).",
            positions.len(),
            edges.len() / 2,
            step_px
        );
        Ok(Self {
            positions,
            offsets,
            edges,
        })
    }

    /// Builds a graph from explicit node positions and undirected `(a, b, weight)` edges.
    pub fn from_edges(positions: Vec<DVec2>, edges: &[(usize, usize, f64)]) -> Result<Self> {
        let n = positions.len();
        let mut adjacency: Vec<Vec<NavEdge>> = vec![Vec::new(); n];
        for &(a, b, weight) in edges {
            if a >= n || b >= n {
                return Err(Error::InvalidConfig(format!(
                    "edge ({a}, {b}) references a node outside 0..{n}"
                )));
            }
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "edge ({a}, {b}) has invalid weight {weight}"
                )));
            }
            adjacency[a].push(NavEdge { target: b, weight });
            if a != b {
                adjacency[b].push(NavEdge { target: a, weight });
            }
        }

        let mut offsets = Vec::with_capacity(n + 1);
        let mut flat = Vec::new();
        offsets.push(0);
        for list in adjacency {
            flat.extend(list);
            offsets.push(flat.len());
        }
        Ok(Self {
            positions,
            offsets,
            edges: flat,
        })
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Metric position of a node.
    #[inline]
    pub fn position(&self, node: usize) -> DVec2 {
        self.positions[node]
    }

    pub fn positions(&self) -> &[DVec2] {
        &self.positions
    }

    /// Edges leaving `node`.
    #[inline]
    pub fn neighbors(&self, node: usize) -> &[NavEdge] {
        &self.edges[self.offsets[node]..self.offsets[node + 1]]
    }

    pub fn degree(&self, node: usize) -> usize {
        self.offsets[node + 1] - self.offsets[node]
    }
}
