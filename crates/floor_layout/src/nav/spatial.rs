//! Nearest-node lookups backed by an R-tree.
use std::fmt;

use glam::DVec2;
use rstar::primitives::GeomWithData;
use rstar::{PointDistance, RTree};

use crate::nav::NavGraph;

/// A node position tagged with its graph id.
type NodePoint = GeomWithData<[f64; 2], usize>;

/// Spatial index mapping arbitrary metric points to the closest graph node.
#[derive(Clone)]
pub struct NearestNodeIndex {
    tree: RTree<NodePoint>,
}

impl fmt::Debug for NearestNodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NearestNodeIndex")
            .field("nodes", &self.tree.size())
            .finish()
    }
}

impl NearestNodeIndex {
    /// Bulk-loads the index; node ids are positions in `points`.
    pub fn new(points: Vec<DVec2>) -> Self {
        let nodes = points
            .into_iter()
            .enumerate()
            .map(|(id, p)| NodePoint::new(p.to_array(), id))
            .collect();
        Self {
            tree: RTree::bulk_load(nodes),
        }
    }

    pub fn from_graph(graph: &NavGraph) -> Self {
        Self::new(graph.positions().to_vec())
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Id of the node closest to `query`; ties resolve to the lowest id.
    pub fn nearest(&self, query: DVec2) -> Option<usize> {
        let query = query.to_array();
        let mut candidates = self.tree.nearest_neighbor_iter(&query);
        let first = candidates.next()?;
        let best_d2 = first.distance_2(&query);
        let tied = candidates
            .take_while(|node| node.distance_2(&query) <= best_d2)
            .map(|node| node.data);
        Some(tied.fold(first.data, usize::min))
    }
}
