//! The three-objective, one-constraint layout problem.
use std::sync::Arc;

use glam::DVec2;
use tracing::info;

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::geometry::{GeometryIndex, GridMask, SiteTable};
use crate::nav::{CongestionModel, EntranceDistanceTable, NavGraph, NearestNodeIndex};
use crate::objectives::VisibilityEvaluator;
use crate::search::{Evaluation, Feasibility, LayoutCandidate, ObjectiveVector, Problem};

/// Objective and constraint evaluation over precomputed, shared read-only tables.
///
/// Cloning is cheap; clones share all tables.
#[derive(Clone, Debug)]
pub struct LayoutProblem {
    geometry: Arc<GeometryIndex>,
    sites: SiteTable,
    site_nodes: Arc<[usize]>,
    graph: Arc<NavGraph>,
    distances: Arc<EntranceDistanceTable>,
    congestion: Arc<CongestionModel>,
    visibility: VisibilityEvaluator,
    object_count: usize,
    min_clearance: f64,
    min_clearance_sq: f64,
}

impl LayoutProblem {
    /// Runs the whole preprocessing chain: distance field, candidate sites, navigation
    /// graph, nearest-node lookups, entrance distances, centrality and visibility.
    ///
    /// Fails if no site survives the filters, if there are fewer sites than objects, or if
    /// the navigation graph has no nodes.
    pub fn prepare(
        walkable: GridMask,
        placeable: Option<&GridMask>,
        config: &LayoutConfig,
    ) -> Result<Self> {
        config.validate()?;
        let mpp = config.meters_per_pixel;

        let geometry = GeometryIndex::new(walkable, mpp)?;
        let sites = geometry.sample_sites(&config.site_sampling(), placeable)?;
        if sites.is_empty() {
            return Err(Error::NoCandidateSites);
        }
        if sites.len() < config.num_objects {
            return Err(Error::InsufficientSites {
                required: config.num_objects,
                available: sites.len(),
            });
        }

        let graph = NavGraph::from_mask(geometry.walkable(), config.graph_step_px, mpp)?;
        if graph.is_empty() {
            return Err(Error::EmptyGraph);
        }
        let index = NearestNodeIndex::from_graph(&graph);
        let distances = EntranceDistanceTable::build(&graph, &index, &config.entrance_points())?;
        let congestion = CongestionModel::build(&graph, &config.centrality);
        let site_nodes = sites
            .iter()
            .map(|s| index.nearest(s.position()).ok_or(Error::EmptyGraph))
            .collect::<Result<Vec<_>>>()?;
        let visibility = VisibilityEvaluator::new(&config.visibility_config(), mpp)?;

        info!(
            "Prepared layout problem: {} sites, {} nodes / {} edges, {} entrances, {} objects.",
            sites.len(),
            graph.node_count(),
            graph.edge_count(),
            distances.entrance_count(),
            config.num_objects
        );
        Ok(Self {
            geometry: Arc::new(geometry),
            sites,
            site_nodes: site_nodes.into(),
            graph: Arc::new(graph),
            distances: Arc::new(distances),
            congestion: Arc::new(congestion),
            visibility,
            object_count: config.num_objects,
            min_clearance: config.min_clearance_m,
            min_clearance_sq: config.min_clearance_m * config.min_clearance_m,
        })
    }

    pub fn geometry(&self) -> &GeometryIndex {
        &self.geometry
    }

    pub fn sites(&self) -> &SiteTable {
        &self.sites
    }

    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }

    pub fn distances(&self) -> &EntranceDistanceTable {
        &self.distances
    }

    pub fn congestion(&self) -> &CongestionModel {
        &self.congestion
    }

    pub fn visibility(&self) -> &VisibilityEvaluator {
        &self.visibility
    }

    /// Graph node a site was snapped to.
    #[inline]
    pub fn site_node(&self, site: usize) -> usize {
        self.site_nodes[site]
    }
}

impl Problem for LayoutProblem {
    fn object_count(&self) -> usize {
        self.object_count
    }

    fn site_count(&self) -> usize {
        self.sites.len()
    }

    #[inline]
    fn site_position(&self, site: usize) -> DVec2 {
        self.sites.position(site)
    }

    fn min_clearance(&self) -> f64 {
        self.min_clearance
    }

    fn meters_per_pixel(&self) -> f64 {
        self.geometry.meters_per_pixel()
    }

    #[inline]
    fn sites_compatible(&self, a: usize, b: usize) -> bool {
        let (pa, pb) = (self.sites.position(a), self.sites.position(b));
        pa.distance_squared(pb) >= self.min_clearance_sq
    }

    /// Infeasible candidates are still scored on all three objectives.
    fn evaluate(&self, candidate: &LayoutCandidate) -> Evaluation {
        let feasibility = if self.is_feasible(candidate) {
            Feasibility::Feasible
        } else {
            Feasibility::Infeasible
        };

        let selected = candidate.sites();
        let nodes: Vec<usize> = selected.iter().map(|&s| self.site_nodes[s]).collect();
        let points: Vec<DVec2> = selected.iter().map(|&s| self.sites.position(s)).collect();

        let distance = self.distances.mean_min_distance(&nodes);
        let visibility = self.visibility.mean_visibility(&self.geometry, &points);
        let congestion = self.congestion.mean(&nodes);

        Evaluation::new(
            ObjectiveVector::new(distance, -visibility, congestion),
            feasibility,
        )
    }
}
