//! Constrained multi-objective search over site selections (NSGA-II).
//!
//! The engine only talks to the [`Problem`] trait, so it can be driven by
//! [`crate::objectives::LayoutProblem`] or by any small synthetic problem in tests.
use glam::DVec2;

pub mod archive;
pub mod checkpoint;
pub mod engine;
pub mod events;
pub mod individual;
pub mod init;
pub mod output;
pub mod ranking;
pub mod variation;

pub use archive::{ArchiveEntry, ParetoArchive};
pub use checkpoint::{CheckpointSink, JsonCheckpointWriter, VecCheckpoints};
pub use engine::{EngineState, SearchConfig, SearchEngine, SearchOutcome};
pub use events::{EventSink, FnSink, SearchEvent, SearchEventKind, VecSink};
pub use individual::{
    Evaluation, Feasibility, Individual, LayoutCandidate, Objective, ObjectiveVector, Population,
};
pub use init::{random_feasible_candidate, DEFAULT_FEASIBLE_TRIES};
pub use output::{BestLayout, ScoreRecord, SolutionRecord, SolutionSet};
pub use ranking::{rank, RankInfo};

/// Objective and constraint function over a fixed, index-addressable site table.
///
/// Implementations must be pure: [`Problem::evaluate`] is called concurrently from worker
/// threads and may not rely on shared mutable state.
pub trait Problem: Sync {
    /// Number of objects `N` each candidate places.
    fn object_count(&self) -> usize;

    /// Number of candidate sites.
    fn site_count(&self) -> usize;

    /// Metric position of a site.
    fn site_position(&self, site: usize) -> DVec2;

    /// Minimum pairwise distance between placed objects, in metres.
    fn min_clearance(&self) -> f64;

    /// Scale recorded alongside decoded layouts.
    fn meters_per_pixel(&self) -> f64 {
        1.0
    }

    fn evaluate(&self, candidate: &LayoutCandidate) -> Evaluation;

    /// `true` if two sites may both be occupied.
    #[inline]
    fn sites_compatible(&self, a: usize, b: usize) -> bool {
        let clearance = self.min_clearance();
        self.site_position(a)
            .distance_squared(self.site_position(b))
            >= clearance * clearance
    }

    /// `true` if every unordered pair of selected sites keeps clearance.
    fn is_feasible(&self, candidate: &LayoutCandidate) -> bool {
        let sites = candidate.sites();
        for (i, &a) in sites.iter().enumerate() {
            for &b in &sites[i + 1..] {
                if !self.sites_compatible(a, b) {
                    return false;
                }
            }
        }
        true
    }

    /// Metric positions of a candidate's sites, in slot order.
    fn decode(&self, candidate: &LayoutCandidate) -> Vec<DVec2> {
        candidate
            .sites()
            .iter()
            .map(|&s| self.site_position(s))
            .collect()
    }
}
