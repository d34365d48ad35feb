#![forbid(unsafe_code)]
//! floor_layout: multi-objective placement of objects on a walkable floor plan.
//!
//! Modules:
//! - geometry: walkability masks, distance field, candidate site sampling
//! - nav: coarse navigation graph, nearest-node index, entrance distances, centrality
//! - objectives: visibility estimation and the layout problem (distance, visibility, congestion)
//! - search: constrained NSGA-II engine, Pareto archive, events, checkpoints, output records
//! - config: flat run configuration
//!
//! For a command-line front end, see the `floor_layout_cli` crate.
pub mod config;
pub mod error;
pub mod geometry;
pub mod nav;
pub mod objectives;
pub(crate) mod random;
pub mod search;

/// Convenient re-exports for common types. Import with `use floor_layout::prelude::*;`.
pub mod prelude {
    pub use crate::config::LayoutConfig;
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{
        CandidateSite, DistanceField, GeometryIndex, GridMask, SiteSampling, SiteTable,
    };
    pub use crate::nav::{
        Centrality, CongestionModel, EntranceDistanceTable, NavGraph, NearestNodeIndex,
        UNREACHABLE,
    };
    pub use crate::objectives::{LayoutProblem, VisibilityConfig, VisibilityEvaluator};
    pub use crate::search::{
        random_feasible_candidate, ArchiveEntry, BestLayout, CheckpointSink, EngineState,
        Evaluation, EventSink, Feasibility, FnSink, Individual, JsonCheckpointWriter,
        LayoutCandidate, Objective, ObjectiveVector, ParetoArchive, Population, Problem,
        ScoreRecord, SearchConfig, SearchEngine, SearchEvent, SearchEventKind, SearchOutcome,
        SolutionRecord, SolutionSet, VecCheckpoints, VecSink, DEFAULT_FEASIBLE_TRIES,
    };
}
