//! Navigation graph and the tables precomputed on it.
//!
//! The [`NavGraph`] is a coarsened, 8-connected proxy for walking distance. Everything
//! derived from it ([`NearestNodeIndex`], [`EntranceDistanceTable`], [`CongestionModel`])
//! is built once before a search starts and is read-only afterwards.
pub mod centrality;
pub mod dijkstra;
pub mod graph;
pub mod spatial;

pub use centrality::{Centrality, CongestionModel};
pub use dijkstra::{shortest_path_lengths, EntranceDistanceTable, UNREACHABLE};
pub use graph::{NavEdge, NavGraph};
pub use spatial::NearestNodeIndex;
