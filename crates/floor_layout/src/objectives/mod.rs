//! Objective evaluators and the layout problem built from them.
pub mod problem;
pub mod visibility;

pub use problem::LayoutProblem;
pub use visibility::{VisibilityConfig, VisibilityEvaluator};
