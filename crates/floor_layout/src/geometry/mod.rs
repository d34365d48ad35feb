//! Spatial preprocessing of the floor plan.
//!
//! Turns a walkability raster into a [`GeometryIndex`] (mask + distance field) and samples
//! the ordered [`SiteTable`] of candidate placement sites from it.
pub mod edt;
pub mod index;
pub mod mask;
pub mod sites;

pub use edt::DistanceField;
pub use index::GeometryIndex;
pub use mask::GridMask;
pub use sites::{CandidateSite, SiteSampling, SiteTable};
