//! Candidate placement sites.
use std::sync::Arc;

use glam::DVec2;

use crate::error::{Error, Result};

/// Stride sampling parameters for candidate sites.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteSampling {
    /// Sampling stride in pixels along both axes.
    pub stride_px: usize,
    /// Minimum distance to the nearest obstacle, in metres.
    pub min_wall_clearance_m: f64,
}

impl Default for SiteSampling {
    fn default() -> Self {
        Self {
            stride_px: 6,
            min_wall_clearance_m: 0.0,
        }
    }
}

impl SiteSampling {
    pub fn new(stride_px: usize, min_wall_clearance_m: f64) -> Self {
        Self {
            stride_px,
            min_wall_clearance_m,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.stride_px == 0 {
            return Err(Error::InvalidConfig("site stride must be > 0".into()));
        }
        if !self.min_wall_clearance_m.is_finite() || self.min_wall_clearance_m < 0.0 {
            return Err(Error::InvalidConfig(
                "minimum wall clearance must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// A metric point eligible to host an object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CandidateSite {
    position: DVec2,
    cell: (usize, usize),
}

impl CandidateSite {
    pub fn new(position: DVec2, cell: (usize, usize)) -> Self {
        Self { position, cell }
    }

    /// Position in metres.
    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Source pixel `(x, y)`.
    pub fn cell(&self) -> (usize, usize) {
        self.cell
    }
}

/// Immutable, index-addressable sequence of candidate sites.
///
/// Cloning is cheap; clones share the same storage.
#[derive(Clone, Debug)]
pub struct SiteTable {
    sites: Arc<[CandidateSite]>,
}

impl SiteTable {
    pub fn new(sites: Vec<CandidateSite>) -> Self {
        Self {
            sites: sites.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CandidateSite> {
        self.sites.get(index)
    }

    /// Position of the site at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    #[inline]
    pub fn position(&self, index: usize) -> DVec2 {
        self.sites[index].position
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateSite> {
        self.sites.iter()
    }

    pub fn positions(&self) -> Vec<DVec2> {
        self.sites.iter().map(|s| s.position).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_validation() {
        assert!(SiteSampling::new(0, 0.0).validate().is_err());
        assert!(SiteSampling::new(2, -1.0).validate().is_err());
        assert!(SiteSampling::new(2, f64::INFINITY).validate().is_err());
        assert!(SiteSampling::new(2, 3.0).validate().is_ok());
    }

    #[test]
    fn table_clones_share_storage() {
        let table = SiteTable::new(vec![
            CandidateSite::new(DVec2::new(1.0, 2.0), (1, 2)),
            CandidateSite::new(DVec2::new(3.0, 4.0), (3, 4)),
        ]);
        let clone = table.clone();
        assert!(Arc::ptr_eq(&table.sites, &clone.sites));
        assert_eq!(clone.position(1), DVec2::new(3.0, 4.0));
        assert!(clone.get(2).is_none());
    }
}
