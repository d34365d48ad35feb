//! Walkability lookups in metric space.
use glam::DVec2;
use tracing::info;

use crate::error::{Error, Result};
use crate::geometry::sites::{CandidateSite, SiteSampling, SiteTable};
use crate::geometry::{DistanceField, GridMask};

/// Rasterized walkability mask plus its distance-to-obstacle field.
///
/// Pixel `(ix, iy)` maps to the metric point `(ix, iy) * meters_per_pixel`; a metric point
/// maps back to the pixel containing it (`floor(p / meters_per_pixel)`).
#[derive(Clone, Debug)]
pub struct GeometryIndex {
    walkable: GridMask,
    distance: DistanceField,
    meters_per_pixel: f64,
}

impl GeometryIndex {
    /// Builds the index, computing the distance field once.
    pub fn new(walkable: GridMask, meters_per_pixel: f64) -> Result<Self> {
        if !meters_per_pixel.is_finite() || meters_per_pixel <= 0.0 {
            return Err(Error::InvalidConfig(
                "meters_per_pixel must be finite and > 0".into(),
            ));
        }
        if walkable.is_empty() {
            return Err(Error::InvalidConfig("walkability mask is empty".into()));
        }
        let distance = DistanceField::compute(&walkable, meters_per_pixel);
        Ok(Self {
            walkable,
            distance,
            meters_per_pixel,
        })
    }

    pub fn walkable(&self) -> &GridMask {
        &self.walkable
    }

    pub fn distance_field(&self) -> &DistanceField {
        &self.distance
    }

    pub fn meters_per_pixel(&self) -> f64 {
        self.meters_per_pixel
    }

    /// Dimensions of the underlying pixel grid.
    pub fn size(&self) -> (usize, usize) {
        self.walkable.size()
    }

    /// Metric position of a pixel.
    #[inline]
    pub fn pixel_to_world(&self, x: usize, y: usize) -> DVec2 {
        DVec2::new(x as f64, y as f64) * self.meters_per_pixel
    }

    /// Pixel containing a metric point. May lie outside the grid.
    #[inline]
    pub fn world_to_pixel(&self, p: DVec2) -> (isize, isize) {
        let q = p / self.meters_per_pixel;
        (q.x.floor() as isize, q.y.floor() as isize)
    }

    /// `true` if the point lies on a walkable pixel. Anything outside the grid is blocked.
    #[inline]
    pub fn is_walkable_at(&self, p: DVec2) -> bool {
        let (x, y) = self.world_to_pixel(p);
        self.walkable.get(x, y)
    }

    /// Distance to the nearest obstacle at a metric point, `0.0` outside the grid.
    pub fn clearance_at(&self, p: DVec2) -> f64 {
        let (x, y) = self.world_to_pixel(p);
        self.distance.get(x, y)
    }

    /// Collects candidate sites on the sampling stride.
    ///
    /// A cell is kept iff it is walkable, its wall clearance is at least
    /// `sampling.min_wall_clearance_m`, and (when given) `placeable` marks it. Sites are
    /// ordered row by row; their index in the returned table is their identity.
    pub fn sample_sites(
        &self,
        sampling: &SiteSampling,
        placeable: Option<&GridMask>,
    ) -> Result<SiteTable> {
        sampling.validate()?;
        if let Some(mask) = placeable {
            self.walkable.ensure_same_shape(mask)?;
        }

        let (w, h) = self.size();
        let mut sites = Vec::new();
        for y in (0..h).step_by(sampling.stride_px) {
            for x in (0..w).step_by(sampling.stride_px) {
                let (ix, iy) = (x as isize, y as isize);
                if !self.walkable.get(ix, iy) {
                    continue;
                }
                if self.distance.get(ix, iy) < sampling.min_wall_clearance_m {
                    continue;
                }
                if placeable.is_some_and(|m| !m.get(ix, iy)) {
                    continue;
                }
                sites.push(CandidateSite::new(self.pixel_to_world(x, y), (x, y)));
            }
        }

        info!(
            "Sampled {} candidate sites (stride {} px, >= {} m from walls, placeable mask {}).",
            sites.len(),
            sampling.stride_px,
            sampling.min_wall_clearance_m,
            if placeable.is_some() { "on" } else { "off" }
        );
        Ok(SiteTable::new(sites))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> GeometryIndex {
        // 8x5 with an obstacle border
        let mask = GridMask::from_fn(8, 5, |x, y| x > 0 && y > 0 && x < 7 && y < 4);
        GeometryIndex::new(mask, 0.5).unwrap()
    }

    #[test]
    fn rejects_non_positive_scale() {
        let mask = GridMask::filled(2, 2, true);
        assert!(GeometryIndex::new(mask.clone(), 0.0).is_err());
        assert!(GeometryIndex::new(mask, f64::NAN).is_err());
    }

    #[test]
    fn world_pixel_mapping_uses_floor() {
        let geom = corridor();
        assert_eq!(geom.world_to_pixel(DVec2::new(0.74, 0.5)), (1, 1));
        assert_eq!(geom.world_to_pixel(DVec2::new(-0.1, 0.0)), (-1, 0));
        assert_eq!(geom.pixel_to_world(3, 2), DVec2::new(1.5, 1.0));
        assert!(geom.is_walkable_at(DVec2::new(1.0, 1.0)));
        assert!(!geom.is_walkable_at(DVec2::new(0.2, 1.0)));
        assert!(!geom.is_walkable_at(DVec2::new(-5.0, 1.0)));
    }

    #[test]
    fn sample_sites_filters_by_wall_clearance() {
        let geom = corridor();
        let all = geom.sample_sites(&SiteSampling::new(1, 0.0), None).unwrap();
        assert_eq!(all.len(), 18);

        // only the middle row is two pixels (1 m) away from the border
        let inner = geom.sample_sites(&SiteSampling::new(1, 1.0), None).unwrap();
        assert_eq!(inner.len(), 4);
        assert!(inner.iter().all(|s| s.cell().1 == 2));
    }

    #[test]
    fn sample_sites_respects_stride_and_order() {
        let geom = GeometryIndex::new(GridMask::filled(5, 5, true), 1.0).unwrap();
        let sites = geom.sample_sites(&SiteSampling::new(2, 0.0), None).unwrap();
        let cells: Vec<_> = sites.iter().map(|s| s.cell()).collect();
        assert_eq!(
            cells,
            vec![
                (0, 0),
                (2, 0),
                (4, 0),
                (0, 2),
                (2, 2),
                (4, 2),
                (0, 4),
                (2, 4),
                (4, 4)
            ]
        );
        assert_eq!(sites.position(4), DVec2::new(2.0, 2.0));
    }

    #[test]
    fn sample_sites_applies_placeable_mask() {
        let geom = GeometryIndex::new(GridMask::filled(4, 4, true), 1.0).unwrap();
        let placeable = GridMask::from_fn(4, 4, |x, _| x < 2);
        let sites = geom
            .sample_sites(&SiteSampling::new(1, 0.0), Some(&placeable))
            .unwrap();
        assert_eq!(sites.len(), 8);
        assert!(sites.iter().all(|s| s.cell().0 < 2));
    }

    #[test]
    fn sample_sites_rejects_mismatched_placeable_mask() {
        let geom = GeometryIndex::new(GridMask::filled(4, 4, true), 1.0).unwrap();
        let placeable = GridMask::filled(4, 3, true);
        let err = geom
            .sample_sites(&SiteSampling::new(1, 0.0), Some(&placeable))
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }
}
