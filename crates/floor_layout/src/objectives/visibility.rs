//! Raster ray-marching estimate of unobstructed sightline length.
use glam::DVec2;

use crate::error::{Error, Result};
use crate::geometry::GeometryIndex;

/// Ray-marching parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityConfig {
    /// Number of uniformly spaced directions per point.
    pub rays: usize,
    /// Maximum sightline length in metres.
    pub max_range_m: f64,
    /// March step in metres. `None` uses twice the pixel size.
    pub step_m: Option<f64>,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            rays: 8,
            max_range_m: 12.0,
            step_m: None,
        }
    }
}

impl VisibilityConfig {
    pub fn new(rays: usize, max_range_m: f64) -> Self {
        Self {
            rays,
            max_range_m,
            step_m: None,
        }
    }

    pub fn with_step(mut self, step_m: f64) -> Self {
        self.step_m = Some(step_m);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.rays == 0 {
            return Err(Error::InvalidConfig("vis_rays must be > 0".into()));
        }
        if !self.max_range_m.is_finite() || self.max_range_m < 0.0 {
            return Err(Error::InvalidConfig(
                "vis_range_m must be finite and >= 0".into(),
            ));
        }
        if let Some(step) = self.step_m {
            if !step.is_finite() || step <= 0.0 {
                return Err(Error::InvalidConfig(
                    "vis_step_m must be finite and > 0".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Deterministic visibility estimator over a [`GeometryIndex`].
#[derive(Clone, Debug)]
pub struct VisibilityEvaluator {
    directions: Vec<DVec2>,
    max_range: f64,
    step: f64,
}

impl VisibilityEvaluator {
    pub fn new(config: &VisibilityConfig, meters_per_pixel: f64) -> Result<Self> {
        config.validate()?;
        let step = config.step_m.unwrap_or(2.0 * meters_per_pixel);
        if !step.is_finite() || step <= 0.0 {
            return Err(Error::InvalidConfig(
                "visibility step must be finite and > 0".into(),
            ));
        }
        let directions = (0..config.rays)
            .map(|k| DVec2::from_angle(std::f64::consts::TAU * k as f64 / config.rays as f64))
            .collect();
        Ok(Self {
            directions,
            max_range: config.max_range_m,
            step,
        })
    }

    pub fn rays(&self) -> usize {
        self.directions.len()
    }

    pub fn max_range(&self) -> f64 {
        self.max_range
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Mean marched length over all directions from `p`.
    ///
    /// A ray advances in `step` increments until it leaves the mask, reaches an obstacle
    /// pixel, or passes the maximum range; the reported length never exceeds the range.
    pub fn point_visibility(&self, geometry: &GeometryIndex, p: DVec2) -> f64 {
        let total: f64 = self
            .directions
            .iter()
            .map(|&dir| self.march(geometry, p, dir))
            .sum();
        total / self.directions.len() as f64
    }

    /// Mean of [`Self::point_visibility`] over `points`; `0.0` for an empty set.
    pub fn mean_visibility(&self, geometry: &GeometryIndex, points: &[DVec2]) -> f64 {
        if points.is_empty() {
            return 0.0;
        }
        points
            .iter()
            .map(|&p| self.point_visibility(geometry, p))
            .sum::<f64>()
            / points.len() as f64
    }

    fn march(&self, geometry: &GeometryIndex, origin: DVec2, dir: DVec2) -> f64 {
        let mut r = 0.0;
        while r <= self.max_range {
            if !geometry.is_walkable_at(origin + dir * r) {
                break;
            }
            r += self.step;
        }
        r.min(self.max_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridMask;

    fn open_floor(size: usize) -> GeometryIndex {
        GeometryIndex::new(GridMask::filled(size, size, true), 1.0).unwrap()
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        assert!(VisibilityConfig::new(0, 5.0).validate().is_err());
        assert!(VisibilityConfig::new(4, -1.0).validate().is_err());
        assert!(VisibilityConfig::new(4, 5.0)
            .with_step(0.0)
            .validate()
            .is_err());
        assert!(VisibilityConfig::default().validate().is_ok());
    }

    #[test]
    fn default_step_is_two_pixels() {
        let eval = VisibilityEvaluator::new(&VisibilityConfig::default(), 0.25).unwrap();
        assert_eq!(eval.step(), 0.5);
        assert_eq!(eval.rays(), 8);
    }

    #[test]
    fn open_space_reaches_max_range() {
        let geom = open_floor(41);
        let config = VisibilityConfig::new(8, 10.0).with_step(1.0);
        let eval = VisibilityEvaluator::new(&config, 1.0).unwrap();
        let v = eval.point_visibility(&geom, DVec2::new(20.5, 20.5));
        assert_eq!(v, 10.0);
    }

    #[test]
    fn obstacle_point_scores_zero() {
        let geom = GeometryIndex::new(GridMask::filled(5, 5, false), 1.0).unwrap();
        let eval = VisibilityEvaluator::new(&VisibilityConfig::new(4, 3.0), 1.0).unwrap();
        assert_eq!(eval.point_visibility(&geom, DVec2::new(2.0, 2.0)), 0.0);
    }

    #[test]
    fn boxed_point_sees_less_than_open_point() {
        // walkable everywhere except a ring at Chebyshev distance 2 around (10, 10)
        let mask = GridMask::from_fn(21, 21, |x, y| {
            let d = (x as i64 - 10).abs().max((y as i64 - 10).abs());
            d != 2
        });
        let geom = GeometryIndex::new(mask, 1.0).unwrap();
        let config = VisibilityConfig::new(16, 6.0).with_step(0.5);
        let eval = VisibilityEvaluator::new(&config, 1.0).unwrap();
        let boxed = eval.point_visibility(&geom, DVec2::new(10.5, 10.5));
        let open = eval.point_visibility(&open_floor(21), DVec2::new(10.5, 10.5));
        assert!(boxed < 3.0, "boxed visibility {boxed}");
        assert_eq!(open, 6.0);
        assert!(open >= boxed);
    }

    #[test]
    fn mean_over_points() {
        let geom = open_floor(30);
        let config = VisibilityConfig::new(4, 2.0).with_step(1.0);
        let eval = VisibilityEvaluator::new(&config, 1.0).unwrap();
        assert_eq!(eval.mean_visibility(&geom, &[]), 0.0);
        // corner point: two of four rays leave the grid at the first step
        let corner = eval.point_visibility(&geom, DVec2::new(0.5, 0.5));
        let centre = eval.point_visibility(&geom, DVec2::new(15.5, 15.5));
        assert_eq!(centre, 2.0);
        assert_eq!(
            eval.mean_visibility(&geom, &[DVec2::new(0.5, 0.5), DVec2::new(15.5, 15.5)]),
            (corner + centre) / 2.0
        );
    }
}
