//! Flat run configuration, deserialisable from the same `config.json` keys the layout
//! tools read.
use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::SiteSampling;
use crate::nav::Centrality;
use crate::objectives::VisibilityConfig;
use crate::search::SearchConfig;

/// Everything needed to prepare a [`crate::objectives::LayoutProblem`] and run a search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Metres per mask pixel.
    pub meters_per_pixel: f64,
    /// Objects to place.
    pub num_objects: usize,
    /// Entrance positions in metres.
    pub entrances: Vec<[f64; 2]>,
    /// Minimum distance between placed objects, in metres.
    #[serde(default = "defaults::min_clearance_m")]
    pub min_clearance_m: f64,
    /// Minimum distance between an object and the nearest obstacle, in metres.
    #[serde(default = "defaults::min_obj_to_wall_m")]
    pub min_obj_to_wall_m: f64,
    /// Navigation graph lattice step, in pixels.
    #[serde(default = "defaults::stride_px")]
    pub graph_step_px: usize,
    /// Candidate site sampling stride, in pixels.
    #[serde(default = "defaults::stride_px")]
    pub site_stride_px: usize,
    #[serde(default = "defaults::vis_rays")]
    pub vis_rays: usize,
    #[serde(default = "defaults::vis_range_m")]
    pub vis_range_m: f64,
    /// Ray-march step; defaults to two pixels.
    #[serde(default)]
    pub vis_step_m: Option<f64>,
    #[serde(default = "defaults::pop_size")]
    pub pop_size: usize,
    #[serde(default = "defaults::n_generations")]
    pub n_generations: usize,
    /// `0` disables checkpoints.
    #[serde(default = "defaults::checkpoint_every")]
    pub checkpoint_every: usize,
    #[serde(default = "defaults::seed")]
    pub seed: u64,
    #[serde(default = "defaults::top_k")]
    pub top_k: usize,
    #[serde(default = "defaults::crossover_rate")]
    pub crossover_rate: f64,
    /// Per-slot mutation probability; defaults to `1 / num_objects`.
    #[serde(default)]
    pub mutation_rate: Option<f64>,
    #[serde(default = "defaults::init_retry_factor")]
    pub init_retry_factor: usize,
    #[serde(default)]
    pub centrality: Centrality,
}

mod defaults {
    pub fn min_clearance_m() -> f64 {
        0.6
    }
    pub fn min_obj_to_wall_m() -> f64 {
        3.0
    }
    pub fn stride_px() -> usize {
        6
    }
    pub fn vis_rays() -> usize {
        8
    }
    pub fn vis_range_m() -> f64 {
        12.0
    }
    pub fn pop_size() -> usize {
        48
    }
    pub fn n_generations() -> usize {
        160
    }
    pub fn checkpoint_every() -> usize {
        10
    }
    pub fn seed() -> u64 {
        42
    }
    pub fn top_k() -> usize {
        50
    }
    pub fn crossover_rate() -> f64 {
        0.9
    }
    pub fn init_retry_factor() -> usize {
        50
    }
}

impl LayoutConfig {
    /// Creates a configuration with default tuning for the given scale, object count and
    /// entrances.
    pub fn new(meters_per_pixel: f64, num_objects: usize, entrances: &[DVec2]) -> Self {
        Self {
            meters_per_pixel,
            num_objects,
            entrances: entrances.iter().map(|e| e.to_array()).collect(),
            min_clearance_m: defaults::min_clearance_m(),
            min_obj_to_wall_m: defaults::min_obj_to_wall_m(),
            graph_step_px: defaults::stride_px(),
            site_stride_px: defaults::stride_px(),
            vis_rays: defaults::vis_rays(),
            vis_range_m: defaults::vis_range_m(),
            vis_step_m: None,
            pop_size: defaults::pop_size(),
            n_generations: defaults::n_generations(),
            checkpoint_every: defaults::checkpoint_every(),
            seed: defaults::seed(),
            top_k: defaults::top_k(),
            crossover_rate: defaults::crossover_rate(),
            mutation_rate: None,
            init_retry_factor: defaults::init_retry_factor(),
            centrality: Centrality::Degree,
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_min_clearance(mut self, min_clearance_m: f64) -> Self {
        self.min_clearance_m = min_clearance_m;
        self
    }

    pub fn with_min_wall_clearance(mut self, min_obj_to_wall_m: f64) -> Self {
        self.min_obj_to_wall_m = min_obj_to_wall_m;
        self
    }

    pub fn with_strides(mut self, graph_step_px: usize, site_stride_px: usize) -> Self {
        self.graph_step_px = graph_step_px;
        self.site_stride_px = site_stride_px;
        self
    }

    pub fn with_search(mut self, pop_size: usize, n_generations: usize) -> Self {
        self.pop_size = pop_size;
        self.n_generations = n_generations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_centrality(mut self, centrality: Centrality) -> Self {
        self.centrality = centrality;
        self
    }

    pub fn entrance_points(&self) -> Vec<DVec2> {
        self.entrances.iter().map(|&e| DVec2::from_array(e)).collect()
    }

    pub fn site_sampling(&self) -> SiteSampling {
        SiteSampling::new(self.site_stride_px, self.min_obj_to_wall_m)
    }

    pub fn visibility_config(&self) -> VisibilityConfig {
        let config = VisibilityConfig::new(self.vis_rays, self.vis_range_m);
        match self.vis_step_m {
            Some(step) => config.with_step(step),
            None => config,
        }
    }

    pub fn search_config(&self) -> SearchConfig {
        let mut config = SearchConfig::new(self.pop_size, self.n_generations)
            .with_crossover_rate(self.crossover_rate)
            .with_init_retry_factor(self.init_retry_factor)
            .with_checkpoint_every(self.checkpoint_every)
            .with_top_k(self.top_k)
            .with_seed(self.seed);
        if let Some(rate) = self.mutation_rate {
            config = config.with_mutation_rate(rate);
        }
        config
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.meters_per_pixel.is_finite() || self.meters_per_pixel <= 0.0 {
            return Err(Error::InvalidConfig(
                "meters_per_pixel must be finite and > 0".into(),
            ));
        }
        if self.num_objects == 0 {
            return Err(Error::InvalidConfig("num_objects must be > 0".into()));
        }
        if self.entrances.is_empty() {
            return Err(Error::NoEntrances);
        }
        if !self.min_clearance_m.is_finite() || self.min_clearance_m < 0.0 {
            return Err(Error::InvalidConfig(
                "min_clearance_m must be finite and >= 0".into(),
            ));
        }
        if self.graph_step_px == 0 {
            return Err(Error::InvalidConfig("graph_step_px must be > 0".into()));
        }
        self.site_sampling().validate()?;
        self.visibility_config().validate()?;
        self.search_config().validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_uses_defaults() {
        let config = LayoutConfig::from_json_str(
            r#"{"meters_per_pixel": 0.05, "num_objects": 6, "entrances": [[1.0, 2.0]]}"#,
        )
        .unwrap();
        assert_eq!(config.min_clearance_m, 0.6);
        assert_eq!(config.min_obj_to_wall_m, 3.0);
        assert_eq!(config.graph_step_px, 6);
        assert_eq!(config.vis_rays, 8);
        assert_eq!(config.pop_size, 48);
        assert_eq!(config.n_generations, 160);
        assert_eq!(config.centrality, Centrality::Degree);
        assert_eq!(config.entrance_points(), vec![DVec2::new(1.0, 2.0)]);
        assert_eq!(config.search_config().mutation_rate_for(6), 1.0 / 6.0);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = LayoutConfig::from_json_str(
            r#"{"meters_per_pixel": 1, "num_objects": 2, "entrances": [[0, 0]],
                "walkable_png": "floor.png", "vis_step_m": 0.5,
                "centrality": {"betweenness": {"samples": 64, "seed": 3}}}"#,
        )
        .unwrap();
        assert_eq!(config.visibility_config().step_m, Some(0.5));
        assert_eq!(
            config.centrality,
            Centrality::Betweenness {
                samples: Some(64),
                seed: 3
            }
        );
    }

    #[test]
    fn validation_rejects_degenerate_settings() {
        let base = LayoutConfig::new(0.1, 3, &[DVec2::ZERO]);
        assert!(base.validate().is_ok());
        assert!(matches!(
            LayoutConfig::new(0.1, 3, &[]).validate(),
            Err(Error::NoEntrances)
        ));
        assert!(LayoutConfig::new(0.0, 3, &[DVec2::ZERO]).validate().is_err());
        assert!(LayoutConfig::new(0.1, 0, &[DVec2::ZERO]).validate().is_err());
        assert!(base.clone().with_strides(0, 6).validate().is_err());
        assert!(base.clone().with_search(0, 10).validate().is_err());
        assert!(base.with_min_clearance(-1.0).validate().is_err());
    }

    #[test]
    fn missing_required_key_is_an_error() {
        assert!(LayoutConfig::from_json_str(r#"{"meters_per_pixel": 1.0}"#).is_err());
    }
}
