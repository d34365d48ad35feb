//! Serialisable solution sets, as written to `layouts.json` and checkpoint files.
use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::search::archive::{balanced_index, weighted_index};
use crate::search::individual::ObjectiveVector;

/// Objective values of one solution under their on-disk names.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub distance: f64,
    pub neg_visibility: f64,
    pub congestion_proxy: f64,
}

impl From<&ObjectiveVector> for ScoreRecord {
    fn from(v: &ObjectiveVector) -> Self {
        Self {
            distance: v.distance(),
            neg_visibility: v.negative_visibility(),
            congestion_proxy: v.congestion(),
        }
    }
}

impl From<ScoreRecord> for ObjectiveVector {
    fn from(s: ScoreRecord) -> Self {
        ObjectiveVector::new(s.distance, s.neg_visibility, s.congestion_proxy)
    }
}

/// A layout as metric `[x, y]` points plus its scores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolutionRecord {
    pub layout: Vec<[f64; 2]>,
    pub scores: ScoreRecord,
}

impl SolutionRecord {
    pub fn new(layout: &[DVec2], objectives: &ObjectiveVector) -> Self {
        Self {
            layout: layout.iter().map(|p| p.to_array()).collect(),
            scores: objectives.into(),
        }
    }

    pub fn points(&self) -> Vec<DVec2> {
        self.layout.iter().map(|&p| DVec2::from_array(p)).collect()
    }
}

/// Ordered solutions together with the scale they were computed at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolutionSet {
    pub meters_per_pixel: f64,
    /// Generation the set was captured at; absent for final results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<usize>,
    pub solutions: Vec<SolutionRecord>,
}

impl SolutionSet {
    pub fn new(meters_per_pixel: f64, solutions: Vec<SolutionRecord>) -> Self {
        Self {
            meters_per_pixel,
            generation: None,
            solutions,
        }
    }

    pub fn with_generation(mut self, generation: usize) -> Self {
        self.generation = Some(generation);
        self
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn objective_vectors(&self) -> Vec<ObjectiveVector> {
        self.solutions.iter().map(|s| s.scores.into()).collect()
    }

    /// The solution nearest the normalised ideal point, if any.
    pub fn select_balanced(&self) -> Option<BestLayout> {
        balanced_index(&self.objective_vectors()).map(|i| self.pick(i))
    }

    /// The solution with the smallest weighted normalised score, if any.
    pub fn select_weighted(&self, weights: [f64; 3]) -> Option<BestLayout> {
        weighted_index(&self.objective_vectors(), weights).map(|i| self.pick(i))
    }

    fn pick(&self, index: usize) -> BestLayout {
        let chosen = &self.solutions[index];
        BestLayout {
            layout: chosen.layout.clone(),
            scores: chosen.scores,
            meters_per_pixel: Some(self.meters_per_pixel),
            index_in_pareto: Some(index),
            num_solutions: Some(self.solutions.len()),
        }
    }
}

/// A single chosen layout, as written to `best_layout.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BestLayout {
    pub layout: Vec<[f64; 2]>,
    pub scores: ScoreRecord,
    #[serde(default)]
    pub meters_per_pixel: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_in_pareto: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_solutions: Option<usize>,
}

impl BestLayout {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
