//! Genome, objective vector and population records.
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// An ordered selection of site indices, one per object slot.
///
/// Slot order is kept for crossover, but two candidates compare (and hash) equal iff they
/// select the same multiset of sites.
#[derive(Clone, Debug)]
pub struct LayoutCandidate {
    sites: Vec<usize>,
}

impl LayoutCandidate {
    pub fn new(sites: Vec<usize>) -> Self {
        Self { sites }
    }

    /// Site index per slot, in slot order.
    pub fn sites(&self) -> &[usize] {
        &self.sites
    }

    pub fn sites_mut(&mut self) -> &mut [usize] {
        &mut self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Sorted copy of the selected sites.
    pub fn canonical(&self) -> Vec<usize> {
        let mut sorted = self.sites.clone();
        sorted.sort_unstable();
        sorted
    }

    /// `true` if every slot holds a different site.
    pub fn is_distinct(&self) -> bool {
        let sorted = self.canonical();
        sorted.windows(2).all(|w| w[0] != w[1])
    }

    pub fn into_sites(self) -> Vec<usize> {
        self.sites
    }
}

impl From<Vec<usize>> for LayoutCandidate {
    fn from(sites: Vec<usize>) -> Self {
        Self::new(sites)
    }
}

impl PartialEq for LayoutCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.sites.len() == other.sites.len() && self.canonical() == other.canonical()
    }
}

impl Eq for LayoutCandidate {}

impl Hash for LayoutCandidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

/// Index of an objective inside an [`ObjectiveVector`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    Distance,
    NegativeVisibility,
    Congestion,
}

impl Objective {
    pub const ALL: [Objective; 3] = [
        Objective::Distance,
        Objective::NegativeVisibility,
        Objective::Congestion,
    ];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Objective::Distance => 0,
            Objective::NegativeVisibility => 1,
            Objective::Congestion => 2,
        }
    }
}

/// `(distance, negative visibility, congestion)`, all minimised.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectiveVector(pub [f64; 3]);

impl ObjectiveVector {
    pub fn new(distance: f64, negative_visibility: f64, congestion: f64) -> Self {
        Self([distance, negative_visibility, congestion])
    }

    pub fn distance(&self) -> f64 {
        self.0[0]
    }

    pub fn negative_visibility(&self) -> f64 {
        self.0[1]
    }

    pub fn congestion(&self) -> f64 {
        self.0[2]
    }

    #[inline]
    pub fn get(&self, objective: Objective) -> f64 {
        self.0[objective.index()]
    }

    pub fn as_array(&self) -> &[f64; 3] {
        &self.0
    }

    /// Pareto dominance: no worse in every objective and strictly better in one.
    pub fn dominates(&self, other: &ObjectiveVector) -> bool {
        let mut strictly_better = false;
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            if a > b {
                return false;
            }
            if a < b {
                strictly_better = true;
            }
        }
        strictly_better
    }
}

/// Outcome of the pairwise clearance check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feasibility {
    Feasible,
    Infeasible,
}

impl Feasibility {
    pub fn is_feasible(self) -> bool {
        matches!(self, Feasibility::Feasible)
    }

    /// Constraint violation; feasible iff `<= 0`.
    pub fn violation(self) -> f64 {
        match self {
            Feasibility::Feasible => 0.0,
            Feasibility::Infeasible => 1.0,
        }
    }

    /// `0` for feasible, `1` for infeasible.
    pub fn flag(self) -> u8 {
        match self {
            Feasibility::Feasible => 0,
            Feasibility::Infeasible => 1,
        }
    }
}

/// Objectives and feasibility of one candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub objectives: ObjectiveVector,
    pub feasibility: Feasibility,
}

impl Evaluation {
    pub fn new(objectives: ObjectiveVector, feasibility: Feasibility) -> Self {
        Self {
            objectives,
            feasibility,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.feasibility.is_feasible()
    }
}

/// An evaluated candidate with its position in the constrained ranking.
#[derive(Clone, Debug)]
pub struct Individual {
    pub candidate: LayoutCandidate,
    pub evaluation: Evaluation,
    /// Front index; `0` is the best front.
    pub rank: usize,
    /// Crowding distance within the front; boundary points are infinite.
    pub crowding: f64,
}

impl Individual {
    pub fn new(candidate: LayoutCandidate, evaluation: Evaluation) -> Self {
        Self {
            candidate,
            evaluation,
            rank: usize::MAX,
            crowding: 0.0,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.evaluation.is_feasible()
    }

    pub fn objectives(&self) -> &ObjectiveVector {
        &self.evaluation.objectives
    }
}

/// A generation's worth of ranked individuals.
#[derive(Clone, Debug, Default)]
pub struct Population {
    members: Vec<Individual>,
}

impl Population {
    pub fn new(members: Vec<Individual>) -> Self {
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Individual] {
        &self.members
    }

    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.members.iter()
    }

    pub fn feasible(&self) -> impl Iterator<Item = &Individual> {
        self.members.iter().filter(|i| i.is_feasible())
    }

    pub fn feasible_count(&self) -> usize {
        self.feasible().count()
    }

    pub fn into_members(self) -> Vec<Individual> {
        self.members
    }
}
