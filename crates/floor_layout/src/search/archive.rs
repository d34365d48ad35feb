//! Feasible non-dominated solutions collected from a population.
use std::cmp::Ordering;
use std::collections::HashSet;

use glam::DVec2;

use crate::search::individual::{
    Individual, LayoutCandidate, Objective, ObjectiveVector, Population,
};
use crate::search::output::{SolutionRecord, SolutionSet};
use crate::search::Problem;

/// Smallest objective range used when min-max normalising.
const MIN_SPAN: f64 = 1e-12;

/// One archived solution with its decoded layout.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchiveEntry {
    pub candidate: LayoutCandidate,
    pub objectives: ObjectiveVector,
    /// Metric site positions in slot order.
    pub layout: Vec<DVec2>,
}

/// Top-K feasible, mutually non-dominated solutions ordered by a primary objective.
#[derive(Clone, Debug, Default)]
pub struct ParetoArchive {
    entries: Vec<ArchiveEntry>,
    primary: Objective,
}

impl ParetoArchive {
    pub fn from_population<P: Problem + ?Sized>(
        problem: &P,
        population: &Population,
        top_k: usize,
        primary: Objective,
    ) -> Self {
        Self::from_individuals(problem, population.iter(), top_k, primary)
    }

    /// Keeps feasible individuals, drops repeated site multisets and repeated objective
    /// vectors, removes dominated entries, sorts by `primary` and caps at `top_k`.
    pub fn from_individuals<'a, P, I>(
        problem: &P,
        individuals: I,
        top_k: usize,
        primary: Objective,
    ) -> Self
    where
        P: Problem + ?Sized,
        I: IntoIterator<Item = &'a Individual>,
    {
        let mut seen_candidates: HashSet<&LayoutCandidate> = HashSet::new();
        let mut seen_objectives: HashSet<[u64; 3]> = HashSet::new();
        let mut pool: Vec<&Individual> = Vec::new();
        for ind in individuals {
            if !ind.is_feasible() {
                continue;
            }
            if !seen_candidates.insert(&ind.candidate) {
                continue;
            }
            if !seen_objectives.insert(ind.objectives().0.map(f64::to_bits)) {
                continue;
            }
            pool.push(ind);
        }

        let front: Vec<&Individual> = pool
            .iter()
            .filter(|a| {
                !pool
                    .iter()
                    .any(|b| b.objectives().dominates(a.objectives()))
            })
            .copied()
            .collect();

        let mut entries: Vec<ArchiveEntry> = front
            .into_iter()
            .map(|ind| ArchiveEntry {
                candidate: ind.candidate.clone(),
                objectives: ind.evaluation.objectives,
                layout: problem.decode(&ind.candidate),
            })
            .collect();
        entries.sort_by(|a, b| entry_cmp(a, b, primary));
        entries.truncate(top_k);
        Self { entries, primary }
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn primary(&self) -> Objective {
        self.primary
    }

    /// Entry with the smallest primary objective.
    pub fn best(&self) -> Option<&ArchiveEntry> {
        self.entries.first()
    }

    pub fn objective_vectors(&self) -> Vec<ObjectiveVector> {
        self.entries.iter().map(|e| e.objectives).collect()
    }

    /// Entry closest to the ideal point after min-max normalisation.
    pub fn select_balanced(&self) -> Option<(usize, &ArchiveEntry)> {
        balanced_index(&self.objective_vectors()).map(|i| (i, &self.entries[i]))
    }

    /// Entry with the smallest weighted sum of normalised objectives.
    pub fn select_weighted(&self, weights: [f64; 3]) -> Option<(usize, &ArchiveEntry)> {
        weighted_index(&self.objective_vectors(), weights).map(|i| (i, &self.entries[i]))
    }

    pub fn to_solution_set(&self, meters_per_pixel: f64) -> SolutionSet {
        SolutionSet::new(
            meters_per_pixel,
            self.entries
                .iter()
                .map(|e| SolutionRecord::new(&e.layout, &e.objectives))
                .collect(),
        )
    }
}

fn entry_cmp(a: &ArchiveEntry, b: &ArchiveEntry, primary: Objective) -> Ordering {
    let mut ord = a
        .objectives
        .get(primary)
        .total_cmp(&b.objectives.get(primary));
    for objective in Objective::ALL {
        ord = ord.then_with(|| {
            a.objectives
                .get(objective)
                .total_cmp(&b.objectives.get(objective))
        });
    }
    ord.then_with(|| a.candidate.canonical().cmp(&b.candidate.canonical()))
}

/// Min-max normalises each objective to [0, 1] over `objectives`.
pub fn normalise(objectives: &[ObjectiveVector]) -> Vec<[f64; 3]> {
    let mut lo = [f64::INFINITY; 3];
    let mut hi = [f64::NEG_INFINITY; 3];
    for v in objectives {
        for m in 0..3 {
            lo[m] = lo[m].min(v.0[m]);
            hi[m] = hi[m].max(v.0[m]);
        }
    }
    objectives
        .iter()
        .map(|v| {
            let mut z = [0.0; 3];
            for m in 0..3 {
                z[m] = (v.0[m] - lo[m]) / (hi[m] - lo[m]).max(MIN_SPAN);
            }
            z
        })
        .collect()
}

/// Index minimising the Euclidean norm of the normalised objectives; first wins ties.
pub fn balanced_index(objectives: &[ObjectiveVector]) -> Option<usize> {
    argmin(
        normalise(objectives)
            .iter()
            .map(|z| (z[0] * z[0] + z[1] * z[1] + z[2] * z[2]).sqrt()),
    )
}

/// Index minimising `sum(weights * normalised objectives)`; first wins ties.
pub fn weighted_index(objectives: &[ObjectiveVector], weights: [f64; 3]) -> Option<usize> {
    argmin(
        normalise(objectives)
            .iter()
            .map(|z| z[0] * weights[0] + z[1] * weights[1] + z[2] * weights[2]),
    )
}

fn argmin(values: impl Iterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.enumerate() {
        match best {
            Some((_, b)) if v >= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
