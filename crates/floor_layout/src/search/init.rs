//! Initial population construction and random feasible sampling.
use std::collections::HashSet;

use rand::Rng;
use tracing::debug;

use crate::random::{rand_index, sample_distinct, shuffle};
use crate::search::individual::LayoutCandidate;
use crate::search::Problem;

/// Default try budget of [`random_feasible_candidate`].
pub const DEFAULT_FEASIBLE_TRIES: usize = 5000;

/// One greedy pass over a random permutation of all sites, admitting a site only if it
/// keeps clearance to everything already chosen. `None` if fewer than `N` sites fit.
pub fn greedy_feasible<P: Problem + ?Sized>(
    problem: &P,
    rng: &mut dyn Rng,
) -> Option<LayoutCandidate> {
    let target = problem.object_count();
    let mut order: Vec<usize> = (0..problem.site_count()).collect();
    shuffle(&mut order, rng);

    let mut chosen: Vec<usize> = Vec::with_capacity(target);
    for site in order {
        if chosen.len() == target {
            break;
        }
        if chosen.iter().all(|&c| problem.sites_compatible(site, c)) {
            chosen.push(site);
        }
    }
    (chosen.len() == target).then(|| LayoutCandidate::new(chosen))
}

/// `N` distinct uniformly random sites, feasible or not.
pub fn random_candidate<P: Problem + ?Sized>(
    problem: &P,
    rng: &mut dyn Rng,
) -> LayoutCandidate {
    LayoutCandidate::new(sample_distinct(
        rng,
        problem.site_count(),
        problem.object_count(),
    ))
}

/// Builds `size` distinct initial candidates.
///
/// Up to `size * retry_factor` greedy feasible constructions are attempted; whatever is
/// still missing afterwards is filled with random (possibly infeasible) candidates.
pub fn initial_candidates<P: Problem + ?Sized>(
    problem: &P,
    size: usize,
    retry_factor: usize,
    rng: &mut dyn Rng,
) -> Vec<LayoutCandidate> {
    let mut seen: HashSet<LayoutCandidate> = HashSet::with_capacity(size);
    let mut out = Vec::with_capacity(size);

    let budget = size.saturating_mul(retry_factor);
    let mut tries = 0;
    while out.len() < size && tries < budget {
        tries += 1;
        if let Some(candidate) = greedy_feasible(problem, rng) {
            if seen.insert(candidate.clone()) {
                out.push(candidate);
            }
        }
    }
    let greedy = out.len();

    let mut fill_tries = 0;
    while out.len() < size {
        let candidate = random_candidate(problem, rng);
        fill_tries += 1;
        // Tiny site pools may not have `size` distinct selections.
        if seen.insert(candidate.clone()) || fill_tries > budget.max(size) {
            out.push(candidate);
        }
    }

    debug!(
        "Initial population: {} greedy feasible, {} random fill ({} greedy tries).",
        greedy,
        out.len() - greedy,
        tries
    );
    out
}

/// Rejection-samples one feasible candidate, drawing one site per try.
///
/// Returns `None` when `max_tries` draws are not enough to place all objects.
pub fn random_feasible_candidate<P: Problem + ?Sized>(
    problem: &P,
    max_tries: usize,
    rng: &mut dyn Rng,
) -> Option<LayoutCandidate> {
    let target = problem.object_count();
    let site_count = problem.site_count();
    if site_count == 0 {
        return None;
    }
    let mut chosen: Vec<usize> = Vec::with_capacity(target);
    let mut tries = 0;
    while chosen.len() < target && tries < max_tries {
        tries += 1;
        let site = rand_index(rng, site_count);
        if chosen
            .iter()
            .all(|&c| c != site && problem.sites_compatible(site, c))
        {
            chosen.push(site);
        }
    }
    (chosen.len() == target).then(|| LayoutCandidate::new(chosen))
}

#[cfg(test)]
mod tests {
    use glam::DVec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::search::individual::{Evaluation, Feasibility, ObjectiveVector};

    /// Sites on a line, one metre apart.
    struct LineProblem {
        sites: usize,
        objects: usize,
        clearance: f64,
    }

    impl Problem for LineProblem {
        fn object_count(&self) -> usize {
            self.objects
        }

        fn site_count(&self) -> usize {
            self.sites
        }

        fn site_position(&self, site: usize) -> DVec2 {
            DVec2::new(site as f64, 0.0)
        }

        fn min_clearance(&self) -> f64 {
            self.clearance
        }

        fn evaluate(&self, candidate: &LayoutCandidate) -> Evaluation {
            let feasible = self.is_feasible(candidate);
            Evaluation::new(
                ObjectiveVector::new(0.0, 0.0, 0.0),
                if feasible {
                    Feasibility::Feasible
                } else {
                    Feasibility::Infeasible
                },
            )
        }
    }

    #[test]
    fn greedy_respects_clearance() {
        let problem = LineProblem {
            sites: 20,
            objects: 4,
            clearance: 3.0,
        };
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..20 {
            if let Some(c) = greedy_feasible(&problem, &mut rng) {
                assert!(problem.is_feasible(&c));
                assert!(c.is_distinct());
            }
        }
    }

    #[test]
    fn greedy_fails_when_impossible() {
        let problem = LineProblem {
            sites: 5,
            objects: 3,
            clearance: 10.0,
        };
        let mut rng = StdRng::seed_from_u64(4);
        assert!(greedy_feasible(&problem, &mut rng).is_none());
        assert!(random_feasible_candidate(&problem, 100, &mut rng).is_none());
    }

    #[test]
    fn initial_candidates_are_distinct_and_full() {
        let problem = LineProblem {
            sites: 30,
            objects: 3,
            clearance: 2.0,
        };
        let mut rng = StdRng::seed_from_u64(8);
        let candidates = initial_candidates(&problem, 16, 50, &mut rng);
        assert_eq!(candidates.len(), 16);
        let unique: HashSet<_> = candidates.iter().cloned().collect();
        assert_eq!(unique.len(), 16);
        assert!(candidates.iter().all(|c| problem.is_feasible(c)));
    }

    #[test]
    fn initial_candidates_fall_back_to_random_fill() {
        let problem = LineProblem {
            sites: 4,
            objects: 2,
            clearance: 100.0,
        };
        let mut rng = StdRng::seed_from_u64(8);
        let candidates = initial_candidates(&problem, 10, 2, &mut rng);
        assert_eq!(candidates.len(), 10);
        assert!(candidates.iter().all(|c| c.is_distinct() && c.len() == 2));
    }

    #[test]
    fn random_feasible_candidate_is_feasible() {
        let problem = LineProblem {
            sites: 50,
            objects: 5,
            clearance: 4.0,
        };
        let mut rng = StdRng::seed_from_u64(15);
        let c = random_feasible_candidate(&problem, DEFAULT_FEASIBLE_TRIES, &mut rng).unwrap();
        assert!(problem.is_feasible(&c));
    }
}
