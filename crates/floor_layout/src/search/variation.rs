//! Selection, crossover, mutation and repair over discrete site indices.
use std::collections::HashSet;

use rand::Rng;

use crate::random::{rand01, rand_index};
use crate::search::individual::{Individual, LayoutCandidate};

/// Attempts at drawing an unused site before falling back to a linear scan.
const MAX_REDRAWS: usize = 32;

/// Binary tournament on (rank, crowding distance); returns the winner's index.
pub fn binary_tournament(population: &[Individual], rng: &mut dyn Rng) -> usize {
    let n = population.len();
    let a = rand_index(rng, n);
    if n == 1 {
        return a;
    }
    let mut b = rand_index(rng, n - 1);
    if b >= a {
        b += 1;
    }

    let (pa, pb) = (&population[a], &population[b]);
    if pa.rank != pb.rank {
        return if pa.rank < pb.rank { a } else { b };
    }
    if pa.crowding != pb.crowding {
        return if pa.crowding > pb.crowding { a } else { b };
    }
    if rng.next_u32() & 1 == 0 {
        a
    } else {
        b
    }
}

/// Uniform crossover over slots with probability `rate`, followed by [`repair`].
///
/// Without crossover the children are copies of the parents.
pub fn uniform_crossover(
    a: &LayoutCandidate,
    b: &LayoutCandidate,
    rate: f64,
    site_count: usize,
    rng: &mut dyn Rng,
) -> (LayoutCandidate, LayoutCandidate) {
    let mut first = a.sites().to_vec();
    let mut second = b.sites().to_vec();
    if rand01(rng) < rate {
        for (x, y) in first.iter_mut().zip(second.iter_mut()) {
            if rng.next_u32() & 1 == 1 {
                std::mem::swap(x, y);
            }
        }
    }
    repair(&mut first, site_count, rng);
    repair(&mut second, site_count, rng);
    (LayoutCandidate::new(first), LayoutCandidate::new(second))
}

/// Per-slot mutation: each slot is replaced by a random site not already selected with
/// probability `rate`.
pub fn mutate(
    candidate: &mut LayoutCandidate,
    rate: f64,
    site_count: usize,
    rng: &mut dyn Rng,
) {
    let sites = candidate.sites_mut();
    if site_count <= sites.len() {
        return;
    }
    for slot in 0..sites.len() {
        if rand01(rng) >= rate {
            continue;
        }
        let used: HashSet<usize> = sites.iter().copied().collect();
        if let Some(site) = draw_unused(&used, site_count, rng) {
            sites[slot] = site;
        }
    }
}

/// Replaces repeated sites (keeping the first occurrence) with random unused ones.
///
/// Sites must stay distinct within a candidate; this is a no-op when there are not
/// enough sites to make them so.
pub fn repair(sites: &mut [usize], site_count: usize, rng: &mut dyn Rng) {
    if site_count < sites.len() {
        return;
    }
    let mut used = HashSet::with_capacity(sites.len());
    let mut duplicates = Vec::new();
    for (slot, &site) in sites.iter().enumerate() {
        if !used.insert(site) {
            duplicates.push(slot);
        }
    }
    for slot in duplicates {
        if let Some(site) = draw_unused(&used, site_count, rng) {
            sites[slot] = site;
            used.insert(site);
        }
    }
}

fn draw_unused(used: &HashSet<usize>, site_count: usize, rng: &mut dyn Rng) -> Option<usize> {
    for _ in 0..MAX_REDRAWS {
        let site = rand_index(rng, site_count);
        if !used.contains(&site) {
            return Some(site);
        }
    }
    let start = rand_index(rng, site_count);
    (0..site_count)
        .map(|k| (start + k) % site_count)
        .find(|s| !used.contains(s))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::search::individual::{Evaluation, Feasibility, ObjectiveVector};

    fn individual(rank: usize, crowding: f64) -> Individual {
        let mut ind = Individual::new(
            LayoutCandidate::new(vec![0]),
            Evaluation::new(ObjectiveVector::new(0.0, 0.0, 0.0), Feasibility::Feasible),
        );
        ind.rank = rank;
        ind.crowding = crowding;
        ind
    }

    #[test]
    fn tournament_prefers_lower_rank() {
        let pop = vec![individual(3, 1.0), individual(0, 0.0)];
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(binary_tournament(&pop, &mut rng), 1);
        }
    }

    #[test]
    fn tournament_uses_crowding_within_rank() {
        let pop = vec![individual(0, f64::INFINITY), individual(0, 0.2)];
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..20 {
            assert_eq!(binary_tournament(&pop, &mut rng), 0);
        }
    }

    #[test]
    fn repair_removes_duplicates() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut sites = vec![4, 4, 2, 4];
        repair(&mut sites, 6, &mut rng);
        assert_eq!(sites[0], 4);
        assert_eq!(sites[2], 2);
        assert!(LayoutCandidate::new(sites).is_distinct());
    }

    #[test]
    fn repair_fills_tight_pool() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut sites = vec![1, 1, 1];
        repair(&mut sites, 3, &mut rng);
        let mut sorted = sites.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
    }

    #[test]
    fn crossover_children_stay_distinct() {
        let mut rng = StdRng::seed_from_u64(13);
        let a = LayoutCandidate::new(vec![0, 1, 2, 3]);
        let b = LayoutCandidate::new(vec![3, 2, 1, 0]);
        for _ in 0..50 {
            let (c, d) = uniform_crossover(&a, &b, 1.0, 10, &mut rng);
            assert!(c.is_distinct());
            assert!(d.is_distinct());
            assert_eq!(c.len(), 4);
        }
    }

    #[test]
    fn crossover_rate_zero_copies_parents() {
        let mut rng = StdRng::seed_from_u64(21);
        let a = LayoutCandidate::new(vec![0, 1]);
        let b = LayoutCandidate::new(vec![5, 6]);
        let (c, d) = uniform_crossover(&a, &b, 0.0, 10, &mut rng);
        assert_eq!(c.sites(), a.sites());
        assert_eq!(d.sites(), b.sites());
    }

    #[test]
    fn mutation_keeps_candidates_distinct() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut candidate = LayoutCandidate::new(vec![0, 1, 2]);
        mutate(&mut candidate, 1.0, 4, &mut rng);
        assert!(candidate.is_distinct());
        assert!(candidate.sites().iter().all(|&s| s < 4));

        let mut full = LayoutCandidate::new(vec![0, 1, 2]);
        mutate(&mut full, 1.0, 3, &mut rng);
        assert_eq!(full.sites(), &[0, 1, 2]);
    }
}
