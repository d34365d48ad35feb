//! Constrained non-dominated sorting and crowding distance.
//!
//! Feasible evaluations always occupy the first fronts. Infeasible ones are grouped by
//! constraint violation (smaller first) and Pareto-sorted inside each group; their front
//! indices continue after the last front of the preceding group.
use std::cmp::Ordering;

use crate::search::individual::{Evaluation, Individual};

/// Front index and crowding distance of one evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankInfo {
    pub rank: usize,
    pub crowding: f64,
}

/// Ranks `evaluations`; the result is index-aligned with the input.
pub fn rank(evaluations: &[Evaluation]) -> Vec<RankInfo> {
    let mut info = vec![
        RankInfo {
            rank: usize::MAX,
            crowding: 0.0,
        };
        evaluations.len()
    ];

    let mut order: Vec<usize> = (0..evaluations.len()).collect();
    order.sort_by(|&a, &b| {
        evaluations[a]
            .feasibility
            .violation()
            .total_cmp(&evaluations[b].feasibility.violation())
            .then(a.cmp(&b))
    });

    let mut next_rank = 0;
    let mut start = 0;
    while start < order.len() {
        let violation = evaluations[order[start]].feasibility.violation();
        let mut end = start + 1;
        while end < order.len() && evaluations[order[end]].feasibility.violation() == violation {
            end += 1;
        }

        let fronts = non_dominated_fronts(evaluations, &order[start..end]);
        for front in &fronts {
            let distances = crowding_distances(evaluations, front);
            for (&i, d) in front.iter().zip(distances) {
                info[i] = RankInfo {
                    rank: next_rank,
                    crowding: d,
                };
            }
            next_rank += 1;
        }
        start = end;
    }
    info
}

/// Fast non-dominated sort of `members` (indices into `evaluations`).
fn non_dominated_fronts(evaluations: &[Evaluation], members: &[usize]) -> Vec<Vec<usize>> {
    let n = members.len();
    let mut dominated_by_count = vec![0usize; n];
    let mut dominates: Vec<Vec<usize>> = vec![Vec::new(); n];

    for p in 0..n {
        let op = &evaluations[members[p]].objectives;
        for q in (p + 1)..n {
            let oq = &evaluations[members[q]].objectives;
            if op.dominates(oq) {
                dominates[p].push(q);
                dominated_by_count[q] += 1;
            } else if oq.dominates(op) {
                dominates[q].push(p);
                dominated_by_count[p] += 1;
            }
        }
    }

    let mut fronts = Vec::new();
    let mut current: Vec<usize> = (0..n).filter(|&p| dominated_by_count[p] == 0).collect();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &p in &current {
            for &q in &dominates[p] {
                dominated_by_count[q] -= 1;
                if dominated_by_count[q] == 0 {
                    next.push(q);
                }
            }
        }
        next.sort_unstable();
        fronts.push(current.iter().map(|&p| members[p]).collect());
        current = next;
    }
    fronts
}

/// Crowding distance of every member of a front, aligned with `front`.
fn crowding_distances(evaluations: &[Evaluation], front: &[usize]) -> Vec<f64> {
    let n = front.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let mut distance = vec![0.0; n];
    let mut order: Vec<usize> = (0..n).collect();
    for m in 0..3 {
        let value = |k: usize| evaluations[front[k]].objectives.0[m];
        order.sort_by(|&a, &b| value(a).total_cmp(&value(b)).then(front[a].cmp(&front[b])));

        let lo = value(order[0]);
        let hi = value(order[n - 1]);
        distance[order[0]] = f64::INFINITY;
        distance[order[n - 1]] = f64::INFINITY;
        let span = hi - lo;
        if span <= 0.0 {
            continue;
        }
        for w in 1..n - 1 {
            let k = order[w];
            if distance[k].is_finite() {
                distance[k] += (value(order[w + 1]) - value(order[w - 1])) / span;
            }
        }
    }
    distance
}

/// Crowded-comparison order: lower rank first, then larger crowding distance.
#[inline]
pub fn crowded_cmp(a: &RankInfo, b: &RankInfo) -> Ordering {
    a.rank
        .cmp(&b.rank)
        .then_with(|| b.crowding.total_cmp(&a.crowding))
}

/// Writes ranking results back onto a population.
pub fn assign_ranks(individuals: &mut [Individual]) {
    let evaluations: Vec<Evaluation> = individuals.iter().map(|i| i.evaluation).collect();
    for (ind, info) in individuals.iter_mut().zip(rank(&evaluations)) {
        ind.rank = info.rank;
        ind.crowding = info.crowding;
    }
}

/// Ranks `individuals` and keeps the best `size` of them by crowded comparison.
///
/// Ties are broken by the original position, so the result is deterministic.
pub fn truncate(mut individuals: Vec<Individual>, size: usize) -> Vec<Individual> {
    assign_ranks(&mut individuals);
    let mut order: Vec<usize> = (0..individuals.len()).collect();
    order.sort_by(|&a, &b| {
        let ia = &individuals[a];
        let ib = &individuals[b];
        ia.rank
            .cmp(&ib.rank)
            .then_with(|| ib.crowding.total_cmp(&ia.crowding))
            .then(a.cmp(&b))
    });
    order.truncate(size);

    let mut slots: Vec<Option<Individual>> = individuals.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}
