//! The generational NSGA-II loop.
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::search::archive::ParetoArchive;
use crate::search::checkpoint::CheckpointSink;
use crate::search::events::{EventSink, SearchEvent, SearchEventKind};
use crate::search::individual::{Individual, LayoutCandidate, Objective, Population};
use crate::search::init::initial_candidates;
use crate::search::ranking::truncate;
use crate::search::variation::{binary_tournament, mutate, uniform_crossover};
use crate::search::Problem;

/// Offspring draws allowed per slot before duplicates are accepted.
const OFFSPRING_RETRY_FACTOR: usize = 10;

/// Configuration for a search run.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Individuals kept per generation.
    pub population_size: usize,
    /// Offspring generations after the initial population.
    pub generations: usize,
    /// Probability that a parent pair is recombined.
    pub crossover_rate: f64,
    /// Per-slot mutation probability; `None` means `1 / object_count`.
    pub mutation_rate: Option<f64>,
    /// Greedy feasible construction attempts per initial individual.
    pub init_retry_factor: usize,
    /// Checkpoint interval in generations; `0` disables checkpoints.
    pub checkpoint_every: usize,
    /// Maximum number of archived solutions.
    pub top_k: usize,
    /// Objective the archive is ordered by.
    pub primary: Objective,
    /// Seed for every random decision of the run.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: 48,
            generations: 160,
            crossover_rate: 0.9,
            mutation_rate: None,
            init_retry_factor: 50,
            checkpoint_every: 10,
            top_k: 50,
            primary: Objective::Distance,
            seed: 42,
        }
    }
}

impl SearchConfig {
    /// Creates a new [`SearchConfig`] with the given population size and generation budget.
    pub fn new(population_size: usize, generations: usize) -> Self {
        Self {
            population_size,
            generations,
            ..Default::default()
        }
    }

    pub fn with_crossover_rate(mut self, crossover_rate: f64) -> Self {
        self.crossover_rate = crossover_rate;
        self
    }

    pub fn with_mutation_rate(mut self, mutation_rate: f64) -> Self {
        self.mutation_rate = Some(mutation_rate);
        self
    }

    pub fn with_init_retry_factor(mut self, init_retry_factor: usize) -> Self {
        self.init_retry_factor = init_retry_factor;
        self
    }

    pub fn with_checkpoint_every(mut self, checkpoint_every: usize) -> Self {
        self.checkpoint_every = checkpoint_every;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_primary(mut self, primary: Objective) -> Self {
        self.primary = primary;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Effective per-slot mutation probability for `object_count` slots.
    pub fn mutation_rate_for(&self, object_count: usize) -> f64 {
        self.mutation_rate
            .unwrap_or(1.0 / object_count.max(1) as f64)
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::InvalidConfig("pop_size must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(Error::InvalidConfig(
                "crossover_rate must be within [0, 1]".into(),
            ));
        }
        if let Some(rate) = self.mutation_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(Error::InvalidConfig(
                    "mutation_rate must be within [0, 1]".into(),
                ));
            }
        }
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be > 0".into()));
        }
        Ok(())
    }
}

/// Lifecycle of a [`SearchEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, not yet run.
    Idle,
    /// Generations are being produced.
    Running,
    /// The generation loop has stopped; the archive is being built.
    Draining,
    /// The run is over; the engine cannot be run again.
    Finished,
}

/// Result of a search run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The final ranked population.
    pub population: Population,
    /// Feasible non-dominated solutions of the final population.
    pub archive: ParetoArchive,
    /// Offspring generations actually produced.
    pub generations: usize,
    /// Total number of candidate evaluations.
    pub evaluations: usize,
    /// `true` if the stop flag ended the run early.
    pub cancelled: bool,
}

/// Runs NSGA-II with constrained ranking over a [`Problem`].
pub struct SearchEngine<'a, P: Problem + ?Sized> {
    problem: &'a P,
    config: SearchConfig,
    rng: StdRng,
    state: EngineState,
    stop: Option<Arc<AtomicBool>>,
}

impl<'a, P: Problem + ?Sized> SearchEngine<'a, P> {
    /// Validates `config` against `problem`.
    ///
    /// Fails before any generation runs if the configuration is invalid or the problem has
    /// fewer sites than objects.
    pub fn new(problem: &'a P, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        if problem.object_count() == 0 {
            return Err(Error::InvalidConfig("num_objects must be > 0".into()));
        }
        if problem.site_count() < problem.object_count() {
            return Err(Error::InsufficientSites {
                required: problem.object_count(),
                available: problem.site_count(),
            });
        }
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            problem,
            config,
            rng,
            state: EngineState::Idle,
            stop: None,
        })
    }

    /// Installs a cooperative stop flag, checked between generations.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Runs the search without events or checkpoints.
    pub fn run(&mut self) -> Result<SearchOutcome> {
        self.run_with_events(&mut (), None)
    }

    /// Runs the search, reporting progress to `sink` and snapshots to `checkpoints`.
    pub fn run_with_events(
        &mut self,
        sink: &mut dyn EventSink,
        mut checkpoints: Option<&mut dyn CheckpointSink>,
    ) -> Result<SearchOutcome> {
        if self.state != EngineState::Idle {
            return Err(Error::Other("search engine has already run".into()));
        }
        self.state = EngineState::Running;
        let size = self.config.population_size;

        let initial = initial_candidates(
            self.problem,
            size,
            self.config.init_retry_factor,
            &mut self.rng,
        );
        info!(
            "Starting search: {} sites, {} objects, population {}, {} generations.",
            self.problem.site_count(),
            self.problem.object_count(),
            size,
            self.config.generations
        );
        if sink.wants(SearchEventKind::RunStarted) {
            sink.send(SearchEvent::RunStarted {
                config: self.config.clone(),
                site_count: self.problem.site_count(),
                object_count: self.problem.object_count(),
            });
        }

        let mut evaluations = initial.len();
        let mut population = truncate(self.evaluate_all(initial), size);
        if !population.iter().any(Individual::is_feasible) {
            warn!("Initial population contains no feasible layout.");
            if sink.wants(SearchEventKind::Warning) {
                sink.send(SearchEvent::Warning {
                    context: "init".into(),
                    message: "initial population contains no feasible layout".into(),
                });
            }
        }
        self.report_generation(0, &population, evaluations, sink);

        let mut generation = 0;
        let mut cancelled = false;
        while generation < self.config.generations {
            if self.stop_requested() {
                cancelled = true;
                info!("Stop requested; ending search after generation {generation}.");
                break;
            }

            let offspring = self.make_offspring(&population);
            evaluations += offspring.len();
            let mut merged = population;
            merged.extend(self.evaluate_all(offspring));
            population = truncate(merged, size);
            generation += 1;

            self.report_generation(generation, &population, evaluations, sink);
            if let Some(cp) = checkpoints.as_deref_mut() {
                let every = self.config.checkpoint_every;
                if every > 0 && generation % every == 0 {
                    self.checkpoint(generation, &population, cp, sink);
                }
            }
        }

        self.state = EngineState::Draining;
        let population = Population::new(population);
        let archive = ParetoArchive::from_population(
            self.problem,
            &population,
            self.config.top_k,
            self.config.primary,
        );
        info!(
            "Search finished after {} generations ({} evaluations): {} feasible, {} archived.",
            generation,
            evaluations,
            population.feasible_count(),
            archive.len()
        );
        if sink.wants(SearchEventKind::RunFinished) {
            sink.send(SearchEvent::RunFinished {
                generations: generation,
                evaluations,
                archive_size: archive.len(),
                cancelled,
            });
        }
        self.state = EngineState::Finished;

        Ok(SearchOutcome {
            population,
            archive,
            generations: generation,
            evaluations,
            cancelled,
        })
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| flag.load(AtomicOrdering::Relaxed))
    }

    fn evaluate_all(&self, candidates: Vec<LayoutCandidate>) -> Vec<Individual> {
        let problem = self.problem;
        candidates
            .into_par_iter()
            .map(|candidate| {
                let evaluation = problem.evaluate(&candidate);
                Individual::new(candidate, evaluation)
            })
            .collect()
    }

    /// Produces `population_size` offspring whose site multisets differ from every parent
    /// and from each other, within a bounded number of attempts.
    fn make_offspring(&mut self, parents: &[Individual]) -> Vec<LayoutCandidate> {
        let size = self.config.population_size;
        let site_count = self.problem.site_count();
        let mutation_rate = self.config.mutation_rate_for(self.problem.object_count());
        let max_attempts = size.saturating_mul(OFFSPRING_RETRY_FACTOR);

        let mut seen: HashSet<LayoutCandidate> =
            parents.iter().map(|p| p.candidate.clone()).collect();
        let mut offspring = Vec::with_capacity(size);
        let mut attempts = 0;
        let mut duplicates = 0;
        while offspring.len() < size {
            attempts += 1;
            let a = binary_tournament(parents, &mut self.rng);
            let b = binary_tournament(parents, &mut self.rng);
            let (mut first, mut second) = uniform_crossover(
                &parents[a].candidate,
                &parents[b].candidate,
                self.config.crossover_rate,
                site_count,
                &mut self.rng,
            );
            mutate(&mut first, mutation_rate, site_count, &mut self.rng);
            mutate(&mut second, mutation_rate, site_count, &mut self.rng);

            for child in [first, second] {
                if offspring.len() == size {
                    break;
                }
                if seen.insert(child.clone()) || attempts > max_attempts {
                    offspring.push(child);
                } else {
                    duplicates += 1;
                }
            }
        }
        if duplicates > 0 {
            debug!("Discarded {duplicates} duplicate offspring.");
        }
        offspring
    }

    fn report_generation(
        &self,
        generation: usize,
        population: &[Individual],
        evaluations: usize,
        sink: &mut dyn EventSink,
    ) {
        let feasible = population.iter().filter(|i| i.is_feasible()).count();
        let front_size = population.iter().filter(|i| i.rank == 0).count();
        let best_distance = population
            .iter()
            .filter(|i| i.is_feasible())
            .map(|i| i.objectives().distance())
            .min_by(f64::total_cmp);
        debug!(
            "Generation {generation}: {feasible}/{} feasible, front {front_size}, best {:?}.",
            population.len(),
            best_distance
        );
        if sink.wants(SearchEventKind::GenerationFinished) {
            sink.send(SearchEvent::GenerationFinished {
                generation,
                feasible,
                front_size,
                best_distance,
                evaluations,
            });
        }
    }

    fn checkpoint(
        &self,
        generation: usize,
        population: &[Individual],
        checkpoints: &mut dyn CheckpointSink,
        sink: &mut dyn EventSink,
    ) {
        let archive = ParetoArchive::from_individuals(
            self.problem,
            population,
            self.config.top_k,
            self.config.primary,
        );
        let snapshot = archive
            .to_solution_set(self.problem.meters_per_pixel())
            .with_generation(generation);
        match checkpoints.write(&snapshot) {
            Ok(target) => {
                info!(
                    "Checkpoint @ generation {generation}: {} solutions -> {target}.",
                    snapshot.solutions.len()
                );
                if sink.wants(SearchEventKind::CheckpointWritten) {
                    sink.send(SearchEvent::CheckpointWritten {
                        generation,
                        solutions: snapshot.solutions.len(),
                        target,
                    });
                }
            }
            Err(err) => {
                warn!("Checkpoint @ generation {generation} failed: {err}");
                if sink.wants(SearchEventKind::CheckpointFailed) {
                    sink.send(SearchEvent::CheckpointFailed {
                        generation,
                        message: err.to_string(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::search::checkpoint::VecCheckpoints;
    use crate::search::events::VecSink;
    use crate::search::individual::{Evaluation, Feasibility, ObjectiveVector};
    use crate::search::output::SolutionSet;

    /// Sites on a line; objectives pull towards opposite ends.
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
            let xs: Vec<f64> = candidate.sites().iter().map(|&s| s as f64).collect();
            let mean = xs.iter().sum::<f64>() / xs.len() as f64;
            let spread = xs.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b))
                - xs.iter().fold(f64::INFINITY, |a, &b| a.min(b));
            let feasibility = if self.is_feasible(candidate) {
                Feasibility::Feasible
            } else {
                Feasibility::Infeasible
            };
            Evaluation::new(ObjectiveVector::new(mean, -spread, 0.0), feasibility)
        }
    }

    fn line(sites: usize, objects: usize, clearance: f64) -> LineProblem {
        LineProblem {
            sites,
            objects,
            clearance,
        }
    }

    #[test]
    fn config_validation() {
        assert!(SearchConfig::new(0, 5).validate().is_err());
        assert!(SearchConfig::new(8, 5)
            .with_crossover_rate(1.5)
            .validate()
            .is_err());
        assert!(SearchConfig::new(8, 5)
            .with_mutation_rate(-0.1)
            .validate()
            .is_err());
        assert!(SearchConfig::new(8, 5).with_top_k(0).validate().is_err());
        assert!(SearchConfig::default().validate().is_ok());
        assert_eq!(SearchConfig::default().mutation_rate_for(4), 0.25);
    }

    #[test]
    fn rejects_too_few_sites() {
        let problem = line(3, 5, 0.0);
        let err = SearchEngine::new(&problem, SearchConfig::new(4, 2)).err();
        assert!(matches!(
            err,
            Some(Error::InsufficientSites {
                required: 5,
                available: 3
            })
        ));
    }

    #[test]
    fn run_produces_feasible_archive() {
        let problem = line(40, 3, 2.0);
        let mut engine =
            SearchEngine::new(&problem, SearchConfig::new(16, 20).with_seed(3)).unwrap();
        assert_eq!(engine.state(), EngineState::Idle);
        let outcome = engine.run().unwrap();
        assert_eq!(engine.state(), EngineState::Finished);
        assert_eq!(outcome.generations, 20);
        assert_eq!(outcome.evaluations, 16 * 21);
        assert_eq!(outcome.population.len(), 16);
        assert!(!outcome.archive.is_empty());
        for entry in outcome.archive.entries() {
            assert!(problem.is_feasible(&entry.candidate));
        }
        assert!(engine.run().is_err());
    }

    #[test]
    fn same_seed_same_archive() {
        let problem = line(60, 4, 3.0);
        let config = SearchConfig::new(20, 15).with_seed(11);
        let a = SearchEngine::new(&problem, config.clone())
            .unwrap()
            .run()
            .unwrap();
        let b = SearchEngine::new(&problem, config).unwrap().run().unwrap();
        assert_eq!(a.archive.entries(), b.archive.entries());
    }

    #[test]
    fn events_and_checkpoints_follow_interval() {
        let problem = line(30, 2, 1.0);
        let config = SearchConfig::new(8, 7).with_checkpoint_every(3);
        let mut engine = SearchEngine::new(&problem, config).unwrap();
        let mut sink = VecSink::new();
        let mut checkpoints = VecCheckpoints::new();
        engine
            .run_with_events(&mut sink, Some(&mut checkpoints))
            .unwrap();

        assert_eq!(sink.count(SearchEventKind::RunStarted), 1);
        assert_eq!(sink.count(SearchEventKind::GenerationFinished), 8);
        assert_eq!(sink.count(SearchEventKind::CheckpointWritten), 2);
        assert_eq!(sink.count(SearchEventKind::RunFinished), 1);
        let generations: Vec<Option<usize>> =
            checkpoints.snapshots().iter().map(|s| s.generation).collect();
        assert_eq!(generations, vec![Some(3), Some(6)]);
    }

    struct FailingSink;

    impl CheckpointSink for FailingSink {
        fn write(&mut self, _snapshot: &SolutionSet) -> Result<String> {
            Err(Error::Other("disk unavailable".into()))
        }
    }

    #[test]
    fn checkpoint_failures_do_not_abort() {
        let problem = line(30, 2, 1.0);
        let config = SearchConfig::new(8, 4).with_checkpoint_every(2);
        let mut engine = SearchEngine::new(&problem, config).unwrap();
        let mut sink = VecSink::new();
        let outcome = engine
            .run_with_events(&mut sink, Some(&mut FailingSink))
            .unwrap();
        assert_eq!(outcome.generations, 4);
        assert_eq!(sink.count(SearchEventKind::CheckpointFailed), 2);
    }

    #[test]
    fn stop_flag_ends_run_between_generations() {
        let problem = line(30, 2, 1.0);
        let stop = Arc::new(AtomicBool::new(true));
        let mut engine = SearchEngine::new(&problem, SearchConfig::new(8, 50))
            .unwrap()
            .with_stop_flag(stop);
        let outcome = engine.run().unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.generations, 0);
        assert_eq!(outcome.evaluations, 8);
        assert_eq!(engine.state(), EngineState::Finished);
    }

    #[test]
    fn impossible_clearance_yields_empty_archive() {
        let problem = line(10, 3, 100.0);
        let mut sink = VecSink::new();
        let outcome = SearchEngine::new(&problem, SearchConfig::new(6, 3))
            .unwrap()
            .run_with_events(&mut sink, None)
            .unwrap();
        assert!(outcome.archive.is_empty());
        assert_eq!(sink.count(SearchEventKind::Warning), 1);
    }
}
