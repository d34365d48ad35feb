use floor_layout::prelude::*;
use glam::DVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn open_floor_config() -> LayoutConfig {
    LayoutConfig::new(1.0, 2, &[DVec2::ZERO])
        .with_min_clearance(2.0)
        .with_min_wall_clearance(0.0)
        .with_strides(1, 1)
        .with_search(32, 40)
        .with_seed(7)
}

fn open_floor_problem() -> LayoutProblem {
    LayoutProblem::prepare(GridMask::filled(20, 20, true), None, &open_floor_config()).unwrap()
}

#[test]
fn search_beats_random_feasible_layouts_on_distance() {
    let config = open_floor_config();
    let problem = open_floor_problem();
    let mut engine = SearchEngine::new(&problem, config.search_config()).unwrap();
    let outcome = engine.run().unwrap();

    assert_eq!(engine.state(), EngineState::Finished);
    assert_eq!(outcome.generations, 40);
    assert_eq!(outcome.evaluations, 32 * 41);
    assert!(!outcome.archive.is_empty());
    assert!(outcome.archive.len() <= config.top_k);
    for entry in outcome.archive.entries() {
        assert!(problem.is_feasible(&entry.candidate));
        assert_eq!(entry.layout.len(), 2);
    }

    let best = outcome.archive.best().unwrap().objectives.distance();

    let mut rng = StdRng::seed_from_u64(11);
    let mut total = 0.0;
    let mut count = 0usize;
    for _ in 0..200 {
        let sampled = random_feasible_candidate(&problem, DEFAULT_FEASIBLE_TRIES, &mut rng);
        if let Some(candidate) = sampled {
            total += problem.evaluate(&candidate).objectives.distance();
            count += 1;
        }
    }
    assert_eq!(count, 200);
    let baseline = total / count as f64;
    assert!(
        best < baseline,
        "best distance {best} should beat random mean {baseline}"
    );
}

#[test]
fn same_seed_reproduces_the_archive() {
    let problem = open_floor_problem();
    let config = SearchConfig::new(16, 12).with_seed(99);

    let first = SearchEngine::new(&problem, config.clone())
        .unwrap()
        .run()
        .unwrap();
    let second = SearchEngine::new(&problem, config).unwrap().run().unwrap();

    assert_eq!(first.archive.len(), second.archive.len());
    for (a, b) in first
        .archive
        .entries()
        .iter()
        .zip(second.archive.entries())
    {
        assert_eq!(a.candidate.sites(), b.candidate.sites());
        assert_eq!(a.objectives, b.objectives);
        assert_eq!(a.layout, b.layout);
    }
}

#[test]
fn checkpoints_land_in_the_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outputs").join("layouts_partial.json");
    let problem = open_floor_problem();
    let config = SearchConfig::new(12, 10)
        .with_checkpoint_every(5)
        .with_seed(3);

    let mut writer = JsonCheckpointWriter::new(&path);
    let mut events = VecSink::new();
    let outcome = SearchEngine::new(&problem, config)
        .unwrap()
        .run_with_events(&mut events, Some(&mut writer))
        .unwrap();

    assert_eq!(events.count(SearchEventKind::CheckpointWritten), 2);
    assert_eq!(events.count(SearchEventKind::CheckpointFailed), 0);

    let text = std::fs::read_to_string(&path).unwrap();
    let snapshot = SolutionSet::from_json(&text).unwrap();
    assert_eq!(snapshot.generation, Some(10));
    assert_eq!(snapshot.meters_per_pixel, 1.0);
    assert!(!snapshot.solutions.is_empty());
    assert!(snapshot.solutions.len() <= 50);

    let final_set = outcome.archive.to_solution_set(problem.meters_per_pixel());
    assert_eq!(final_set.solutions.len(), snapshot.solutions.len());
    for (live, saved) in final_set.solutions.iter().zip(&snapshot.solutions) {
        assert_eq!(live.layout, saved.layout);
        assert!((live.scores.distance - saved.scores.distance).abs() < 1e-9);
        assert!((live.scores.congestion_proxy - saved.scores.congestion_proxy).abs() < 1e-9);
    }

    let best = final_set.select_balanced().unwrap();
    assert_eq!(best.num_solutions, Some(final_set.solutions.len()));
    assert_eq!(best.layout.len(), 2);
}
