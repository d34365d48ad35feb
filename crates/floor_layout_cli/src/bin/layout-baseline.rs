use std::path::PathBuf;

use anyhow::{bail, ensure};
use clap::Parser;
use floor_layout::prelude::*;
use floor_layout_cli::{init_tracing, write_text, RunSettings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

/// Scores random feasible layouts and keeps the best by weighted normalised score.
#[derive(Parser, Debug)]
#[command(name = "layout-baseline")]
struct Args {
    #[arg(long, default_value = "data/config.json")]
    config: PathBuf,

    #[arg(long, default_value = "outputs/best_layout_baseline.json")]
    output: PathBuf,

    /// Random layouts to draw.
    #[arg(long, default_value_t = 200)]
    samples: usize,

    /// Site draws per layout before giving up.
    #[arg(long, default_value_t = DEFAULT_FEASIBLE_TRIES)]
    tries: usize,

    /// Weights for distance, negative visibility and congestion.
    #[arg(long, value_delimiter = ',', default_value = "0.6,0.2,0.2")]
    weights: Vec<f64>,

    /// Overrides the configured seed.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    ensure!(
        args.weights.len() == 3,
        "expected three weights, got {}",
        args.weights.len()
    );
    let weights = [args.weights[0], args.weights[1], args.weights[2]];

    let settings = RunSettings::load(&args.config)?;
    let problem = settings.prepare_problem()?;
    let mut rng = StdRng::seed_from_u64(args.seed.unwrap_or(settings.layout.seed));

    let mut records = Vec::with_capacity(args.samples);
    for _ in 0..args.samples {
        if let Some(candidate) = random_feasible_candidate(&problem, args.tries, &mut rng) {
            let evaluation = problem.evaluate(&candidate);
            records.push(SolutionRecord::new(
                &problem.decode(&candidate),
                &evaluation.objectives,
            ));
        }
    }
    info!("{}/{} random layouts were feasible.", records.len(), args.samples);

    let set = SolutionSet::new(problem.meters_per_pixel(), records);
    let Some(mut best) = set.select_weighted(weights) else {
        bail!("no feasible random layout found in {} samples", args.samples);
    };
    best.index_in_pareto = None;
    best.num_solutions = None;

    write_text(&args.output, &best.to_json_pretty()?)?;
    info!("Saved {}.", args.output.display());
    info!("Scores: {:?}", best.scores);
    Ok(())
}
