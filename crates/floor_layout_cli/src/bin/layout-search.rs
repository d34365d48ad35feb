use std::path::PathBuf;

use clap::Parser;
use floor_layout::prelude::*;
use floor_layout_cli::{init_tracing, RunSettings};
use tracing::info;

/// Runs the constrained NSGA-II search and writes the Pareto archive.
#[derive(Parser, Debug)]
#[command(name = "layout-search")]
struct Args {
    /// Settings file with mask paths and layout keys.
    #[arg(long, default_value = "data/config.json")]
    config: PathBuf,

    /// Directory receiving `layouts.json` and `layouts_partial.json`.
    #[arg(long, default_value = "outputs")]
    out_dir: PathBuf,

    /// Overrides the configured seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Overrides the configured number of generations.
    #[arg(long)]
    generations: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut settings = RunSettings::load(&args.config)?;
    if let Some(seed) = args.seed {
        settings.layout.seed = seed;
    }
    if let Some(generations) = args.generations {
        settings.layout.n_generations = generations;
    }

    let every = settings.layout.checkpoint_every;
    let mut progress = FnSink::new(|event| match event {
        SearchEvent::GenerationFinished {
            generation,
            feasible,
            best_distance,
            ..
        } if every > 0 && generation % every == 0 => {
            info!("gen {generation}: {feasible} feasible, best distance {best_distance:?}");
        }
        SearchEvent::Warning { context, message } => {
            info!("{context}: {message}");
        }
        _ => {}
    });

    settings.run_search(&args.out_dir, &mut progress)?;
    Ok(())
}
