use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use floor_layout::prelude::SolutionSet;
use floor_layout_cli::{init_tracing, write_text};
use tracing::info;

/// Picks the archive entry nearest the normalised ideal point.
#[derive(Parser, Debug)]
#[command(name = "layout-pick-best")]
struct Args {
    /// Solution set written by `layout-search`.
    #[arg(long, default_value = "outputs/layouts.json")]
    input: PathBuf,

    #[arg(long, default_value = "outputs/best_layout.json")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("{} not found; run layout-search first", args.input.display()))?;
    let solutions = SolutionSet::from_json(&text)?;
    let best = solutions
        .select_balanced()
        .context("solution set is empty; no feasible layout was found")?;

    write_text(&args.output, &best.to_json_pretty()?)?;
    info!(
        "Saved {} (solution {}/{}).",
        args.output.display(),
        best.index_in_pareto.unwrap_or(0) + 1,
        solutions.solutions.len()
    );
    info!("Scores: {:?}", best.scores);
    Ok(())
}
