use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use floor_layout::prelude::BestLayout;
use floor_layout_cli::{init_tracing, render_layout_to_file, MarkerStyle, RunSettings};
use tracing::{info, warn};

/// Draws a chosen layout onto the floor-plan image.
#[derive(Parser, Debug)]
#[command(name = "layout-render")]
struct Args {
    /// Floor-plan image to draw on.
    #[arg(long)]
    image: PathBuf,

    /// Layout written by `layout-pick-best` or `layout-baseline`.
    #[arg(long, default_value = "outputs/best_layout.json")]
    layout: PathBuf,

    /// Settings file consulted when the layout carries no scale.
    #[arg(long, default_value = "data/config.json")]
    config: PathBuf,

    #[arg(long, default_value = "outputs/floor_with_best.png")]
    output: PathBuf,

    #[arg(long, default_value_t = 10)]
    radius: u32,

    #[arg(long, default_value_t = 2)]
    stroke: u32,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let text = std::fs::read_to_string(&args.layout)
        .with_context(|| format!("failed to read {}", args.layout.display()))?;
    let best = BestLayout::from_json(&text)?;

    let mpp = match best.meters_per_pixel.filter(|m| *m > 0.0) {
        Some(mpp) => mpp,
        None => RunSettings::load(&args.config)
            .map(|s| s.layout.meters_per_pixel)
            .with_context(|| {
                format!(
                    "meters_per_pixel missing from {} and {}",
                    args.layout.display(),
                    args.config.display()
                )
            })?,
    };
    if mpp <= 0.0 {
        bail!("meters_per_pixel must be > 0");
    }

    let style = MarkerStyle::default()
        .with_radius(args.radius)
        .with_stroke(args.stroke);
    let drawn = render_layout_to_file(&args.image, &best.layout, mpp, &style, &args.output)?;
    if drawn < best.layout.len() {
        warn!(
            "{} of {} objects fall outside the image.",
            best.layout.len() - drawn,
            best.layout.len()
        );
    }
    info!("Saved annotated image to {}.", args.output.display());
    Ok(())
}
