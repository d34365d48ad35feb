use std::path::{Path, PathBuf};

use anyhow::Context;
use floor_layout::prelude::{
    EventSink, GridMask, JsonCheckpointWriter, LayoutConfig, LayoutProblem, Problem, SearchEngine,
    SolutionSet,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::masks::load_mask;
use crate::write_text;

/// Final archive written by [`RunSettings::run_search`].
pub const LAYOUTS_FILE: &str = "layouts.json";
/// Periodic snapshot written during [`RunSettings::run_search`].
pub const PARTIAL_LAYOUTS_FILE: &str = "layouts_partial.json";

/// `config.json` as read by the executables: mask paths plus the flat [`LayoutConfig`] keys.
#[derive(Clone, Debug, Deserialize)]
pub struct RunSettings {
    pub walkable_png: PathBuf,
    #[serde(default)]
    pub placeable_png: Option<PathBuf>,
    #[serde(flatten)]
    pub layout: LayoutConfig,
}

impl RunSettings {
    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let settings: Self = serde_json::from_str(text)?;
        settings.layout.validate()?;
        Ok(settings)
    }

    /// Reads settings from `path`; relative mask paths are resolved against the current
    /// directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("invalid settings {}", path.display()))
    }

    /// Loads the walkable mask and, if configured, the placeable mask.
    pub fn load_masks(&self) -> anyhow::Result<(GridMask, Option<GridMask>)> {
        let walkable = load_mask(&self.walkable_png)?;
        let placeable = self
            .placeable_png
            .as_deref()
            .map(load_mask)
            .transpose()?;
        Ok((walkable, placeable))
    }

    /// Loads the masks and runs the full preprocessing chain.
    pub fn prepare_problem(&self) -> anyhow::Result<LayoutProblem> {
        let (walkable, placeable) = self.load_masks()?;
        let problem = LayoutProblem::prepare(walkable, placeable.as_ref(), &self.layout)?;
        Ok(problem)
    }

    /// Prepares the problem, runs the search and writes `layouts.json` into `out_dir`.
    ///
    /// An empty archive is still written; only a warning is logged.
    pub fn run_search(
        &self,
        out_dir: &Path,
        events: &mut dyn EventSink,
    ) -> anyhow::Result<SolutionSet> {
        let problem = self.prepare_problem()?;
        let mut checkpoints = JsonCheckpointWriter::new(out_dir.join(PARTIAL_LAYOUTS_FILE));
        let outcome = SearchEngine::new(&problem, self.layout.search_config())?
            .run_with_events(events, Some(&mut checkpoints))?;

        let solutions = outcome.archive.to_solution_set(problem.meters_per_pixel());
        if solutions.solutions.is_empty() {
            warn!("no feasible layout found; relax min_clearance_m or min_obj_to_wall_m");
        }
        let out = out_dir.join(LAYOUTS_FILE);
        write_text(&out, &solutions.to_json_pretty()?)?;
        info!(
            "Saved {} with {} Pareto solutions.",
            out.display(),
            solutions.solutions.len()
        );
        Ok(solutions)
    }
}
