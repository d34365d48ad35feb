#![forbid(unsafe_code)]
//! Shared plumbing for the `layout-*` executables: tracing setup, floor-plan mask loading,
//! run settings and layout rendering.

mod masks;
mod rendering;
mod settings;

pub use masks::{load_mask, mask_from_luma, WALKABLE_THRESHOLD};
pub use rendering::{draw_layout, render_layout_to_file, MarkerStyle};
pub use settings::{RunSettings, LAYOUTS_FILE, PARTIAL_LAYOUTS_FILE};

use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber honouring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Writes `text` to `path`, creating parent directories as needed.
pub fn write_text(path: &std::path::Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    Ok(())
}
