use std::path::Path;

use anyhow::Context;
use floor_layout::prelude::GridMask;
use image::GrayImage;

/// Luma values strictly above this count as set.
pub const WALKABLE_THRESHOLD: u8 = 127;

/// Thresholds a grayscale image into a mask; row `y` of the image becomes row `y` of the mask.
pub fn mask_from_luma(image: &GrayImage) -> GridMask {
    let (width, height) = image.dimensions();
    GridMask::from_fn(width as usize, height as usize, |x, y| {
        image.get_pixel(x as u32, y as u32).0[0] > WALKABLE_THRESHOLD
    })
}

/// Loads any image format `image` can decode and thresholds its luma channel.
pub fn load_mask(path: &Path) -> anyhow::Result<GridMask> {
    let image = image::open(path)
        .with_context(|| format!("failed to open mask image {}", path.display()))?
        .to_luma8();
    let mask = mask_from_luma(&image);
    tracing::debug!(
        "Loaded mask {} ({}x{}, {} set).",
        path.display(),
        mask.width(),
        mask.height(),
        mask.count_set()
    );
    Ok(mask)
}
