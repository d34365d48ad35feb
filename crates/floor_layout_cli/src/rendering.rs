//! Draws a placed layout onto a floor-plan image.
//!
//! Each object becomes a filled disc with an outline. Markers carry no 1..N text labels;
//! the order of objects is only available from the layout file.
use std::path::Path;

use anyhow::Context;
use image::{Rgb, RgbImage};

/// How a placed object is drawn.
#[derive(Clone, Copy, Debug)]
pub struct MarkerStyle {
    pub radius_px: u32,
    pub stroke_px: u32,
    pub fill: [u8; 3],
    pub outline: [u8; 3],
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius_px: 10,
            stroke_px: 2,
            fill: [0, 255, 0],
            outline: [0, 0, 0],
        }
    }
}

impl MarkerStyle {
    pub fn with_radius(mut self, radius_px: u32) -> Self {
        self.radius_px = radius_px;
        self
    }

    pub fn with_stroke(mut self, stroke_px: u32) -> Self {
        self.stroke_px = stroke_px;
        self
    }
}

/// Draws one marker per layout point (metres) onto `image`.
///
/// Points are mapped with `round(metres / meters_per_pixel)`; markers whose centre falls
/// outside the image are skipped. Returns the number of markers drawn.
pub fn draw_layout(
    image: &mut RgbImage,
    layout: &[[f64; 2]],
    meters_per_pixel: f64,
    style: &MarkerStyle,
) -> usize {
    let (w, h) = (image.width() as i64, image.height() as i64);
    let mut drawn = 0;
    for &[x_m, y_m] in layout {
        let cx = (x_m / meters_per_pixel).round() as i64;
        let cy = (y_m / meters_per_pixel).round() as i64;
        if cx < 0 || cy < 0 || cx >= w || cy >= h {
            continue;
        }
        draw_marker(image, cx, cy, style);
        drawn += 1;
    }
    drawn
}

fn draw_marker(image: &mut RgbImage, cx: i64, cy: i64, style: &MarkerStyle) {
    let (w, h) = (image.width() as i64, image.height() as i64);
    let r = style.radius_px as i64;
    let outer_sq = r * r;
    let inner = (r - style.stroke_px as i64).max(0);
    let inner_sq = inner * inner;

    for dy in -r..=r {
        for dx in -r..=r {
            let d2 = dx * dx + dy * dy;
            if d2 > outer_sq {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if x < 0 || y < 0 || x >= w || y >= h {
                continue;
            }
            let color = if d2 <= inner_sq && inner > 0 {
                style.fill
            } else {
                style.outline
            };
            image.put_pixel(x as u32, y as u32, Rgb(color));
        }
    }
}

/// Renders `layout` over the floor-plan image at `background` and saves it to `out`.
pub fn render_layout_to_file(
    background: &Path,
    layout: &[[f64; 2]],
    meters_per_pixel: f64,
    style: &MarkerStyle,
    out: &Path,
) -> anyhow::Result<usize> {
    let mut image = image::open(background)
        .with_context(|| format!("failed to open floor plan {}", background.display()))?
        .to_rgb8();
    let drawn = draw_layout(&mut image, layout, meters_per_pixel, style);
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    image
        .save(out)
        .with_context(|| format!("failed to write {}", out.display()))?;
    Ok(drawn)
}
