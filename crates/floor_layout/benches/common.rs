#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use floor_layout::prelude::GridMask;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// A square floor with an outer wall and a row of pillars every 16 pixels.
pub fn pillared_floor(side: usize) -> GridMask {
    GridMask::from_fn(side, side, |x, y| {
        let wall = x == 0 || y == 0 || x + 1 == side || y + 1 == side;
        let pillar = x % 16 < 3 && y % 16 < 3 && x > 8 && y > 8;
        !(wall || pillar)
    })
}
