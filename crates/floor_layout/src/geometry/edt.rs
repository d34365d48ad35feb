//! Euclidean Distance Transform (EDT) over walkability masks.
//!
//! Produces, for every walkable pixel, the distance to the nearest obstacle pixel.
//!
//! This implementation is based on the Felzenszwalb-Huttenlocher algorithm,
//! which computes exact Euclidean distances using a separable approach with
//! two 1D passes.
use crate::geometry::GridMask;

/// Per-pixel distance to the nearest obstacle, in metres.
#[derive(Clone, Debug)]
pub struct DistanceField {
    width: usize,
    height: usize,
    meters: Vec<f64>,
}

impl DistanceField {
    /// Computes the distance field of `mask`, scaling pixel distances by `meters_per_pixel`.
    ///
    /// Obstacle pixels get `0.0`. Pixels outside the image are not treated as obstacles;
    /// a mask without any obstacle yields the image diagonal everywhere.
    pub fn compute(mask: &GridMask, meters_per_pixel: f64) -> Self {
        let (w, h) = mask.size();
        let mut meters = edt_unsigned(mask.as_slice(), w, h);
        for v in &mut meters {
            *v *= meters_per_pixel;
        }
        Self {
            width: w,
            height: h,
            meters,
        }
    }

    /// Distance at a pixel, `0.0` outside the grid.
    #[inline]
    pub fn get(&self, x: isize, y: isize) -> f64 {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return 0.0;
        }
        self.meters[(y as usize) * self.width + x as usize]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.meters
    }
}

/// Computes the 1D squared-distance transform of `f` using the lower envelope of parabolas.
fn edt_1d(f: &[f64], output: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    debug_assert_eq!(n, output.len(), "Input and output must have same length");
    debug_assert!(v.len() >= n && z.len() > n);

    let mut k = 0;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let mut s = intersection(q, v[k], f);
        // z[0] is -inf, so this stops at k == 0 at the latest.
        while s <= z[k] {
            k -= 1;
            s = intersection(q, v[k], f);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, dq) in output.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let dx = q as f64 - v[k] as f64;
        *dq = dx * dx + f[v[k]];
    }
}

/// Horizontal position where the parabolas rooted at `i` and `j` intersect (`i > j`).
#[inline]
fn intersection(i: usize, j: usize, f: &[f64]) -> f64 {
    debug_assert!(i > j, "parabolas must be visited in increasing order");
    let (fi, fj) = (f[i], f[j]);
    let (i, j) = (i as f64, j as f64);
    ((fi + i * i) - (fj + j * j)) / (2.0 * (i - j))
}

/// Exact Euclidean distance, in pixels, from every `true` cell of a row-major `w * h` mask to
/// the nearest `false` cell.
pub(crate) fn edt_unsigned(mask: &[bool], w: usize, h: usize) -> Vec<f64> {
    debug_assert_eq!(mask.len(), w * h);

    // Largest possible squared distance inside the image stands in for infinity.
    let unreached = (w * w + h * h) as f64;
    let mut squared: Vec<f64> = mask
        .iter()
        .map(|&walkable| if walkable { unreached } else { 0.0 })
        .collect();

    let longest = w.max(h);
    let mut v = vec![0usize; longest];
    let mut z = vec![0.0f64; longest + 1];
    let mut line = vec![0.0; longest];
    let mut transformed = vec![0.0; longest];

    for row in squared.chunks_exact_mut(w.max(1)) {
        edt_1d(row, &mut transformed[..w], &mut v, &mut z);
        row.copy_from_slice(&transformed[..w]);
    }

    for x in 0..w {
        for (y, slot) in line[..h].iter_mut().enumerate() {
            *slot = squared[y * w + x];
        }
        edt_1d(&line[..h], &mut transformed[..h], &mut v, &mut z);
        for (y, &d) in transformed[..h].iter().enumerate() {
            squared[y * w + x] = d;
        }
    }

    squared.into_iter().map(f64::sqrt).collect()
}
