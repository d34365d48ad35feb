//! Small seeded-randomness helpers built on [`Rng`].
use rand::Rng;

/// Generate a random float in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn Rng) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Uniform index in `0..n`. `n` must be non-zero.
#[inline]
pub(crate) fn rand_index(rng: &mut dyn Rng, n: usize) -> usize {
    debug_assert!(n > 0, "rand_index needs a non-empty range");
    ((rng.next_u64() as u128 * n as u128) >> 64) as usize
}

/// Fisher-Yates shuffle.
pub(crate) fn shuffle<T>(items: &mut [T], rng: &mut dyn Rng) {
    for i in (1..items.len()).rev() {
        let j = rand_index(rng, i + 1);
        items.swap(i, j);
    }
}

/// `k` distinct values from `0..n` in random order (partial Fisher-Yates).
pub(crate) fn sample_distinct(rng: &mut dyn Rng, n: usize, k: usize) -> Vec<usize> {
    let k = k.min(n);
    let mut pool: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = i + rand_index(rng, n - i);
        pool.swap(i, j);
    }
    pool.truncate(k);
    pool
}
