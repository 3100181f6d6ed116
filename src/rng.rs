//! Random-number stream behind the `$random` / `$randomseed` / `$choose`
//! builtins.
//!
//! The evaluator owns one stream per instance; seeding it makes the whole
//! interpolation deterministic, which is what templates that want
//! reproducible output (and the test suite) rely on.  No process-wide
//! generator is involved.

use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};

/// A seedable random stream.
pub trait Rng {
    /// Reset the stream to a deterministic state.
    fn seed(&mut self, seed: u64);

    /// Uniform in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform integer in `[lo, hi]` (inclusive both ends).
    fn next_range(&mut self, lo: i64, hi: i64) -> i64;
}

/// Default stream backed by [`rand::rngs::StdRng`].
pub struct StdStream {
    inner: StdRng,
}

impl StdStream {
    /// Entropy-seeded stream.
    pub fn new() -> Self {
        StdStream {
            inner: StdRng::from_entropy(),
        }
    }

    /// Deterministic stream.
    pub fn seeded(seed: u64) -> Self {
        StdStream {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Rng for StdStream {
    fn seed(&mut self, seed: u64) {
        self.inner = StdRng::seed_from_u64(seed);
    }

    fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    fn next_range(&mut self, lo: i64, hi: i64) -> i64 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        self.inner.gen_range(lo..=hi)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_streams_agree() {
        let mut a = StdStream::seeded(7);
        let mut b = StdStream::seeded(7);
        for _ in 0..16 {
            assert_eq!(a.next_range(1, 1000), b.next_range(1, 1000));
        }
    }

    #[test]
    fn reseeding_restarts_the_stream() {
        let mut a = StdStream::seeded(42);
        let first: Vec<i64> = (0..4).map(|_| a.next_range(0, i64::MAX)).collect();
        a.seed(42);
        let second: Vec<i64> = (0..4).map(|_| a.next_range(0, i64::MAX)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn range_is_inclusive() {
        let mut rng = StdStream::seeded(1);
        for _ in 0..64 {
            let n = rng.next_range(1, 3);
            assert!((1..=3).contains(&n));
        }
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let mut rng = StdStream::seeded(1);
        let n = rng.next_range(5, 2);
        assert!((2..=5).contains(&n));
    }

    #[test]
    fn f64_in_unit_interval() {
        let mut rng = StdStream::seeded(9);
        for _ in 0..64 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }
}
