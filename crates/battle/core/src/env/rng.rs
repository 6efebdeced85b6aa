//! Random source for host-side resolution.
//!
//! Only the host's pipeline draws from a [`RandomSource`]. The guest replays
//! realized outcomes and never touches randomness, so nothing here needs to be
//! synchronized between peers.

/// Source of uniform random numbers.
pub trait RandomSource {
    /// Next raw 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Uniform value in `[0, 1)`.
    fn uniform(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Uniform integer in `[lo, hi]`. Returns `lo` when the range is empty.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        if lo >= hi {
            return lo;
        }
        // Width in u64 so the full i64 range cannot overflow.
        let width = hi.wrapping_sub(lo) as u64;
        let offset = ((self.uniform() * (width as f64 + 1.0)) as u64).min(width);
        lo.wrapping_add(offset as i64)
    }

    /// Uniform index in `[0, len)`. Returns 0 when `len` is 0.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let index = (self.uniform() * len as f64) as usize;
        index.min(len - 1)
    }
}

/// Selection helpers built on [`RandomSource`].
pub trait RandomSourceExt: RandomSource {
    /// Uniform pick from a slice; `None` when empty.
    fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.index(items.len()))
    }

    /// Picks an index whose probability is proportional to its weight.
    ///
    /// Non-positive weights never win. Returns `None` when no weight is positive.
    fn weighted_choice(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let mut roll = self.uniform() * total;
        let mut last = None;
        for (index, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            if roll < *weight {
                return Some(index);
            }
            roll -= weight;
            last = Some(index);
        }
        last
    }
}

impl<R: RandomSource + ?Sized> RandomSourceExt for R {}

/// PCG-XSH-RR generator: 64-bit state, 32-bit output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PcgRandom {
    state: u64,
}

impl PcgRandom {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: 0 };
        rng.state = Self::step(seed.wrapping_add(Self::INCREMENT));
        rng
    }

    /// Generator for one battle, mixed from the session seed and battle id.
    pub fn for_battle(session_seed: u64, battle_id: u64) -> Self {
        Self::new(compute_seed(session_seed, battle_id))
    }

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RandomSource for PcgRandom {
    fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = Self::step(old);
        Self::output(old)
    }
}

/// Mixes seed components into one well-distributed seed.
pub fn compute_seed(session_seed: u64, battle_id: u64) -> u64 {
    let mut hash = session_seed;
    hash ^= battle_id.wrapping_mul(0x9e3779b97f4a7c15);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// Replays a fixed list of uniform draws, for exercising probability bands.
///
/// Once the script runs out it keeps returning the last value (or 0.0 if empty).
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        Self {
            draws: draws.into(),
            cursor: 0,
        }
    }

    /// Number of draws consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    fn next_draw(&mut self) -> f64 {
        let value = self
            .draws
            .get(self.cursor)
            .or_else(|| self.draws.last())
            .copied()
            .unwrap_or(0.0);
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

impl RandomSource for ScriptedRandom {
    fn next_u32(&mut self) -> u32 {
        (self.next_draw() * (f64::from(u32::MAX) + 1.0)) as u32
    }

    fn uniform(&mut self) -> f64 {
        self.next_draw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = PcgRandom::new(7);
        let mut b = PcgRandom::new(7);
        let xs: Vec<u32> = (0..16).map(|_| a.next_u32()).collect();
        let ys: Vec<u32> = (0..16).map(|_| b.next_u32()).collect();
        assert_eq!(xs, ys);

        let mut c = PcgRandom::new(8);
        let zs: Vec<u32> = (0..16).map(|_| c.next_u32()).collect();
        assert_ne!(xs, zs);
    }

    #[test]
    fn uniform_stays_in_unit_interval() {
        let mut rng = PcgRandom::for_battle(99, 3);
        for _ in 0..1_000 {
            let u = rng.uniform();
            assert!((0.0..1.0).contains(&u));
            assert!(rng.index(5) < 5);
            assert!((-2..=2).contains(&rng.range(-2, 2)));
        }
    }

    #[test]
    fn range_covers_extreme_bounds() {
        let mut rng = PcgRandom::new(3);
        for _ in 0..64 {
            rng.range(i64::MIN, i64::MAX);
            assert!(rng.range(i64::MAX - 1, i64::MAX) >= i64::MAX - 1);
            assert!(rng.range(i64::MIN, i64::MIN + 1) <= i64::MIN + 1);
        }

        assert_eq!(ScriptedRandom::new([0.0]).range(i64::MIN, i64::MAX), i64::MIN);
        assert!(ScriptedRandom::new([1.0]).range(i64::MIN, i64::MAX) > i64::MAX - 8192);
        assert_eq!(ScriptedRandom::new([1.0]).range(-2, 2), 2);
        assert_eq!(rng.range(5, 5), 5);
        assert_eq!(rng.range(9, 1), 9);
    }

    #[test]
    fn battle_seeds_depend_on_both_components() {
        assert_eq!(compute_seed(1, 2), compute_seed(1, 2));
        assert_ne!(compute_seed(1, 2), compute_seed(1, 3));
        assert_ne!(compute_seed(1, 2), compute_seed(2, 2));
    }

    #[test]
    fn choice_on_empty_slice_is_none() {
        let mut rng = PcgRandom::new(1);
        let empty: [u8; 0] = [];
        assert!(rng.choice(&empty).is_none());
        assert_eq!(rng.index(0), 0);
        assert_eq!(rng.range(4, 4), 4);
    }

    #[test]
    fn weighted_choice_skips_zero_weights() {
        let mut rng = ScriptedRandom::new([0.0, 0.99]);
        assert_eq!(rng.weighted_choice(&[0.0, 2.0, 0.0, 1.0]), Some(1));
        assert_eq!(rng.weighted_choice(&[0.0, 2.0, 0.0, 1.0]), Some(3));
        assert_eq!(rng.weighted_choice(&[0.0, 0.0]), None);
    }

    #[test]
    fn scripted_draws_repeat_the_last_value() {
        let mut rng = ScriptedRandom::new([0.25, 0.75]);
        assert_eq!(rng.uniform(), 0.25);
        assert_eq!(rng.uniform(), 0.75);
        assert_eq!(rng.uniform(), 0.75);
        assert_eq!(rng.consumed(), 3);
        assert_eq!(rng.index(4), 3);
        assert_eq!(rng.range(1, 4), 4);
    }
}
