use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random source shared by every generator.
///
/// Wraps a [`StdRng`] behind the handful of sampling primitives the
/// generators need. Callers construct one, thread it through as
/// `&mut`, and get identical output for identical seeds.
///
/// # Examples
///
/// ```rust
/// use fleetmon_synth::FleetRng;
///
/// let mut a = FleetRng::seeded(7);
/// let mut b = FleetRng::seeded(7);
/// assert_eq!(a.int_in(0, 100), b.int_in(0, 100));
/// ```
pub struct FleetRng {
    inner: StdRng,
}

impl FleetRng {
    /// Deterministic source from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Non-reproducible source from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }

    /// Uniform integer in `[min, max]`, both ends inclusive.
    pub fn int_in(&mut self, min: i64, max: i64) -> i64 {
        self.inner.gen_range(min..=max)
    }

    /// Uniform float in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// Uniformly chosen element of a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.inner.gen_range(0..items.len())]
    }

    /// Element chosen with the given relative weights. The last element
    /// absorbs any rounding remainder of the weight sum.
    pub fn pick_weighted<'a, T>(&mut self, items: &'a [T], weights: &[f64]) -> &'a T {
        let total: f64 = weights.iter().sum();
        let mut roll = self.unit() * total;
        for (item, weight) in items.iter().zip(weights) {
            roll -= weight;
            if roll <= 0.0 {
                return item;
            }
        }
        &items[items.len() - 1]
    }
}
