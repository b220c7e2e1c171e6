use std::f64::consts::PI;

use rand::Rng;

/// Source of the random draws consumed by the simulator and the OHLCV synthesizer.
///
/// Every [`rand::Rng`] is a `RandomSource`, so a seeded `StdRng` gives reproducible runs:
///
/// ```rust
/// use cvv_rs::prelude::*;
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let u = rng.uniform();
/// assert!((0.0..1.0).contains(&u));
/// ```
pub trait RandomSource {
    /// Returns a uniform draw in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Returns a standard normal draw (mean 0, variance 1).
    ///
    /// Box–Muller transform over two uniforms, each redrawn while it is exactly zero so
    /// that `ln(u)` stays finite. Only the cosine deviate is returned.
    fn standard_normal(&mut self) -> f64 {
        let mut u = 0.0;
        while u == 0.0 {
            u = self.uniform();
        }
        let mut v = 0.0;
        while v == 0.0 {
            v = self.uniform();
        }
        (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos()
    }
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Replays a fixed list of uniforms, cycling when exhausted.
#[cfg(test)]
pub(crate) struct Scripted {
    values: Vec<f64>,
    index: usize,
}

#[cfg(test)]
impl Scripted {
    pub(crate) fn new(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
            index: 0,
        }
    }

    pub(crate) fn consumed(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
impl RandomSource for Scripted {
    fn uniform(&mut self) -> f64 {
        let value = self.values[self.index % self.values.len()];
        self.index += 1;
        value
    }
}
