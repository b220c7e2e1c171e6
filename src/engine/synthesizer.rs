use tracing::debug;

use crate::{
    engine::{Candle, OhlcvTable, PricePoint},
    random::RandomSource,
};

/// Lowest synthesized volume.
pub const MIN_VOLUME: u32 = 500;
/// Synthesized volumes stay strictly below this value.
pub const MAX_VOLUME: u32 = 10_000;

/// Builds plausible OHLCV bars around a series of close prices.
///
/// For each close `c`, with `u₁..u₅` uniform draws taken in that order:
/// - `spread = c·(0.01 + u₁·0.03)`
/// - `open = c + (u₂ − 0.5)·spread`
/// - `high = max(open, c) + u₃·spread`
/// - `low = min(open, c) − u₄·spread`
/// - `volume = ⌊500 + u₅·9500⌋`
pub struct OhlcvSynthesizer<'r, R: RandomSource + ?Sized> {
    rng: &'r mut R,
}

impl<'r, R: RandomSource + ?Sized> OhlcvSynthesizer<'r, R> {
    /// Creates a synthesizer drawing from `rng`.
    pub fn new(rng: &'r mut R) -> Self {
        Self { rng }
    }

    /// Fabricates a single bar for `point`.
    pub fn candle(&mut self, point: &PricePoint) -> Candle {
        let close = point.close();
        let spread = close * (0.01 + self.rng.uniform() * 0.03);
        let open = close + (self.rng.uniform() - 0.5) * spread;
        let high = open.max(close) + self.rng.uniform() * spread;
        let low = open.min(close) - self.rng.uniform() * spread;
        let span = (MAX_VOLUME - MIN_VOLUME) as f64;
        let volume = ((MIN_VOLUME as f64 + self.rng.uniform() * span).floor() as u32).min(MAX_VOLUME - 1);
        Candle::from_parts(point.timestamp(), open, high, low, close, volume)
    }

    /// Fabricates one bar per point, keeping the input order.
    pub fn synthesize(&mut self, points: &[PricePoint]) -> OhlcvTable {
        let rows = points.iter().map(|p| self.candle(p)).collect::<Vec<_>>();
        debug!(rows = rows.len(), "synthesized OHLCV table");
        OhlcvTable::from_ordered(rows)
    }
}
