//! Core simulation engine.
//!
//! This module provides the price pipeline:
//! - `SimulationParameters`: Inputs of a run (pattern, amplitude, drift, noise, ...).
//! - `PriceSimulator`: Daily close prices from a waveform, a drift and a noise term.
//! - `OhlcvSynthesizer`: OHLCV bars fabricated around the close prices.
//! - `Simulation`: Owns the random generator and chains the stages with the analytics.

mod candle;
mod params;
mod simulator;
mod synthesizer;

use chrono::{DateTime, Utc};
use rand::{SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::{
    errors::Result,
    metrics::{Comparison, SeriesStats, Summary},
    random::RandomSource,
};

pub use candle::*;
pub use params::*;
pub use simulator::*;
pub use synthesizer::*;

/// Output of a full pipeline run.
#[derive(Debug, Clone)]
pub struct Report {
    points: Vec<PricePoint>,
    table: OhlcvTable,
    summary: Summary,
}

impl Report {
    /// Returns the simulated close prices.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Returns the OHLCV table.
    pub fn table(&self) -> &OhlcvTable {
        &self.table
    }

    /// Returns the analytics computed over the table.
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Consumes the report and returns the table.
    pub fn into_table(self) -> OhlcvTable {
        self.table
    }
}

/// Runs simulations with its own random generator.
///
/// Each instance owns its generator, so independent runs never share random state.
///
/// ### Example
/// ```rust
/// use cvv_rs::prelude::*;
///
/// let params = SimulationParameters::builder()
///     .horizon_days(30)
///     .base_price(45_000.0)
///     .pattern(Pattern::Combined)
///     .build()
///     .unwrap();
///
/// let mut simulation = Simulation::from_seed(42);
/// let report = simulation.run(&params).unwrap();
/// assert_eq!(report.table().len(), 30);
/// assert_eq!(report.summary().daily_returns_pct().len(), 29);
/// ```
#[derive(Debug, Clone)]
pub struct Simulation<R = StdRng> {
    rng: R,
}

impl Simulation<StdRng> {
    /// Creates a reproducible simulation from a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Creates a simulation seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: RandomSource> Simulation<R> {
    /// Creates a simulation over the given random source.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Simulates close prices ending the day before now.
    pub fn simulate(&mut self, params: &SimulationParameters) -> Result<Vec<PricePoint>> {
        self.simulate_at(params, Utc::now())
    }

    /// Simulates close prices ending the day before `now`.
    pub fn simulate_at(&mut self, params: &SimulationParameters, now: DateTime<Utc>) -> Result<Vec<PricePoint>> {
        Ok(PriceSimulator::anchored(params, now)?.simulate(&mut self.rng))
    }

    /// Fabricates OHLCV bars around the points.
    pub fn synthesize(&mut self, points: &[PricePoint]) -> OhlcvTable {
        OhlcvSynthesizer::new(&mut self.rng).synthesize(points)
    }

    /// Runs simulate, synthesize and summarize in sequence.
    pub fn run(&mut self, params: &SimulationParameters) -> Result<Report> {
        self.run_at(params, Utc::now())
    }

    /// Same as [`Simulation::run`] with an explicit "now".
    pub fn run_at(&mut self, params: &SimulationParameters, now: DateTime<Utc>) -> Result<Report> {
        debug!(?params, "running simulation");
        let points = self.simulate_at(params, now)?;
        let table = self.synthesize(&points);
        let summary = Summary::try_from(&table)?;
        debug!(
            last_close = summary.last_close(),
            std_dev = summary.std_dev_close(),
            volatility = %summary.volatility_level(),
            "simulation summarized"
        );
        Ok(Report { points, table, summary })
    }

    /// Simulates the stable and the volatile reference assets around `base_price`.
    ///
    /// Both series end the day before now and use the presets of
    /// [`SimulationParameters::stable`] and [`SimulationParameters::volatile`].
    pub fn compare_series(&mut self, base_price: f64) -> Result<(Vec<PricePoint>, Vec<PricePoint>)> {
        let now = Utc::now();
        let stable = self.simulate_at(&SimulationParameters::stable(base_price)?, now)?;
        let volatile = self.simulate_at(&SimulationParameters::volatile(base_price)?, now)?;
        Ok((stable, volatile))
    }

    /// Summary statistics of [`Simulation::compare_series`].
    pub fn compare(&mut self, base_price: f64) -> Result<Comparison> {
        let (stable, volatile) = self.compare_series(base_price)?;
        Ok(Comparison::new(
            SeriesStats::try_from(stable.as_slice())?,
            SeriesStats::try_from(volatile.as_slice())?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::VolatilityLevel;

    #[test]
    fn pipeline_lengths() {
        let params = SimulationParameters::default();
        let report = Simulation::from_seed(1).run(&params).unwrap();
        assert_eq!(report.points().len(), 90);
        assert_eq!(report.table().len(), 90);
        assert_eq!(report.summary().daily_returns_pct().len(), 89);
        for (point, candle) in report.points().iter().zip(report.table().iter()) {
            assert_eq!(point.close(), candle.close());
        }
    }

    #[test]
    fn pipeline_is_reproducible() {
        let params = SimulationParameters::default();
        let now = Utc::now();
        let a = Simulation::from_seed(77).run_at(&params, now).unwrap();
        let b = Simulation::from_seed(77).run_at(&params, now).unwrap();
        assert_eq!(a.table(), b.table());
    }

    #[test]
    fn pipeline_fails_fast() {
        let params = SimulationParameters::builder().horizon_days(0).build();
        assert!(params.is_err());
    }

    #[test]
    fn flat_pipeline() {
        let params = SimulationParameters::builder()
            .horizon_days(5)
            .base_price(45_000.0)
            .amplitude(0.0)
            .drift(0.0)
            .noise(0.0)
            .build()
            .unwrap();
        let report = Simulation::from_seed(2).run(&params).unwrap();
        let summary = report.summary();
        assert_eq!(summary.std_dev_close(), 0.0);
        assert_eq!(summary.sharpe_like(), 0.0);
        assert_eq!(summary.volatility_level(), VolatilityLevel::Low);
        assert!(summary.daily_returns_pct().iter().all(|r| *r == 0.0));
    }

    #[test]
    fn compare_reference_assets() {
        let comparison = Simulation::from_seed(3).compare(45_000.0).unwrap();
        assert!(comparison.volatile().std_dev() > comparison.stable().std_dev());
        assert!(comparison.volatile().swing() > comparison.stable().swing());
        assert!(Simulation::from_seed(3).compare(0.0).is_err());

        let (stable, volatile) = Simulation::from_seed(3).compare_series(45_000.0).unwrap();
        assert_eq!(stable.len(), 180);
        assert_eq!(volatile.len(), 180);
        assert_eq!(stable.last().unwrap().timestamp(), volatile.last().unwrap().timestamp());
    }
}
