//! Market analytics over simulated data.
//!
//! This module provides tools to calculate:
//! - Close price mean, standard deviation, extremes
//! - Average daily range and volume
//! - Daily returns and a Sharpe-like ratio
//! - Volatility classification
//!
//! It also holds the close price distribution ([`Histogram`]) and the
//! stable vs volatile asset comparison ([`Comparison`]).
//!
//! The Sharpe-like ratio divides a mean return in percent by a price-scale deviation, and
//! the volatility threshold is an absolute amount of currency. Both are display heuristics,
//! not risk measures.

use std::fmt;

use chrono::NaiveDate;
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    PercentCalculus,
    engine::{OhlcvTable, PricePoint},
    errors::{Error, Result},
};

/// Standard deviation of closes above which a series is classified as [`VolatilityLevel::High`].
pub const HIGH_VOLATILITY_THRESHOLD: f64 = 2_000.0;

/// Default number of bins of the close price distribution.
pub const HISTOGRAM_BINS: usize = 25;

/// Coarse volatility class of a close series.
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "UPPERCASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolatilityLevel {
    /// Standard deviation above the threshold.
    High,
    /// Standard deviation at or below the threshold.
    Low,
}

impl VolatilityLevel {
    /// Classifies a population standard deviation of close prices.
    pub fn from_std_dev(std_dev: f64) -> Self {
        if std_dev > HIGH_VOLATILITY_THRESHOLD {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for VolatilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("HIGH"),
            Self::Low => f.write_str("LOW"),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

// population standard deviation (divides by N)
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Percent change between consecutive values; one shorter than the input.
pub fn daily_returns_pct(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[0].change(w[1])).collect()
}

/// Summary statistics of an OHLCV table.
///
/// ```rust
/// use cvv_rs::prelude::*;
///
/// let params = SimulationParameters::default();
/// let report = Simulation::from_seed(1).run(&params).unwrap();
/// let summary = summarize(report.table()).unwrap();
/// assert_eq!(summary.rows(), 90);
/// println!("{summary}");
/// ```
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    rows: usize,
    first_date: NaiveDate,
    last_date: NaiveDate,
    last_close: f64,
    mean_close: f64,
    std_dev_close: f64,
    avg_daily_range: f64,
    avg_volume: f64,
    max_close: f64,
    min_close: f64,
    total_return_pct: f64,
    daily_returns_pct: Vec<f64>,
    mean_daily_return_pct: f64,
    sharpe_like: f64,
    volatility_level: VolatilityLevel,
}

/// Computes the [`Summary`] of a table. Fails on an empty table.
pub fn summarize(table: &OhlcvTable) -> Result<Summary> {
    Summary::try_from(table)
}

impl TryFrom<&OhlcvTable> for Summary {
    type Error = Error;

    fn try_from(table: &OhlcvTable) -> Result<Self> {
        let (first, last) = match (table.first(), table.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(Error::InvalidInput("cannot summarize an empty table".to_string())),
        };

        let closes = table.closes();
        let n = closes.len() as f64;
        let mean_close = mean(&closes);
        let std_dev_close = std_dev(&closes);
        let ranges = table.iter().map(|c| c.range()).collect::<Vec<_>>();
        let volumes = table.iter().map(|c| c.volume() as f64).collect::<Vec<_>>();
        let daily_returns_pct = daily_returns_pct(&closes);
        let mean_daily_return_pct = mean(&daily_returns_pct);
        let sharpe_like = if std_dev_close != 0.0 {
            mean_daily_return_pct / (std_dev_close / n.sqrt())
        } else {
            0.0
        };

        Ok(Self {
            rows: table.len(),
            first_date: first.date(),
            last_date: last.date(),
            last_close: last.close(),
            mean_close,
            std_dev_close,
            avg_daily_range: mean(&ranges),
            avg_volume: mean(&volumes),
            max_close: max(&closes),
            min_close: min(&closes),
            total_return_pct: first.close().change(last.close()),
            daily_returns_pct,
            mean_daily_return_pct,
            sharpe_like,
            volatility_level: VolatilityLevel::from_std_dev(std_dev_close),
        })
    }
}

impl Summary {
    /// Returns the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the date of the first row.
    pub fn first_date(&self) -> NaiveDate {
        self.first_date
    }

    /// Returns the date of the last row.
    pub fn last_date(&self) -> NaiveDate {
        self.last_date
    }

    /// Returns the last close price.
    pub fn last_close(&self) -> f64 {
        self.last_close
    }

    /// Returns the mean close price.
    pub fn mean_close(&self) -> f64 {
        self.mean_close
    }

    /// Returns the population standard deviation of the close prices.
    pub fn std_dev_close(&self) -> f64 {
        self.std_dev_close
    }

    /// Returns the mean `high - low`.
    pub fn avg_daily_range(&self) -> f64 {
        self.avg_daily_range
    }

    /// Returns the mean volume.
    pub fn avg_volume(&self) -> f64 {
        self.avg_volume
    }

    /// Returns the highest close.
    pub fn max_close(&self) -> f64 {
        self.max_close
    }

    /// Returns the lowest close.
    pub fn min_close(&self) -> f64 {
        self.min_close
    }

    /// Returns the change from the first to the last close, in percent.
    pub fn total_return_pct(&self) -> f64 {
        self.total_return_pct
    }

    /// Returns the daily returns in percent (one fewer than rows).
    pub fn daily_returns_pct(&self) -> &[f64] {
        &self.daily_returns_pct
    }

    /// Returns the mean daily return in percent, 0 without returns.
    pub fn mean_daily_return_pct(&self) -> f64 {
        self.mean_daily_return_pct
    }

    /// Returns `mean_daily_return_pct / (std_dev_close / sqrt(rows))`, 0 when the deviation is 0.
    pub fn sharpe_like(&self) -> f64 {
        self.sharpe_like
    }

    /// Returns the volatility class.
    pub fn volatility_level(&self) -> VolatilityLevel {
        self.volatility_level
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Market Metrics ===")?;
        writeln!(f, "Rows: {} ({} to {})", self.rows, self.first_date, self.last_date)?;
        writeln!(f, "Last Close: {:.2}", self.last_close)?;
        writeln!(f, "Mean Close: {:.2}", self.mean_close)?;
        writeln!(f, "Std Deviation: {:.2}", self.std_dev_close)?;
        writeln!(f, "Avg Daily Range: {:.2}", self.avg_daily_range)?;
        writeln!(f, "Avg Volume: {:.0}", self.avg_volume)?;
        #[allow(clippy::writeln_empty_string)]
        writeln!(f, "")?;
        writeln!(f, "Max Close: {:.2}", self.max_close)?;
        writeln!(f, "Min Close: {:.2}", self.min_close)?;
        writeln!(f, "Total Return: {:+.2}%", self.total_return_pct)?;
        writeln!(f, "Avg Daily Return: {:+.2}%", self.mean_daily_return_pct)?;
        writeln!(f, "Sharpe Ratio: {:.2}", self.sharpe_like)?;
        writeln!(f, "Volatility: {}", self.volatility_level)
    }
}

/// Equal-width distribution of close prices.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    edges: Vec<f64>,
    counts: Vec<usize>,
}

impl Histogram {
    /// Bins `values` into `bins` equal-width buckets between their min and max.
    ///
    /// The max lands in the last bucket. When every value is equal, all of them
    /// land in the first bucket.
    pub fn new(values: &[f64], bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(Error::InvalidParameter("bins", "must be at least 1".to_string()));
        }
        if values.is_empty() {
            return Err(Error::InvalidInput("cannot bin an empty series".to_string()));
        }

        let (lo, hi) = (min(values), max(values));
        let width = (hi - lo) / bins as f64;
        let edges = (0..bins)
            .map(|i| lo + width * i as f64)
            .chain(std::iter::once(hi))
            .collect::<Vec<_>>();
        let mut counts = vec![0; bins];
        for value in values {
            let index = if width > 0.0 {
                (((value - lo) / width).floor() as usize).min(bins - 1)
            } else {
                0
            };
            counts[index] += 1;
        }

        Ok(Self { edges, counts })
    }

    /// Returns the `bins + 1` bucket edges.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Returns the count of each bucket.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Iterates over `(lower edge, upper edge, count)`.
    pub fn buckets(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(edge, count)| (edge[0], edge[1], *count))
    }
}

impl TryFrom<&OhlcvTable> for Histogram {
    type Error = Error;

    fn try_from(table: &OhlcvTable) -> Result<Self> {
        Self::new(&table.closes(), HISTOGRAM_BINS)
    }
}

/// Spread statistics of a single close series.
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    std_dev: f64,
    swing: f64,
    total_return_pct: f64,
}

impl SeriesStats {
    /// Computes the statistics of a non-empty close series.
    pub fn from_closes(closes: &[f64]) -> Result<Self> {
        let (first, last) = match (closes.first(), closes.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(Error::InvalidInput("cannot describe an empty series".to_string())),
        };
        Ok(Self {
            std_dev: std_dev(closes),
            swing: max(closes) - min(closes),
            total_return_pct: first.change(last),
        })
    }

    /// Returns the population standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Returns `max - min`.
    pub fn swing(&self) -> f64 {
        self.swing
    }

    /// Returns the change from the first to the last close, in percent.
    pub fn total_return_pct(&self) -> f64 {
        self.total_return_pct
    }

    /// Returns the volatility class of the series.
    pub fn volatility_level(&self) -> VolatilityLevel {
        VolatilityLevel::from_std_dev(self.std_dev)
    }
}

impl TryFrom<&[PricePoint]> for SeriesStats {
    type Error = Error;

    fn try_from(points: &[PricePoint]) -> Result<Self> {
        let closes = points.iter().map(PricePoint::close).collect::<Vec<_>>();
        Self::from_closes(&closes)
    }
}

/// Side-by-side statistics of a stable and a volatile asset.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    stable: SeriesStats,
    volatile: SeriesStats,
}

impl Comparison {
    /// Creates a comparison from the two series statistics.
    pub fn new(stable: SeriesStats, volatile: SeriesStats) -> Self {
        Self { stable, volatile }
    }

    /// Returns the low volatility side.
    pub fn stable(&self) -> &SeriesStats {
        &self.stable
    }

    /// Returns the high volatility side.
    pub fn volatile(&self) -> &SeriesStats {
        &self.volatile
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Stable vs Volatile ===")?;
        for (name, stats) in [("Stable", &self.stable), ("Volatile", &self.volatile)] {
            writeln!(
                f,
                "{name}: std {:.2} | swing {:.2} | return {:+.2}% | {}",
                stats.std_dev,
                stats.swing,
                stats.total_return_pct,
                stats.volatility_level()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Candle, CandleBuilder};
    use chrono::{DateTime, Duration};

    fn table(rows: &[(f64, f64, f64, u32)]) -> OhlcvTable {
        let candles = rows
            .iter()
            .enumerate()
            .map(|(i, (high, low, close, volume))| {
                CandleBuilder::builder()
                    .timestamp(DateTime::default() + Duration::days(i as i64))
                    .open(*close)
                    .high(*high)
                    .low(*low)
                    .close(*close)
                    .volume(*volume)
                    .build()
                    .unwrap()
            })
            .collect::<Vec<Candle>>();
        OhlcvTable::try_from(candles).unwrap()
    }

    #[test]
    fn empty_table() {
        let err = summarize(&OhlcvTable::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn single_row() {
        let summary = summarize(&table(&[(110.0, 90.0, 100.0, 600)])).unwrap();
        assert_eq!(summary.rows(), 1);
        assert_eq!(summary.last_close(), 100.0);
        assert_eq!(summary.std_dev_close(), 0.0);
        assert_eq!(summary.avg_daily_range(), 20.0);
        assert_eq!(summary.avg_volume(), 600.0);
        assert!(summary.daily_returns_pct().is_empty());
        assert_eq!(summary.mean_daily_return_pct(), 0.0);
        assert_eq!(summary.sharpe_like(), 0.0);
        assert_eq!(summary.total_return_pct(), 0.0);
    }

    #[test]
    fn identical_closes() {
        let rows = vec![(45_100.0, 44_900.0, 45_000.0, 1_000); 10];
        let summary = summarize(&table(&rows)).unwrap();
        assert_eq!(summary.std_dev_close(), 0.0);
        assert!(summary.daily_returns_pct().iter().all(|r| *r == 0.0));
        assert_eq!(summary.sharpe_like(), 0.0);
        assert_eq!(summary.volatility_level(), VolatilityLevel::Low);
    }

    #[test]
    fn known_values() {
        let summary = summarize(&table(&[
            (110.0, 90.0, 100.0, 1_000),
            (120.0, 100.0, 110.0, 2_000),
            (100.0, 90.0, 99.0, 3_000),
        ]))
        .unwrap();

        assert_eq!(summary.mean_close(), 103.0);
        // deviations: -3, 7, -4 -> (9 + 49 + 16) / 3
        assert!((summary.std_dev_close() - (74.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((summary.avg_daily_range() - 50.0 / 3.0).abs() < 1e-12);
        assert_eq!(summary.avg_volume(), 2_000.0);
        assert_eq!(summary.max_close(), 110.0);
        assert_eq!(summary.min_close(), 99.0);

        let returns = summary.daily_returns_pct();
        assert!((returns[0] - 10.0).abs() < 1e-12);
        assert!((returns[1] + 10.0).abs() < 1e-12);
        assert!(summary.mean_daily_return_pct().abs() < 1e-12);
        assert!((summary.total_return_pct() + 1.0).abs() < 1e-12);

        let expected = summary.mean_daily_return_pct() / (summary.std_dev_close() / 3f64.sqrt());
        assert_eq!(summary.sharpe_like(), expected);
    }

    #[test]
    fn sharpe_like_formula() {
        let summary = summarize(&table(&[(101.0, 99.0, 100.0, 500), (201.0, 199.0, 200.0, 500)])).unwrap();
        // mean return 100%, std 50, sqrt(2)
        let expected = 100.0 / (50.0 / 2f64.sqrt());
        assert!((summary.sharpe_like() - expected).abs() < 1e-9);
    }

    #[test]
    fn volatility_threshold() {
        assert_eq!(VolatilityLevel::from_std_dev(2_000.0), VolatilityLevel::Low);
        assert_eq!(VolatilityLevel::from_std_dev(2_000.01), VolatilityLevel::High);
        assert_eq!(VolatilityLevel::High.to_string(), "HIGH");
    }

    #[test]
    fn histogram_bins() {
        let values = (0..100).map(|v| v as f64).collect::<Vec<_>>();
        let histogram = Histogram::new(&values, 10).unwrap();
        assert_eq!(histogram.edges().len(), 11);
        assert_eq!(histogram.counts(), &[10; 10]);
        assert_eq!(histogram.counts().iter().sum::<usize>(), 100);
        let (lo, hi, count) = histogram.buckets().last().unwrap();
        assert!(lo < 99.0 && hi == 99.0 && count == 10);
    }

    #[test]
    fn histogram_degenerate() {
        let histogram = Histogram::new(&[5.0, 5.0, 5.0], 4).unwrap();
        assert_eq!(histogram.counts(), &[3, 0, 0, 0]);
        assert!(Histogram::new(&[], 4).is_err());
        assert!(Histogram::new(&[1.0], 0).is_err());
    }

    #[test]
    fn histogram_from_table() {
        let rows = (0..50).map(|i| (1e6, 0.0, 100.0 + i as f64, 500)).collect::<Vec<_>>();
        let histogram = Histogram::try_from(&table(&rows)).unwrap();
        assert_eq!(histogram.counts().len(), HISTOGRAM_BINS);
        assert_eq!(histogram.counts().iter().sum::<usize>(), 50);
    }

    #[test]
    fn series_stats() {
        let stats = SeriesStats::from_closes(&[100.0, 300.0, 200.0]).unwrap();
        assert_eq!(stats.swing(), 200.0);
        assert_eq!(stats.total_return_pct(), 100.0);
        assert_eq!(stats.volatility_level(), VolatilityLevel::Low);
        assert!(SeriesStats::from_closes(&[]).is_err());
    }

    #[test]
    fn comparison_display() {
        let stable = SeriesStats::from_closes(&[100.0, 110.0]).unwrap();
        let volatile = SeriesStats::from_closes(&[100.0, 10_000.0]).unwrap();
        let text = Comparison::new(stable, volatile).to_string();
        assert!(text.contains("Stable: std 5.00"));
        assert!(text.contains("| HIGH"));
    }
}
