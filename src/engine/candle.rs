use std::ops::Deref;

use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::{Error, Result};

/// One simulated day: a timestamp and its close price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    timestamp: DateTime<Utc>,
    close: f64,
}

impl From<(DateTime<Utc>, f64)> for PricePoint {
    fn from((timestamp, close): (DateTime<Utc>, f64)) -> Self {
        Self { timestamp, close }
    }
}

impl PricePoint {
    /// Returns the timestamp of the day.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the close price.
    pub fn close(&self) -> f64 {
        self.close
    }
}

/// Daily OHLCV bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u32,
}

impl Candle {
    /// Returns the open time of the bar.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Calendar date of the bar (UTC).
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Returns the open price.
    pub fn open(&self) -> f64 {
        self.open
    }

    /// Returns the highest price.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Returns the lowest price.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Returns the close price.
    pub fn close(&self) -> f64 {
        self.close
    }

    /// Returns the traded volume.
    pub fn volume(&self) -> u32 {
        self.volume
    }

    /// Distance between the high and the low.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// True when the bar closed at or above its open.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    // callers guarantee low <= open, close <= high
    pub(crate) fn from_parts(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: u32) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Builder for [`Candle`], checking that `low <= min(open, close)` and `high >= max(open, close)`.
///
/// ```rust
/// use cvv_rs::prelude::*;
/// use chrono::DateTime;
///
/// let candle = CandleBuilder::builder()
///     .timestamp(DateTime::default())
///     .open(100.0)
///     .high(110.0)
///     .low(95.0)
///     .close(105.0)
///     .volume(1_000)
///     .build()
///     .unwrap();
/// assert_eq!(candle.range(), 15.0);
/// ```
#[derive(Debug, Default)]
pub struct CandleBuilder {
    timestamp: Option<DateTime<Utc>>,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<u32>,
}

impl CandleBuilder {
    /// Creates an empty builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Sets the open time.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the open price.
    pub fn open(mut self, open: f64) -> Self {
        self.open = Some(open);
        self
    }

    /// Sets the highest price.
    pub fn high(mut self, high: f64) -> Self {
        self.high = Some(high);
        self
    }

    /// Sets the lowest price.
    pub fn low(mut self, low: f64) -> Self {
        self.low = Some(low);
        self
    }

    /// Sets the close price.
    pub fn close(mut self, close: f64) -> Self {
        self.close = Some(close);
        self
    }

    /// Sets the volume.
    pub fn volume(mut self, volume: u32) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Returns the candle, or an error if a field is missing or prices are inconsistent.
    pub fn build(self) -> Result<Candle> {
        let timestamp = self.timestamp.ok_or(Error::MissingField("timestamp"))?;
        let open = self.open.ok_or(Error::MissingField("open"))?;
        let high = self.high.ok_or(Error::MissingField("high"))?;
        let low = self.low.ok_or(Error::MissingField("low"))?;
        let close = self.close.ok_or(Error::MissingField("close"))?;
        let volume = self.volume.ok_or(Error::MissingField("volume"))?;

        if [open, high, low, close].iter().any(|p| !p.is_finite()) {
            return Err(Error::InvalidCandle(format!(
                "prices must be finite (open: {open}, high: {high}, low: {low}, close: {close})"
            )));
        }
        if low > open.min(close) || high < open.max(close) {
            return Err(Error::InvalidCandle(format!(
                "expected low <= open, close <= high (open: {open}, high: {high}, low: {low}, close: {close})"
            )));
        }

        Ok(Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Ordered OHLCV rows, one per day, with strictly increasing timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OhlcvTable {
    rows: Vec<Candle>,
}

impl Deref for OhlcvTable {
    type Target = [Candle];

    fn deref(&self) -> &Self::Target {
        &self.rows
    }
}

impl TryFrom<Vec<Candle>> for OhlcvTable {
    type Error = Error;

    /// Accepts the rows when their timestamps are strictly increasing.
    fn try_from(rows: Vec<Candle>) -> Result<Self> {
        if let Some(pair) = rows.windows(2).find(|w| w[0].timestamp >= w[1].timestamp) {
            return Err(Error::InvalidInput(format!(
                "rows must have strictly increasing timestamps ({} is followed by {})",
                pair[0].timestamp, pair[1].timestamp
            )));
        }
        Ok(Self { rows })
    }
}

impl IntoIterator for OhlcvTable {
    type Item = Candle;
    type IntoIter = std::vec::IntoIter<Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl OhlcvTable {
    pub(crate) fn from_ordered(rows: Vec<Candle>) -> Self {
        Self { rows }
    }

    /// Returns the close column.
    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(Candle::close).collect()
    }

    /// Returns the first and the last date of the table.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.rows.first()?.date(), self.rows.last()?.date()))
    }
}
