use std::f64::consts::PI;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, trace};

use crate::{
    engine::{PricePoint, SimulationParameters},
    errors::{Error, Result},
    random::RandomSource,
};

/// Floor applied to every simulated close price.
pub const MIN_PRICE: f64 = 100.0;

/// Turns [`SimulationParameters`] into a daily close price series.
///
/// `price(i) = max(MIN_PRICE, base + wave(t) + drift·i + noise·z)` with
/// `t = (i / horizon)·2π·frequency` and `z` a standard normal draw.
#[derive(Debug, Clone)]
pub struct PriceSimulator<'p> {
    params: &'p SimulationParameters,
    start: DateTime<Utc>,
}

impl<'p> PriceSimulator<'p> {
    /// Creates a simulator whose last point falls on the day before the current time.
    pub fn new(params: &'p SimulationParameters) -> Result<Self> {
        Self::anchored(params, Utc::now())
    }

    /// Same as [`PriceSimulator::new`], with an explicit "now".
    ///
    /// Fails when the first day would fall outside the representable date range.
    pub fn anchored(params: &'p SimulationParameters, now: DateTime<Utc>) -> Result<Self> {
        params.validate()?;
        let start = i64::try_from(params.horizon_days())
            .ok()
            .and_then(Duration::try_days)
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or_else(|| {
                Error::InvalidParameter(
                    "horizon_days",
                    format!("{} days before {now} is out of the date range", params.horizon_days()),
                )
            })?;
        Ok(Self { params, start })
    }

    /// Timestamp of the first point.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Waveform phase for day `i`.
    pub fn phase(&self, i: usize) -> f64 {
        (i as f64 / self.params.horizon_days() as f64) * 2.0 * PI * self.params.frequency()
    }

    /// Close price for day `i` before the noise term and the floor.
    pub fn deterministic_price(&self, i: usize) -> f64 {
        let params = self.params;
        let wave = params.pattern().wave(params.amplitude(), self.phase(i));
        let trend = params.drift() * i as f64;
        params.base_price() + wave + trend
    }

    /// Produces one point per day of the horizon, in increasing timestamp order.
    pub fn simulate<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Vec<PricePoint> {
        let start = self.start();
        let horizon = self.params.horizon_days();

        let points = (0..horizon)
            .map(|i| {
                let noise = self.params.noise() * rng.standard_normal();
                let raw = self.deterministic_price(i) + noise;
                if raw < MIN_PRICE {
                    trace!(day = i, raw, "price clipped to floor");
                }
                let close = raw.max(MIN_PRICE);
                PricePoint::from((start + Duration::days(i as i64), close))
            })
            .collect::<Vec<_>>();

        debug!(
            days = horizon,
            pattern = self.params.pattern().key(),
            first = points.first().map(PricePoint::close),
            last = points.last().map(PricePoint::close),
            "simulated price series"
        );
        points
    }
}
