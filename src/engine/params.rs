use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{Error, Result};

/// Deterministic waveform added to the base price.
#[cfg_attr(feature = "serde", derive(Deserialize), serde(from = "String"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pattern {
    /// `A·sin(t)`
    #[default]
    Sine,
    /// `A·cos(t)`
    Cosine,
    /// `A·(0.6·sin(t) + 0.4·cos(2t))`
    Combined,
    /// `A·(0.5·sin(t) + 0.3·cos(1.7t) + 0.2·sin(3.1t))`
    Realistic,
    /// Unrecognized pattern label: no waveform contribution.
    Flat,
}

impl Pattern {
    /// Waveform value for the phase `t` and the given amplitude.
    pub fn wave(&self, amplitude: f64, t: f64) -> f64 {
        match self {
            Self::Sine => amplitude * t.sin(),
            Self::Cosine => amplitude * t.cos(),
            Self::Combined => amplitude * (0.6 * t.sin() + 0.4 * (2.0 * t).cos()),
            Self::Realistic => amplitude * (0.5 * t.sin() + 0.3 * (1.7 * t).cos() + 0.2 * (3.1 * t).sin()),
            Self::Flat => 0.0,
        }
    }

    /// Short, lowercase name of the pattern.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Sine => "sine",
            Self::Cosine => "cosine",
            Self::Combined => "combined",
            Self::Realistic => "realistic",
            Self::Flat => "flat",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sine => "Sine Wave (Smooth Cycles)",
            Self::Cosine => "Cosine Wave (Phase Shift)",
            Self::Combined => "Combined Waves",
            Self::Realistic => "Realistic Behavior",
            Self::Flat => "Flat (No Waveform)",
        }
    }
}

impl From<&str> for Pattern {
    /// Parses a short name or a long label, ignoring case.
    /// Anything else maps to [`Pattern::Flat`].
    fn from(value: &str) -> Self {
        let value = value.trim().to_lowercase();
        match value.as_str() {
            "sine" | "sine wave (smooth cycles)" => Self::Sine,
            "cosine" | "cosine wave (phase shift)" => Self::Cosine,
            "combined" | "combined waves" => Self::Combined,
            "realistic" | "realistic behavior" => Self::Realistic,
            "flat" | "flat (no waveform)" => Self::Flat,
            _ => {
                warn!(pattern = %value, "unrecognized pattern, waveform disabled");
                Self::Flat
            }
        }
    }
}

impl From<String> for Pattern {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(feature = "serde")]
impl Serialize for Pattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// Inputs of one simulation run.
///
/// Built with [`SimulationParameters::builder`], or deserialized (then checked with
/// [`SimulationParameters::validate`]).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default, rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParameters {
    horizon_days: usize,
    base_price: f64,
    amplitude: f64,
    frequency: f64,
    drift: f64,
    noise: f64,
    pattern: Pattern,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            horizon_days: 90,
            base_price: 45_000.0,
            amplitude: 5_000.0,
            frequency: 3.0,
            drift: 50.0,
            noise: 1_500.0,
            pattern: Pattern::Sine,
        }
    }
}

impl SimulationParameters {
    /// Starts a builder seeded with the default parameters.
    pub fn builder() -> ParametersBuilder {
        ParametersBuilder {
            params: Self::default(),
        }
    }

    /// Low volatility reference asset: gentle sine cycles, little noise.
    pub fn stable(base_price: f64) -> Result<Self> {
        Self::builder()
            .horizon_days(180)
            .base_price(base_price)
            .amplitude(500.0)
            .frequency(2.0)
            .drift(20.0)
            .noise(200.0)
            .pattern(Pattern::Sine)
            .build()
    }

    /// High volatility reference asset: wide realistic waves, heavy noise.
    pub fn volatile(base_price: f64) -> Result<Self> {
        Self::builder()
            .horizon_days(180)
            .base_price(base_price)
            .amplitude(8_000.0)
            .frequency(5.0)
            .drift(30.0)
            .noise(5_000.0)
            .pattern(Pattern::Realistic)
            .build()
    }

    /// Checks every parameter against its domain.
    pub fn validate(&self) -> Result<()> {
        if self.horizon_days == 0 {
            return Err(Error::InvalidParameter("horizon_days", "must be at least 1".to_string()));
        }
        if !(self.base_price.is_finite() && self.base_price > 0.0) {
            return Err(Error::InvalidParameter(
                "base_price",
                format!("must be positive and finite (got: {})", self.base_price),
            ));
        }
        let non_negative = [
            ("amplitude", self.amplitude),
            ("frequency", self.frequency),
            ("noise", self.noise),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidParameter(
                    name,
                    format!("must be non-negative and finite (got: {value})"),
                ));
            }
        }
        if !self.drift.is_finite() {
            return Err(Error::InvalidParameter("drift", format!("must be finite (got: {})", self.drift)));
        }
        Ok(())
    }

    /// Returns the number of simulated days.
    pub fn horizon_days(&self) -> usize {
        self.horizon_days
    }

    /// Returns the base price.
    pub fn base_price(&self) -> f64 {
        self.base_price
    }

    /// Returns the waveform amplitude.
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Returns the number of waveform cycles over the horizon.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Returns the linear price change per day.
    pub fn drift(&self) -> f64 {
        self.drift
    }

    /// Returns the noise scale (standard deviation of the daily shock).
    pub fn noise(&self) -> f64 {
        self.noise
    }

    /// Returns the waveform pattern.
    pub fn pattern(&self) -> Pattern {
        self.pattern
    }
}

/// Builder for [`SimulationParameters`].
#[derive(Debug, Clone)]
pub struct ParametersBuilder {
    params: SimulationParameters,
}

impl From<SimulationParameters> for ParametersBuilder {
    fn from(params: SimulationParameters) -> Self {
        Self { params }
    }
}

impl ParametersBuilder {
    /// Sets the number of simulated days.
    pub fn horizon_days(mut self, days: usize) -> Self {
        self.params.horizon_days = days;
        self
    }

    /// Sets the base price.
    pub fn base_price(mut self, price: f64) -> Self {
        self.params.base_price = price;
        self
    }

    /// Sets the waveform amplitude.
    pub fn amplitude(mut self, amplitude: f64) -> Self {
        self.params.amplitude = amplitude;
        self
    }

    /// Sets the waveform frequency.
    pub fn frequency(mut self, frequency: f64) -> Self {
        self.params.frequency = frequency;
        self
    }

    /// Sets the daily drift.
    pub fn drift(mut self, drift: f64) -> Self {
        self.params.drift = drift;
        self
    }

    /// Sets the noise scale.
    pub fn noise(mut self, noise: f64) -> Self {
        self.params.noise = noise;
        self
    }

    /// Sets the waveform pattern.
    pub fn pattern(mut self, pattern: impl Into<Pattern>) -> Self {
        self.params.pattern = pattern.into();
        self
    }

    /// Validates and returns the parameters.
    pub fn build(self) -> Result<SimulationParameters> {
        self.params.validate()?;
        Ok(self.params)
    }
}
