//! # CVV-RS: Crypto Volatility Visualizer
//!
//! A synthetic crypto market generator. It simulates daily close prices from a
//! configurable waveform, a linear drift and Gaussian noise, dresses them up as OHLCV
//! candles, and computes the summary analytics a volatility dashboard needs.
//!
//! ## Core Components
//! | Component                  | Description                                                                |
//! |----------------------------|----------------------------------------------------------------------------|
//! | **`SimulationParameters`** | Horizon, base price, amplitude, frequency, drift, noise and wave pattern.  |
//! | **`PriceSimulator`**       | Daily close prices, floored at `100`.                                      |
//! | **`OhlcvSynthesizer`**     | Open, high, low and volume fabricated around each close.                  |
//! | **`Summary`**              | Mean, deviation, daily returns, Sharpe-like ratio, volatility level.       |
//! | **`Histogram`**            | Close price distribution.                                                  |
//! | **`Comparison`**           | Stable vs volatile reference assets.                                       |
//! | **`Simulation`**           | Owns the random generator and runs the whole pipeline.                     |
//!
//! ## Wave Patterns
//! | Pattern                  | Wave at phase `t`                           |
//! |--------------------------|---------------------------------------------|
//! | **Sine**                 | `A·sin(t)`                                  |
//! | **Cosine**               | `A·cos(t)`                                  |
//! | **Combined**             | `A·(0.6·sin(t) + 0.4·cos(2t))`              |
//! | **Realistic**            | `A·(0.5·sin(t) + 0.3·cos(1.7t) + 0.2·sin(3.1t))` |
//! | **Flat**                 | `0`                                         |
//!
//! ## Features
//! - `csv` *(default)*: CSV export and import of OHLCV tables.
//! - `draws` *(default)*: candlestick and comparison charts with `plotters`.
//! - `serde`: serialization of parameters and analytics.
//! - `cli`: the `cvv` command line tool.
//!
//! ## Getting Started
//! ```rust
//! use cvv_rs::prelude::*;
//!
//! let params = SimulationParameters::builder()
//!     .horizon_days(60)
//!     .base_price(30_000.0)
//!     .amplitude(2_000.0)
//!     .pattern("realistic")
//!     .build()
//!     .unwrap();
//!
//! let report = Simulation::from_seed(7).run(&params).unwrap();
//! assert_eq!(report.table().len(), 60);
//! assert!(report.table().iter().all(|c| c.close() >= MIN_PRICE));
//! println!("{}", report.summary());
//! ```
//!
//! ## License
//! MIT
#![warn(missing_docs)]

/// Price simulation pipeline: parameters, close prices and OHLCV synthesis.
pub mod engine;

/// Error types for the library.
pub mod errors;

/// Random number sources.
pub mod random;

/// Market analytics: mean, deviation, returns, histogram and comparison.
pub mod metrics;

/// CSV export and import.
#[cfg(feature = "csv")]
pub mod export;

/// Draw candlestick and comparison charts to png or svg.
#[cfg(feature = "draws")]
pub mod draws;

/// Re-exports of commonly used types and traits for convenience.
pub mod prelude {
    pub use super::*;
    pub use crate::engine::*;
    pub use crate::errors::*;
    pub use crate::metrics::*;
    pub use crate::random::*;

    #[cfg(feature = "csv")]
    pub use crate::export::*;

    #[cfg(feature = "draws")]
    pub use crate::draws::*;
}

use std::ops::{Add, Div, Mul, Sub};

/// Trait for performing percentage-based calculations.
///
/// This trait provides methods to add, subtract, and calculate percentages
/// for numeric types, enabling common financial calculations.
pub trait PercentCalculus<Rhs = Self> {
    /// Adds a percentage to the value.
    ///
    /// ### Arguments
    /// * `rhs` - The percentage to add (e.g., 10.0 for 10%).
    ///
    /// ### Returns
    /// The value increased by the given percentage.
    fn addpercent(self, rhs: Rhs) -> Self;

    /// Subtracts a percentage from the value.
    ///
    /// ### Arguments
    /// * `rhs` - The percentage to subtract (e.g., 10.0 for 10%).
    ///
    /// ### Returns
    /// The value decreased by the given percentage.
    fn subpercent(self, rhs: Rhs) -> Self;

    /// Calculates the percentage change between two values.
    ///
    /// ### Arguments
    /// * `new` - The new value to compare with.
    ///
    /// ### Returns
    /// The percentage change from the original value to the new value.
    fn change(self, new: Self) -> Self;
}

impl PercentCalculus for f64 {
    fn addpercent(self, percent: Self) -> Self {
        self.add(self.mul(percent.div(100.0)))
    }

    fn subpercent(self, percent: Self) -> Self {
        self.sub(self.mul(percent.div(100.0)))
    }

    fn change(self, new: Self) -> Self {
        new.sub(self).div(self).mul(100.0)
    }
}

#[cfg(test)]
mod percent {
    use super::*;

    #[test]
    fn add() {
        assert_eq!(110.0, 100.0.addpercent(10.0))
    }

    #[test]
    fn sub() {
        assert_eq!(90.0, 100.0.subpercent(10.0))
    }

    #[test]
    fn change() {
        assert_eq!(10.0, 100.0.change(110.0))
    }

    #[test]
    fn negative_change() {
        assert_eq!(-50.0, 200.0.change(100.0))
    }
}
