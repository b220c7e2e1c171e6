//! # Volatility Dashboard
//!
//! Runs every wave pattern from the same seed, prints the market metrics of each,
//! then compares the stable and volatile reference assets. With the default features
//! it also writes the OHLCV table as CSV and draws the charts.
use std::error::Error;

use cvv_rs::prelude::*;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let seed = 42;
    let patterns = [Pattern::Sine, Pattern::Cosine, Pattern::Combined, Pattern::Realistic];

    for pattern in patterns {
        let params = SimulationParameters::builder().pattern(pattern).build()?;
        let report = Simulation::from_seed(seed).run(&params)?;
        let summary = report.summary();

        println!("--- {pattern} ---");
        println!("{summary}");

        let (best, worst) = summary
            .daily_returns_pct()
            .iter()
            .fold((f64::NEG_INFINITY, f64::INFINITY), |(hi, lo), r| (hi.max(*r), lo.min(*r)));
        println!("best day {best:.2}% / worst day {worst:.2}%");
    }

    let params = SimulationParameters::default();
    let mut simulation = Simulation::from_seed(seed);
    let report = simulation.run(&params)?;

    let histogram = Histogram::try_from(report.table())?;
    let (peak_lo, peak_hi, peak) = histogram
        .buckets()
        .max_by_key(|(_, _, count)| *count)
        .ok_or("empty histogram")?;
    println!("most visited price band {peak_lo:.0} - {peak_hi:.0} ({peak} days)");

    println!("{}", simulation.compare(params.base_price())?);

    #[cfg(feature = "csv")]
    {
        save_csv(report.table(), DEFAULT_CSV_FILE)?;
        println!("table written to {DEFAULT_CSV_FILE}");
    }

    #[cfg(feature = "draws")]
    {
        let options = DrawOptions::default()
            .title("Simulated Market")
            .draw_output(DrawOutput::Svg("dashboard.svg".into()));
        Draw::with_table(report.table()).with_options(options).plot()?;

        let (stable, volatile) = simulation.compare_series(params.base_price())?;
        draw_comparison(&stable, &volatile, &DrawOutput::Svg("comparison.svg".into()))?;
    }

    Ok(())
}
