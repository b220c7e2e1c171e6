use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cvv_rs::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Reference parameter sets.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Stable,
    Volatile,
}

/// Simulate a synthetic crypto market and print its volatility summary.
#[derive(Debug, Parser)]
#[command(name = "cvv", version, about)]
struct Args {
    /// JSON file with the simulation parameters (camelCase keys, missing keys use defaults)
    #[arg(short, long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Start from a reference parameter set
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Number of simulated days
    #[arg(short, long)]
    days: Option<usize>,

    /// Price level the series oscillates around
    #[arg(short, long)]
    base_price: Option<f64>,

    /// Waveform amplitude
    #[arg(short, long)]
    amplitude: Option<f64>,

    /// Waveform cycles over the horizon
    #[arg(short, long)]
    frequency: Option<f64>,

    /// Price change per day
    #[arg(long, allow_negative_numbers = true)]
    drift: Option<f64>,

    /// Standard deviation of the daily shock
    #[arg(short, long)]
    noise: Option<f64>,

    /// Wave pattern: sine, cosine, combined, realistic
    #[arg(short, long)]
    pattern: Option<String>,

    /// Seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the OHLCV table as CSV
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = DEFAULT_CSV_FILE)]
    csv: Option<PathBuf>,

    /// Draw the candlestick chart (.png or .svg)
    #[arg(long, value_name = "PATH")]
    chart: Option<PathBuf>,

    /// Print the close price distribution
    #[arg(long)]
    histogram: bool,

    /// Simulate and compare the stable and volatile reference assets
    #[arg(long)]
    compare: bool,

    /// Draw the comparison chart (.png or .svg)
    #[arg(long, value_name = "PATH", requires = "compare")]
    compare_chart: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    /// Resolves the parameters: config file or preset first, then flag overrides.
    fn parameters(&self) -> Result<SimulationParameters> {
        let base_price = self.base_price.unwrap_or(SimulationParameters::default().base_price());
        let start = match (&self.config, self.preset) {
            (Some(path), _) => {
                let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            (None, Some(Preset::Stable)) => SimulationParameters::stable(base_price)?,
            (None, Some(Preset::Volatile)) => SimulationParameters::volatile(base_price)?,
            (None, None) => SimulationParameters::default(),
        };

        let mut builder = ParametersBuilder::from(start);
        if let Some(days) = self.days {
            builder = builder.horizon_days(days);
        }
        if let Some(price) = self.base_price {
            builder = builder.base_price(price);
        }
        if let Some(amplitude) = self.amplitude {
            builder = builder.amplitude(amplitude);
        }
        if let Some(frequency) = self.frequency {
            builder = builder.frequency(frequency);
        }
        if let Some(drift) = self.drift {
            builder = builder.drift(drift);
        }
        if let Some(noise) = self.noise {
            builder = builder.noise(noise);
        }
        if let Some(pattern) = &self.pattern {
            builder = builder.pattern(pattern.as_str());
        }
        Ok(builder.build()?)
    }

    fn simulation(&self) -> Simulation {
        match self.seed {
            Some(seed) => Simulation::from_seed(seed),
            None => Simulation::from_os_rng(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cvv_rs=info,cvv=info")))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let params = args.parameters()?;
    info!(
        days = params.horizon_days(),
        base_price = params.base_price(),
        pattern = %params.pattern(),
        "simulating"
    );

    let mut simulation = args.simulation();
    let report = simulation.run(&params)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(report.summary())?);
    } else {
        println!("{}", report.summary());
    }

    if args.histogram {
        let histogram = Histogram::try_from(report.table())?;
        println!("=== Close Distribution ===");
        for (lo, hi, count) in histogram.buckets() {
            println!("{lo:>12.2} - {hi:>12.2} | {count:>4} {}", "#".repeat(count));
        }
    }

    if let Some(path) = &args.csv {
        save_csv(report.table(), path)?;
        info!(path = %path.display(), rows = report.table().len(), "csv written");
    }

    if let Some(path) = &args.chart {
        let options = DrawOptions::default()
            .title(format!("{} pattern, {} days", params.pattern(), params.horizon_days()))
            .draw_output(DrawOutput::from_path(path));
        Draw::with_table(report.table()).with_options(options).plot()?;
        info!(path = %path.display(), "chart written");
    }

    if args.compare {
        let (stable, volatile) = simulation.compare_series(params.base_price())?;
        let comparison = Comparison::new(
            SeriesStats::try_from(stable.as_slice())?,
            SeriesStats::try_from(volatile.as_slice())?,
        );
        if args.json {
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        } else {
            println!("{comparison}");
        }
        if let Some(path) = &args.compare_chart {
            draw_comparison(&stable, &volatile, &DrawOutput::from_path(path))?;
            info!(path = %path.display(), "comparison chart written");
        }
    }

    if report.summary().volatility_level() == VolatilityLevel::High {
        warn!(std_dev = report.summary().std_dev_close(), "high volatility series");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_preset() {
        let args = Args::parse_from(["cvv", "--preset", "volatile", "--days", "30", "--pattern", "Cosine Wave (Phase Shift)"]);
        let params = args.parameters().unwrap();
        assert_eq!(params.horizon_days(), 30);
        assert_eq!(params.noise(), 5_000.0);
        assert_eq!(params.pattern(), Pattern::Cosine);
    }

    #[test]
    fn negative_drift() {
        let args = Args::parse_from(["cvv", "--drift", "-25"]);
        assert_eq!(args.parameters().unwrap().drift(), -25.0);
    }

    #[test]
    fn invalid_flags_fail() {
        let args = Args::parse_from(["cvv", "--days", "0"]);
        assert!(args.parameters().is_err());
    }

    #[test]
    fn csv_flag_default_path() {
        let args = Args::parse_from(["cvv", "--csv"]);
        assert_eq!(args.csv, Some(PathBuf::from(DEFAULT_CSV_FILE)));
    }

    #[test]
    fn compare_chart_requires_compare() {
        assert!(Args::try_parse_from(["cvv", "--compare-chart", "out.svg"]).is_err());
    }
}
