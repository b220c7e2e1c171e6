//! Module for rendering OHLCV tables and asset comparisons as charts.

use std::path::{Path, PathBuf};

use chrono::Duration;
use plotters::backend::{BitMapBackend, DrawingBackend, SVGBackend};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::WHITE;
use tracing::debug;

use crate::PercentCalculus;
use crate::engine::{Candle, OhlcvTable, PricePoint};
use crate::errors::{Error, Result};

/// Aspect ratio for the generated charts.
const ASPECT_RATIO: f64 = 0.5625;
/// Size of the X-axis labels.
const X_LABEL_SIZE: i32 = 20;
/// Size of the Y-axis labels.
const Y_LABEL_SIZE: i32 = 20;

/// Output formats for the generated charts with output filename.
#[derive(Debug, Clone)]
pub enum DrawOutput {
    /// Save to the output SVG file.
    Svg(PathBuf),
    /// Save to the output PNG file.
    Png(PathBuf),
}

impl DrawOutput {
    /// Picks the format from the file extension: `.svg` for SVG, PNG otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => Self::Svg(path.to_path_buf()),
            _ => Self::Png(path.to_path_buf()),
        }
    }

    fn path(&self) -> &Path {
        match self {
            Self::Svg(path) | Self::Png(path) => path,
        }
    }
}

/// Configuration options for chart generation.
#[derive(Debug, Clone)]
pub struct DrawOptions {
    /// Chart title.
    title: Option<String>,
    /// Output format and path.
    output: DrawOutput,
    /// Whether to show the volume chart.
    show_volume: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            title: None,
            output: DrawOutput::Png(PathBuf::from("chart.png")),
            show_volume: true,
        }
    }
}

impl DrawOptions {
    /// Sets the chart title.
    pub fn title(mut self, title: impl ToString) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Sets the output format and path.
    pub fn draw_output(mut self, output: DrawOutput) -> Self {
        self.output = output;
        self
    }

    /// Enables or disables the volume chart.
    pub fn show_volume(mut self, show: bool) -> Self {
        self.show_volume = show;
        self
    }
}

fn plotters_error(e: impl ToString) -> Error {
    Error::Plotters(e.to_string())
}

/// Candlestick chart of an OHLCV table.
pub struct Draw<'d> {
    /// Reference to the table to draw.
    table: &'d OhlcvTable,
    /// Drawing options.
    options: DrawOptions,
}

impl<'d> Draw<'d> {
    /// Creates a new `Draw` instance with the given table.
    pub fn with_table(table: &'d OhlcvTable) -> Self {
        Self {
            table,
            options: DrawOptions::default(),
        }
    }

    /// Sets the drawing options.
    pub fn with_options(mut self, options: DrawOptions) -> Self {
        self.options = options;
        self
    }

    /// Generates and saves the chart based on the configured options.
    pub fn plot(&self) -> Result<()> {
        let candles = self.table.iter().collect::<Vec<_>>();
        if candles.is_empty() {
            return Err(Error::InvalidInput("cannot draw an empty table".to_string()));
        }

        let title = self.options.title.as_deref().unwrap_or("Simulated Market");
        let height_factor = if self.options.show_volume { 1.4 } else { 1.0 };
        let width = 1280.max(10 * candles.len() as u32);
        let height = ((width as f64 * ASPECT_RATIO * height_factor) as u32).min(900);

        match &self.options.output {
            DrawOutput::Svg(path) => {
                let root = SVGBackend::new(path, (width, height)).into_drawing_area();
                root.fill(&WHITE).map_err(plotters_error)?;
                self.draw_chart(&root, &candles, title)?;
            }
            DrawOutput::Png(path) => {
                let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
                root.fill(&WHITE).map_err(plotters_error)?;
                self.draw_chart(&root, &candles, title)?;
            }
        }
        debug!(path = %self.options.output.path().display(), "chart written");
        Ok(())
    }

    /// Draws the price chart and, when enabled, the volume chart below it.
    fn draw_chart<DB: DrawingBackend>(
        &self,
        drawing_area: &DrawingArea<DB, Shift>,
        candles: &[&Candle],
        title: &str,
    ) -> Result<()> {
        let total_height = drawing_area.dim_in_pixel().1 as f64;
        if self.options.show_volume {
            let (price_area, volume_area) = drawing_area.split_vertically((total_height * 0.75) as u32);
            self.draw_price_chart(&price_area, candles, title)?;
            self.draw_volume_chart(&volume_area, candles)?;
        } else {
            self.draw_price_chart(drawing_area, candles, title)?;
        }
        drawing_area.present().map_err(plotters_error)
    }

    /// Draws the price chart (candlesticks).
    fn draw_price_chart<DB: DrawingBackend>(
        &self,
        drawing_area: &DrawingArea<DB, Shift>,
        candles: &[&Candle],
        title: &str,
    ) -> Result<()> {
        let min_price = candles.iter().map(|c| c.low()).fold(f64::INFINITY, f64::min);
        let max_price = candles.iter().map(|c| c.high()).fold(f64::NEG_INFINITY, f64::max);
        let first_time = candles.first().ok_or_else(|| Error::InvalidInput("no candle".to_string()))?.timestamp();
        let last_time = candles.last().ok_or_else(|| Error::InvalidInput("no candle".to_string()))?.timestamp() + Duration::days(1);

        let (top, bottom) = if self.options.show_volume { (0, 0) } else { (10, 10) };
        let drawing_area = drawing_area.margin(top, bottom, 70, 70);
        let mut builder = ChartBuilder::on(&drawing_area);
        if !self.options.show_volume {
            builder.x_label_area_size(X_LABEL_SIZE);
        }

        let mut chart = builder
            .caption(title, ("sans-serif", 30).into_font())
            .y_label_area_size(Y_LABEL_SIZE)
            .build_cartesian_2d(first_time..last_time, min_price.subpercent(5.0)..max_price.addpercent(5.0))
            .map_err(plotters_error)?;

        let x_labels = (candles.len() / 15).max(2);
        {
            let mut mesh = chart.configure_mesh();
            mesh.y_desc("Price")
                .y_label_style(("sans-serif", Y_LABEL_SIZE))
                .y_labels(5);

            if self.options.show_volume {
                mesh.disable_x_axis();
            } else {
                mesh.x_desc("Date")
                    .x_label_style(("sans-serif", X_LABEL_SIZE))
                    .x_labels(x_labels);
            }

            mesh.draw().map_err(plotters_error)?;
        }

        let candle_width = {
            let total_width = drawing_area.dim_in_pixel().0 as f64;
            let available_width = total_width - (X_LABEL_SIZE * 2) as f64;
            (available_width / candles.len() as f64 * 0.7).max(2.0) as u32
        };

        chart
            .draw_series(candles.iter().map(|c| {
                let color = if c.is_bullish() { GREEN.filled() } else { RED.filled() };
                CandleStick::new(c.timestamp(), c.open(), c.high(), c.low(), c.close(), color, color, candle_width)
            }))
            .map_err(plotters_error)?;

        Ok(())
    }

    /// Draws the volume chart.
    fn draw_volume_chart<DB: DrawingBackend>(&self, drawing_area: &DrawingArea<DB, Shift>, candles: &[&Candle]) -> Result<()> {
        let max_volume = candles.iter().map(|c| c.volume() as f64).fold(0.0, f64::max);
        let first_time = candles.first().ok_or_else(|| Error::InvalidInput("no candle".to_string()))?.timestamp();
        let last_time = candles.last().ok_or_else(|| Error::InvalidInput("no candle".to_string()))?.timestamp() + Duration::days(1);
        let drawing_area = drawing_area.margin(0, 10, 70, 70);

        let mut chart = ChartBuilder::on(&drawing_area)
            .x_label_area_size(X_LABEL_SIZE)
            .y_label_area_size(Y_LABEL_SIZE)
            .build_cartesian_2d(first_time..last_time, 0.0..max_volume.addpercent(10.0))
            .map_err(plotters_error)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Volume")
            .x_label_style(("sans-serif", X_LABEL_SIZE))
            .y_label_style(("sans-serif", Y_LABEL_SIZE))
            .x_labels((candles.len() / 15).max(2))
            .y_labels(3)
            .draw()
            .map_err(plotters_error)?;

        chart
            .draw_series(candles.iter().map(|c| {
                let x = c.timestamp();
                let color = if c.is_bullish() { GREEN.mix(0.4) } else { RED.mix(0.4) };
                Rectangle::new([(x, 0.0), (x + Duration::hours(20), c.volume() as f64)], color.filled())
            }))
            .map(|_| ())
            .map_err(plotters_error)
    }
}

/// Draws the stable and the volatile close series on one line chart.
pub fn draw_comparison(stable: &[PricePoint], volatile: &[PricePoint], output: &DrawOutput) -> Result<()> {
    if stable.is_empty() || volatile.is_empty() {
        return Err(Error::InvalidInput("cannot draw empty series".to_string()));
    }

    match output {
        DrawOutput::Svg(path) => draw_lines(SVGBackend::new(path, (1280, 720)).into_drawing_area(), stable, volatile)?,
        DrawOutput::Png(path) => draw_lines(BitMapBackend::new(path, (1280, 720)).into_drawing_area(), stable, volatile)?,
    }
    debug!(path = %output.path().display(), "comparison chart written");
    Ok(())
}

fn draw_lines<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, stable: &[PricePoint], volatile: &[PricePoint]) -> Result<()> {
    let all = || stable.iter().chain(volatile);
    let first_time = all().map(PricePoint::timestamp).min().ok_or_else(|| Error::InvalidInput("no point".to_string()))?;
    let last_time = all().map(PricePoint::timestamp).max().ok_or_else(|| Error::InvalidInput("no point".to_string()))?;
    let min_price = all().map(PricePoint::close).fold(f64::INFINITY, f64::min);
    let max_price = all().map(PricePoint::close).fold(f64::NEG_INFINITY, f64::max);

    root.fill(&WHITE).map_err(plotters_error)?;
    let area = root.margin(10, 10, 40, 40);
    let mut chart = ChartBuilder::on(&area)
        .caption("Stable vs Volatile Asset", ("sans-serif", 30).into_font())
        .x_label_area_size(X_LABEL_SIZE * 2)
        .y_label_area_size(Y_LABEL_SIZE * 3)
        .build_cartesian_2d(first_time..last_time + Duration::days(1), min_price.subpercent(5.0)..max_price.addpercent(5.0))
        .map_err(plotters_error)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Price")
        .draw()
        .map_err(plotters_error)?;

    for (name, series, color) in [("Stable Asset", stable, GREEN), ("Volatile Asset", volatile, RED)] {
        chart
            .draw_series(LineSeries::new(series.iter().map(|p| (p.timestamp(), p.close())), color.stroke_width(2)))
            .map_err(plotters_error)?
            .label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plotters_error)?;
    root.present().map_err(plotters_error)
}
