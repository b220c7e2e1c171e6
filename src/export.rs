//! CSV export and import of OHLCV tables.
//!
//! Layout: a `date,open,high,low,close,volume` header, then one row per candle with
//! the date as `YYYY-MM-DD`, prices as plain floats and the volume as an integer.
//!
//! Prices use the shortest representation that reads back to the same `f64`. Magnitudes of
//! `1e16` and above switch to exponent notation without a sign (`1e16`, not `1e+16`).
//!
//! ```text
//! date,open,high,low,close,volume
//! 2026-07-20,45212.78411204,46003.1,44813.52,45523.9,7514
//! ```

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    engine::{Candle, CandleBuilder, OhlcvTable},
    errors::{Error, Result},
};

/// Suggested file name for exports.
pub const DEFAULT_CSV_FILE: &str = "crypto_ohlcv_data.csv";

#[derive(Debug, Serialize, Deserialize)]
struct CsvRecord {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u32,
}

impl From<&Candle> for CsvRecord {
    fn from(candle: &Candle) -> Self {
        Self {
            date: candle.date(),
            open: candle.open(),
            high: candle.high(),
            low: candle.low(),
            close: candle.close(),
            volume: candle.volume(),
        }
    }
}

impl TryFrom<CsvRecord> for Candle {
    type Error = Error;

    fn try_from(record: CsvRecord) -> Result<Self> {
        CandleBuilder::builder()
            .timestamp(record.date.and_time(NaiveTime::MIN).and_utc())
            .open(record.open)
            .high(record.high)
            .low(record.low)
            .close(record.close)
            .volume(record.volume)
            .build()
    }
}

const HEADER: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Writes `table` as CSV. The header is written even for an empty table.
pub fn write_csv<W: Write>(table: &OhlcvTable, writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(HEADER)?;
    for candle in table.iter() {
        writer.serialize(CsvRecord::from(candle))?;
    }
    writer.flush()?;
    Ok(())
}

/// Returns `table` as a CSV document.
pub fn to_csv_string(table: &OhlcvTable) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| Error::InvalidInput(format!("CSV output is not UTF-8: {e}")))
}

/// Writes `table` to the file at `path`, replacing it.
pub fn save_csv(table: &OhlcvTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_csv(table, BufWriter::new(File::create(path)?))?;
    debug!(rows = table.len(), path = %path.display(), "exported OHLCV table");
    Ok(())
}

/// Reads a CSV document back into a table.
///
/// Each row is a candle at midnight UTC of its date. Rows must be strictly increasing
/// by date and keep `low <= open, close <= high`.
pub fn read_csv<R: Read>(reader: R) -> Result<OhlcvTable> {
    let mut reader = csv::Reader::from_reader(reader);
    let candles = reader
        .deserialize::<CsvRecord>()
        .map(|record| Candle::try_from(record?))
        .collect::<Result<Vec<_>>>()?;
    OhlcvTable::try_from(candles)
}

/// Reads the CSV file at `path`.
pub fn load_csv(path: impl AsRef<Path>) -> Result<OhlcvTable> {
    let path = path.as_ref();
    let table = read_csv(BufReader::new(File::open(path)?))?;
    debug!(rows = table.len(), path = %path.display(), "imported OHLCV table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::Simulation, engine::SimulationParameters};
    use chrono::{DateTime, Duration};

    fn candle(day: i64, open: f64, high: f64, low: f64, close: f64, volume: u32) -> Candle {
        CandleBuilder::builder()
            .timestamp(DateTime::from_timestamp(1_704_067_200, 0).unwrap() + Duration::days(day))
            .open(open)
            .high(high)
            .low(low)
            .close(close)
            .volume(volume)
            .build()
            .unwrap()
    }

    #[test]
    fn exact_layout() {
        let table = OhlcvTable::try_from(vec![
            candle(0, 45_000.5, 45_900.0, 44_800.25, 45_000.0, 500),
            candle(1, 101.125, 102.0, 100.0, 100.0, 9_999),
        ])
        .unwrap();
        let text = to_csv_string(&table).unwrap();
        assert_eq!(
            text,
            "date,open,high,low,close,volume\n\
             2024-01-01,45000.5,45900.0,44800.25,45000.0,500\n\
             2024-01-02,101.125,102.0,100.0,100.0,9999\n"
        );
    }

    #[test]
    fn string_matches_written_bytes() {
        let table = OhlcvTable::try_from(vec![candle(0, 1e16, 2e16, 1e16, 1.5e16, 600)]).unwrap();
        let mut bytes = Vec::new();
        write_csv(&table, &mut bytes).unwrap();
        let text = to_csv_string(&table).unwrap();
        assert_eq!(text.as_bytes(), bytes.as_slice());
        assert!(text.ends_with("2024-01-01,1e16,2e16,1e16,1.5e16,600\n"));
        assert_eq!(read_csv(text.as_bytes()).unwrap().closes(), vec![1.5e16]);
    }

    #[test]
    fn header_only_for_empty_table() {
        let text = to_csv_string(&OhlcvTable::default()).unwrap();
        assert_eq!(text, "date,open,high,low,close,volume\n");
        assert!(read_csv(text.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn round_trip() {
        let params = SimulationParameters::default();
        let report = Simulation::from_seed(21).run(&params).unwrap();
        let text = to_csv_string(report.table()).unwrap();
        let parsed = read_csv(text.as_bytes()).unwrap();

        assert_eq!(parsed.len(), report.table().len());
        for (a, b) in parsed.iter().zip(report.table().iter()) {
            assert_eq!(a.date(), b.date());
            assert_eq!(a.open(), b.open());
            assert_eq!(a.high(), b.high());
            assert_eq!(a.low(), b.low());
            assert_eq!(a.close(), b.close());
            assert_eq!(a.volume(), b.volume());
        }
    }

    #[test]
    fn rejects_unordered_rows() {
        let text = "date,open,high,low,close,volume\n\
                    2024-01-02,100.0,101.0,99.0,100.0,500\n\
                    2024-01-01,100.0,101.0,99.0,100.0,500\n";
        assert!(matches!(read_csv(text.as_bytes()).unwrap_err(), Error::InvalidInput(_)));
    }

    #[test]
    fn rejects_broken_bracket() {
        let text = "date,open,high,low,close,volume\n2024-01-01,100.0,99.0,98.0,100.0,500\n";
        assert!(matches!(read_csv(text.as_bytes()).unwrap_err(), Error::InvalidCandle(_)));
    }

    #[test]
    fn rejects_malformed_rows() {
        let text = "date,open,high,low,close,volume\n01/01/2024,100.0,101.0,99.0,100.0,500\n";
        assert!(matches!(read_csv(text.as_bytes()).unwrap_err(), Error::Csv(_)));
        let text = "date,open,high,low,close,volume\n2024-01-01,100.0,101.0,99.0,100.0,12.5\n";
        assert!(read_csv(text.as_bytes()).is_err());
    }

    #[test]
    fn file_round_trip() {
        let table = OhlcvTable::try_from(vec![candle(0, 100.0, 101.0, 99.0, 100.5, 700)]).unwrap();
        let path = std::env::temp_dir().join(format!("cvv-export-{}.csv", std::process::id()));
        save_csv(&table, &path).unwrap();
        let loaded = load_csv(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.closes(), vec![100.5]);
        assert!(matches!(load_csv(&path).unwrap_err(), Error::IoError(_)));
    }
}
