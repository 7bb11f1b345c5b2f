//! Load historical price series from CSV
//!
//! Expected layout is a header row with a date column and a close column:
//!
//! ```text
//! date,close
//! 2015-01-02,23.41
//! 2015-01-05,23.18
//! ```
//!
//! Exports from market-data tools often name the close column `Adj Close`,
//! `adj_close`, `Close` or `Price`; all are accepted. Rows with an empty
//! close are skipped.

use super::estimator::{InstrumentId, PricePoint, PriceSeries};
use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use log::info;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DATE_COLUMNS: &[&str] = &["date", "Date", "DATE"];
// Adjusted closes first
const CLOSE_COLUMNS: &[&str] = &["adj_close", "Adj Close", "adj close", "close", "Close", "price", "Price"];

/// Position of the first header matching any of `aliases`
pub(crate) fn column_index(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h.trim() == *alias))
}

/// Load a price series for `instrument` from a CSV file
pub fn load_price_series<P: AsRef<Path>>(instrument: &str, path: P) -> Result<PriceSeries> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let series = load_price_series_from_reader(instrument, file)?;
    info!(
        "Loaded {} observations for {} from {}",
        series.len(),
        series.instrument(),
        path.display()
    );
    Ok(series)
}

/// Load a price series from any reader producing CSV text
pub fn load_price_series_from_reader<R: Read>(instrument: &str, reader: R) -> Result<PriceSeries> {
    let instrument = InstrumentId::new(instrument)?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let date_idx = column_index(&headers, DATE_COLUMNS).ok_or_else(|| {
        EngineError::invalid_parameters(format!("{instrument}: price file has no date column"))
    })?;
    let close_idx = column_index(&headers, CLOSE_COLUMNS).ok_or_else(|| {
        EngineError::invalid_parameters(format!("{instrument}: price file has no close column"))
    })?;

    let mut points = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let close_raw = record.get(close_idx).unwrap_or("");
        if close_raw.is_empty() {
            continue;
        }
        let date_raw = record.get(date_idx).unwrap_or("");
        // Tolerate timestamps like "2015-01-02 00:00:00"
        let date_part = date_raw.split_whitespace().next().unwrap_or("");
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| {
            EngineError::invalid_parameters(format!("{instrument}: bad date '{date_raw}': {e}"))
        })?;
        let close: f64 = close_raw.parse().map_err(|_| {
            EngineError::invalid_parameters(format!("{instrument}: bad close '{close_raw}' on {date}"))
        })?;
        points.push(PricePoint { date, close });
    }

    if points.is_empty() {
        return Err(EngineError::DataUnavailable(instrument.to_string()));
    }
    PriceSeries::new(instrument, points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_adjusted_close_unsorted() {
        let csv = "Date,Open,Adj Close\n2015-01-05,1,101.0\n2015-01-02,1,100.0\n2015-01-06,1,\n";
        let series = load_price_series_from_reader("AOK", csv.as_bytes()).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].close, 100.0);
        assert_eq!(series.last_close(), Some(101.0));
    }

    #[test]
    fn test_timestamps_accepted() {
        let csv = "date,close\n2015-01-02 00:00:00,10.5\n";
        let series = load_price_series_from_reader("SHY", csv.as_bytes()).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_missing_columns() {
        let csv = "day,value\n2015-01-02,10.5\n";
        let result = load_price_series_from_reader("SHY", csv.as_bytes());
        assert!(matches!(result, Err(EngineError::InvalidParameters(_))));
    }

    #[test]
    fn test_empty_file_is_unavailable() {
        let csv = "date,close\n";
        let result = load_price_series_from_reader("SHY", csv.as_bytes());
        assert!(matches!(result, Err(EngineError::DataUnavailable(_))));
    }

    #[test]
    fn test_blank_instrument() {
        let csv = "date,close\n2015-01-02,10.5\n";
        let result = load_price_series_from_reader(" ", csv.as_bytes());
        assert!(matches!(result, Err(EngineError::InvalidInstrument(_))));
    }
}
