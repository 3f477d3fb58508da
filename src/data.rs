//! Loading earnings records and price histories from CSV files.

use crate::error::{EventStudyError, Result};
use crate::types::{EarningsRecord, PriceHistory, PricePoint};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Raw price row; extra provider columns are ignored.
#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(
        alias = "Date",
        alias = "DATE",
        alias = "Timestamp",
        alias = "timestamp"
    )]
    date: String,
    #[serde(
        default,
        alias = "adj_close",
        alias = "Adj Close",
        alias = "Adj_Close"
    )]
    adjusted_close: Option<f64>,
    #[serde(default, alias = "Close")]
    close: Option<f64>,
}

/// Configuration for CSV loading.
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// CSV delimiter byte.
    pub delimiter: u8,
    /// Skip invalid rows instead of failing.
    pub skip_invalid: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            skip_invalid: true,
        }
    }
}

/// Parse a calendar date in one of the accepted layouts.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let formats = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

    for fmt in &formats[1..] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    // The ISO attempt goes last so its error is the one reported.
    Ok(NaiveDate::parse_from_str(s, formats[0])?)
}

fn parse_earnings_row(row: &StringRecord) -> Result<EarningsRecord> {
    let field = |i: usize, name: &str| {
        row.get(i)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EventStudyError::DataError(format!("missing {}", name)))
    };
    let number = |i: usize, name: &str| -> Result<f64> {
        field(i, name)?
            .parse::<f64>()
            .map_err(|e| EventStudyError::DataError(format!("invalid {}: {}", name, e)))
    };

    Ok(EarningsRecord::new(
        field(0, "symbol")?,
        number(1, "EPS estimate")?,
        number(2, "actual EPS")?,
        parse_date(field(3, "earnings date")?)?,
    ))
}

/// Load earnings records from a CSV file with a header row.
///
/// Columns are read by position: symbol, EPS estimate, actual EPS, earnings
/// date. When a symbol appears more than once, the last row wins.
pub fn load_earnings(path: impl AsRef<Path>, config: &DataConfig) -> Result<Vec<EarningsRecord>> {
    let path = path.as_ref();
    info!("Loading earnings records from: {}", path.display());

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(config.delimiter)
        .flexible(true)
        .from_path(path)?;

    let mut records: Vec<EarningsRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0;

    for (row_num, result) in reader.records().enumerate() {
        let parsed = result
            .map_err(EventStudyError::from)
            .and_then(|row| parse_earnings_row(&row));

        let record = match parsed {
            Ok(r) => r,
            Err(e) if config.skip_invalid => {
                debug!("Skipping row {}: {}", row_num + 1, e);
                skipped += 1;
                continue;
            }
            Err(e) => {
                return Err(EventStudyError::DataError(format!(
                    "row {}: {}",
                    row_num + 1,
                    e
                )))
            }
        };

        match positions.get(&record.symbol) {
            Some(&idx) => records[idx] = record,
            None => {
                positions.insert(record.symbol.clone(), records.len());
                records.push(record);
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} invalid earnings rows", skipped);
    }
    info!("Loaded {} earnings records", records.len());
    Ok(records)
}

/// Load a dated price history. Rows may come in any order (providers often
/// send newest first); the result is chronological.
pub fn load_price_history(
    symbol: impl Into<String>,
    path: impl AsRef<Path>,
    config: &DataConfig,
) -> Result<PriceHistory> {
    let symbol = symbol.into();
    let path = path.as_ref();
    debug!("Loading prices for {} from: {}", symbol, path.display());

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(config.delimiter)
        .flexible(true)
        .from_path(path)?;

    let mut points = Vec::new();
    let mut skipped = 0;

    for (row_num, result) in reader.deserialize::<PriceRow>().enumerate() {
        let parsed = result.map_err(EventStudyError::from).and_then(|row| {
            let price = row.adjusted_close.or(row.close).ok_or_else(|| {
                EventStudyError::DataError("no adjusted close or close value".to_string())
            })?;
            Ok(PricePoint::new(parse_date(&row.date)?, price))
        });

        match parsed {
            Ok(point) => points.push(point),
            Err(e) if config.skip_invalid => {
                debug!("Skipping {} row {}: {}", symbol, row_num + 1, e);
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if skipped > 0 {
        warn!("Skipped {} invalid price rows for {}", skipped, symbol);
    }
    Ok(PriceHistory::new(symbol, points))
}

/// Load `<dir>/<SYMBOL>.csv` for each symbol. Missing or unreadable files are
/// logged and left out of the map.
pub fn load_price_dir<'a>(
    dir: impl AsRef<Path>,
    symbols: impl IntoIterator<Item = &'a str>,
    config: &DataConfig,
) -> HashMap<String, PriceHistory> {
    let dir = dir.as_ref();
    let mut histories = HashMap::new();

    for symbol in symbols {
        let path = dir.join(format!("{}.csv", symbol));
        if !path.exists() {
            warn!("No price file for {} at {}", symbol, path.display());
            continue;
        }
        match load_price_history(symbol, &path, config) {
            Ok(history) => {
                histories.insert(symbol.to_string(), history);
            }
            Err(e) => warn!("Failed to load prices for {}: {}", symbol, e),
        }
    }

    info!("Loaded price histories for {} symbols", histories.len());
    histories
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert_eq!(parse_date("2024-05-02").unwrap(), expected);
        assert_eq!(parse_date("05/02/2024").unwrap(), expected);
        assert_eq!(parse_date("2024/05/02").unwrap(), expected);
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_load_earnings() {
        let file = write_temp(
            "symbol,eps_estimate,actual_eps,earnings_date\n\
             AAPL,1.50,1.65,2024-05-02\n\
             MSFT,2.80,2.94,04/25/2024\n\
             BAD,abc,1.0,2024-05-02\n\
             AAPL,1.50,1.40,2024-05-02\n",
        );

        let records = load_earnings(file.path(), &DataConfig::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].symbol, "AAPL");
        assert_eq!(records[0].actual_eps, 1.40);
        assert_eq!(
            records[1].earnings_date,
            NaiveDate::from_ymd_opt(2024, 4, 25).unwrap()
        );
    }

    #[test]
    fn test_load_earnings_strict() {
        let file = write_temp("symbol,est,act,date\nBAD,abc,1.0,2024-05-02\n");
        let config = DataConfig {
            skip_invalid: false,
            ..Default::default()
        };
        assert!(load_earnings(file.path(), &config).is_err());
    }

    #[test]
    fn test_load_price_history_newest_first() {
        let file = write_temp(
            "timestamp,open,high,low,close,adjusted_close,volume\n\
             2024-01-04,1,1,1,11.0,10.5,100\n\
             2024-01-03,1,1,1,10.0,9.5,100\n\
             2024-01-02,1,1,1,9.0,8.5,100\n",
        );

        let history = load_price_history("AAPL", file.path(), &DataConfig::default()).unwrap();
        assert_eq!(history.prices(), vec![8.5, 9.5, 10.5]);
        assert_eq!(history.symbol(), "AAPL");
    }

    #[test]
    fn test_load_price_history_close_fallback() {
        let file = write_temp("Date,Close\n2024-01-02,9.0\n2024-01-03,10.0\n");
        let history = load_price_history("X", file.path(), &DataConfig::default()).unwrap();
        assert_eq!(history.prices(), vec![9.0, 10.0]);
    }

    #[test]
    fn test_load_price_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("AAPL.csv"),
            "date,adj_close\n2024-01-02,100.0\n",
        )
        .unwrap();

        let histories = load_price_dir(dir.path(), ["AAPL", "MSFT"], &DataConfig::default());
        assert_eq!(histories.len(), 1);
        assert!(histories.contains_key("AAPL"));
    }
}
