//! CSV file data adapter.
//!
//! One file per security and frequency, named `<CODE>_<frequency>.csv`
//! (e.g. `AAPL_daily.csv`, `AAPL_minute.csv`), with a header row and the
//! columns `timestamp,open,high,low,close,volume`. Timestamps are either
//! `YYYY-MM-DD HH:MM:SS` or a bare `YYYY-MM-DD` date.

use crate::domain::error::LevelsError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::price_window::Frequency;
use crate::domain::security::Security;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str, frequency: Frequency) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", code, frequency.as_str()))
    }

    /// All bars in the file, sorted by timestamp.
    pub fn fetch_bars(&self, code: &str, frequency: Frequency) -> Result<Vec<OhlcvBar>, LevelsError> {
        let path = self.csv_path(code, frequency);
        let content = fs::read_to_string(&path).map_err(|e| LevelsError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| LevelsError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let ts_str = column(&record, 0, "timestamp")?;
            let timestamp = parse_timestamp(ts_str)?;

            bars.push(OhlcvBar {
                code: code.to_string(),
                timestamp,
                open: parse_number(&record, 1, "open")?,
                high: parse_number(&record, 2, "high")?,
                low: parse_number(&record, 3, "low")?,
                close: parse_number(&record, 4, "close")?,
                volume: parse_number(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    /// Codes with a file at `frequency`, sorted.
    pub fn list_symbols(&self, frequency: Frequency) -> Result<Vec<String>, LevelsError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| LevelsError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", frequency.as_str());
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| LevelsError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(code) = name_str.strip_suffix(&suffix) {
                symbols.push(code.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    /// Securities with daily data, numbered from 1 in symbol order.
    pub fn securities(&self) -> Result<Vec<Security>, LevelsError> {
        Ok(self
            .list_symbols(Frequency::Daily)?
            .into_iter()
            .enumerate()
            .map(|(i, code)| Security::new(i as u32 + 1, code))
            .collect())
    }
}

impl DataPort for CsvAdapter {
    fn bars(
        &self,
        security: &Security,
        count: usize,
        frequency: Frequency,
    ) -> Result<Vec<OhlcvBar>, LevelsError> {
        let mut bars = self.fetch_bars(&security.symbol, frequency)?;
        let start = bars.len().saturating_sub(count);
        Ok(bars.split_off(start))
    }
}

fn column<'r>(record: &'r csv::StringRecord, index: usize, name: &str) -> Result<&'r str, LevelsError> {
    record.get(index).ok_or_else(|| LevelsError::Data {
        reason: format!("missing {} column", name),
    })
}

fn parse_number<T>(record: &csv::StringRecord, index: usize, name: &str) -> Result<T, LevelsError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    column(record, index, name)?
        .trim()
        .parse()
        .map_err(|e| LevelsError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, LevelsError> {
    let value = value.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| LevelsError::Data {
            reason: format!("invalid timestamp format: {}", value),
        })
}
