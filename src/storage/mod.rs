//! Prediction history persistence
//!
//! Rows are appended once per successful run. A rerun on the same date does
//! not duplicate rows: records whose (date, symbol) already exist are skipped.

use crate::error::Result;
use crate::types::HistoryRecord;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Append-only store of published predictions
pub trait HistorySink: Send + Sync {
    /// Append records, returning how many were actually written
    fn append(&self, records: &[HistoryRecord]) -> Result<usize>;
}

/// CSV file sink with header `date,symbol,entry_price,predicted_return,settled`
#[derive(Debug, Clone)]
pub struct CsvHistory {
    path: PathBuf,
}

impl CsvHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored records, empty if the file does not exist yet
    pub fn load(&self) -> Result<Vec<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(records)
    }

    fn existing_keys(&self) -> Result<HashSet<(NaiveDate, String)>> {
        Ok(self
            .load()?
            .into_iter()
            .map(|r| (r.date, r.symbol))
            .collect())
    }
}

impl HistorySink for CsvHistory {
    fn append(&self, records: &[HistoryRecord]) -> Result<usize> {
        let mut seen = self.existing_keys()?;
        let fresh: Vec<&HistoryRecord> = records
            .iter()
            .filter(|r| seen.insert((r.date, r.symbol.clone())))
            .collect();

        if fresh.len() < records.len() {
            debug!(
                "Skipping {} history rows already recorded",
                records.len() - fresh.len()
            );
        }
        if fresh.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let write_header = !self.path.exists() || std::fs::metadata(&self.path)?.len() == 0;
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);

        for record in &fresh {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!("Appended {} rows to {}", fresh.len(), self.path.display());
        Ok(fresh.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(day: u32, symbol: &str, price: f64) -> HistoryRecord {
        HistoryRecord {
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            symbol: symbol.to_string(),
            entry_price: price,
            predicted_return: 0.012,
            settled: false,
        }
    }

    #[test]
    fn test_append_creates_file_with_header() {
        let dir = tempdir().unwrap();
        let sink = CsvHistory::new(dir.path().join("nested").join("history.csv"));

        let written = sink.append(&[record(3, "AAA", 10.0), record(3, "BBB", 20.0)]).unwrap();
        assert_eq!(written, 2);

        let text = std::fs::read_to_string(sink.path()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("date,symbol,entry_price,predicted_return,settled"));
        assert_eq!(lines.next(), Some("2025-03-03,AAA,10.0,0.012,false"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_append_keeps_single_header() {
        let dir = tempdir().unwrap();
        let sink = CsvHistory::new(dir.path().join("history.csv"));

        sink.append(&[record(3, "AAA", 10.0)]).unwrap();
        sink.append(&[record(4, "AAA", 11.0)]).unwrap();

        let text = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(text.matches("date,symbol").count(), 1);
        assert_eq!(sink.load().unwrap().len(), 2);
    }

    #[test]
    fn test_same_day_rerun_is_idempotent() {
        let dir = tempdir().unwrap();
        let sink = CsvHistory::new(dir.path().join("history.csv"));

        assert_eq!(sink.append(&[record(3, "AAA", 10.0)]).unwrap(), 1);
        assert_eq!(sink.append(&[record(3, "AAA", 10.5), record(3, "BBB", 5.0)]).unwrap(), 1);

        let stored = sink.load().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].entry_price, 10.0);
        assert_eq!(stored[1].symbol, "BBB");
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let sink = CsvHistory::new(dir.path().join("absent.csv"));
        assert!(sink.load().unwrap().is_empty());
    }
}
