//! Tabular export of harvested records.

use crate::error::HarvestError;
use crate::model::AuctionRecord;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output columns, in order.
pub const COLUMNS: [&str; 7] = [
    "symbol",
    "date",
    "auction_type",
    "metric",
    "time",
    "value",
    "label",
];

/// Final destination for a run's records. Called once per run.
pub trait RecordExporter {
    /// Write every record and return where they went.
    fn export(&mut self, records: &[AuctionRecord]) -> Result<PathBuf, HarvestError>;
}

/// Writes a single CSV file, creating its directory if needed.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordExporter for CsvExporter {
    fn export(&mut self, records: &[AuctionRecord]) -> Result<PathBuf, HarvestError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| HarvestError::export(&self.path, e))?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)
            .map_err(|e| HarvestError::export(&self.path, e))?;

        // Header goes out even for an empty run.
        writer
            .write_record(COLUMNS)
            .map_err(|e| HarvestError::export(&self.path, e))?;
        for record in records {
            writer
                .serialize(record)
                .map_err(|e| HarvestError::export(&self.path, e))?;
        }
        writer
            .flush()
            .map_err(|e| HarvestError::export(&self.path, e))?;

        info!("saved {} record(s) to {}", records.len(), self.path.display());
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuctionType, Metric};

    fn record(value: Option<f64>, label: Option<&str>) -> AuctionRecord {
        AuctionRecord {
            symbol: "MMM".to_string(),
            date: "12-03-2024".to_string(),
            auction_type: AuctionType::Closing,
            metric: Metric::PairedQuantity,
            time: "15:50:00".to_string(),
            value,
            label: label.map(String::from),
        }
    }

    #[test]
    fn test_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/auctions.csv");
        let mut exporter = CsvExporter::new(&path);

        let written = exporter
            .export(&[record(Some(1500.0), Some("1.5K")), record(None, None)])
            .unwrap();
        assert_eq!(written, path);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "symbol,date,auction_type,metric,time,value,label");
        assert_eq!(lines[1], "MMM,12-03-2024,closing,paired_quantity,15:50:00,1500.0,1.5K");
        assert_eq!(lines[2], "MMM,12-03-2024,closing,paired_quantity,15:50:00,,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_run_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        CsvExporter::new(&path).export(&[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), COLUMNS.join(","));
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the parent directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let err = CsvExporter::new(blocker.join("out.csv"))
            .export(&[])
            .unwrap_err();
        assert!(matches!(err, HarvestError::Export { .. }));
    }
}
