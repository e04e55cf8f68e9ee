//! Snapshot ingestion
//!
//! Feeds JSON-lines metric snapshots into the alert engine.

use crate::alerts::{parse_date, Alert, AlertEngine, MetricSnapshot};
use crate::error::Result;
use chrono::Utc;
use serde::Deserialize;
use std::io::BufRead;

/// One input line: a snapshot tagged with its symbol and date
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotRecord {
    pub symbol: String,
    /// `YYYY-MM-DD` or RFC 3339; defaults to the time of ingestion
    #[serde(default)]
    pub date: Option<String>,
    #[serde(flatten)]
    pub snapshot: MetricSnapshot,
}

/// Totals for one ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Snapshots evaluated
    pub snapshots: usize,
    /// Alerts fired across all snapshots
    pub alerts: usize,
    /// Lines that could not be parsed
    pub skipped: usize,
}

/// Drives an [`AlertEngine`] from a stream of snapshot records
pub struct IngestService<'a> {
    engine: &'a mut AlertEngine,
    summary: IngestSummary,
}

impl<'a> IngestService<'a> {
    /// Create a service feeding `engine`
    pub fn new(engine: &'a mut AlertEngine) -> Self {
        Self {
            engine,
            summary: IngestSummary::default(),
        }
    }

    /// Evaluate one parsed record
    pub fn ingest_record(&mut self, record: &SnapshotRecord) -> Result<Vec<Alert>> {
        let date = match record.date.as_deref() {
            Some(date) => parse_date(date)?,
            None => Utc::now(),
        };

        let alerts = self
            .engine
            .check_alerts(Some(&record.snapshot), &record.symbol, date);

        self.summary.snapshots += 1;
        self.summary.alerts += alerts.len();
        Ok(alerts)
    }

    /// Evaluate one input line; blank lines are ignored, bad lines skipped
    pub fn ingest_line(&mut self, line: &str) -> Vec<Alert> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }

        let record: SnapshotRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping malformed snapshot: {}", e);
                self.summary.skipped += 1;
                return Vec::new();
            }
        };

        match self.ingest_record(&record) {
            Ok(alerts) => alerts,
            Err(e) => {
                log::warn!("Skipping snapshot for {}: {}", record.symbol, e);
                self.summary.skipped += 1;
                Vec::new()
            }
        }
    }

    /// Consume every line of `reader`
    pub fn run<R: BufRead>(mut self, reader: R) -> Result<IngestSummary> {
        for line in reader.lines() {
            self.ingest_line(&line?);
        }
        Ok(self.summary)
    }

    /// Totals so far
    pub fn summary(&self) -> IngestSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::Category;
    use crate::storage::MemoryStorage;
    use std::io::Cursor;
    use std::sync::Arc;

    fn engine() -> AlertEngine {
        AlertEngine::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_record_accepts_camel_case() {
        let record: SnapshotRecord = serde_json::from_str(
            r#"{"symbol":"AAPL","date":"2024-01-15","price":1,"volume":300,"volatility":2,"changePercent":0,"avgVolume":100}"#,
        )
        .unwrap();
        assert_eq!(record.symbol, "AAPL");
        assert_eq!(record.snapshot.avg_volume, Some(100.0));
    }

    #[test]
    fn test_run_counts() {
        let mut engine = engine();
        let input = [
            r#"{"symbol":"AAPL","date":"2024-01-15","price":190,"volume":300,"volatility":26,"change_percent":0,"avg_volume":100}"#,
            "",
            "not json",
            r#"{"symbol":"MSFT","date":"yesterday","price":1,"volume":1,"volatility":1,"change_percent":0}"#,
            r#"{"symbol":"MSFT","price":410,"volume":1,"volatility":1,"change_percent":0}"#,
        ]
        .join("\n");

        let summary = IngestService::new(&mut engine)
            .run(Cursor::new(input))
            .unwrap();

        assert_eq!(
            summary,
            IngestSummary {
                snapshots: 2,
                alerts: 4,
                skipped: 2,
            }
        );
        assert_eq!(engine.history().len(), 4);
    }

    #[test]
    fn test_ingest_line_returns_alerts() {
        let mut engine = engine();
        let mut service = IngestService::new(&mut engine);

        let alerts = service.ingest_line(
            r#"{"symbol":"TSLA","date":"2024-03-01T15:30:00Z","price":200,"volume":1,"volatility":1,"change_percent":-16}"#,
        );
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.alert_type == Category::Performance));
        assert_eq!(alerts[0].date, "2024-03-01T15:30:00.000Z");
        assert_eq!(service.summary().snapshots, 1);
    }
}
