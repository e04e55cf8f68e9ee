//! Alert statistics over a rolling window

use super::types::{days_before, Alert, Category, Severity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts of recent alerts by dimension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertStatistics {
    /// Size of the window in days
    pub window_days: u32,
    pub total: usize,
    pub by_type: BTreeMap<Category, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_symbol: BTreeMap<String, usize>,
    pub acknowledged: usize,
}

impl AlertStatistics {
    /// Summarize alerts with `timestamp >= now - window_days`
    pub fn summarize<'a, I>(alerts: I, window_days: u32, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a Alert>,
    {
        let cutoff = days_before(now, window_days);
        let mut stats = Self {
            window_days,
            ..Self::default()
        };

        for alert in alerts.into_iter().filter(|a| a.timestamp >= cutoff) {
            stats.total += 1;
            *stats.by_type.entry(alert.alert_type).or_insert(0) += 1;
            *stats.by_severity.entry(alert.severity).or_insert(0) += 1;
            *stats.by_symbol.entry(alert.symbol.clone()).or_insert(0) += 1;
            if alert.acknowledged {
                stats.acknowledged += 1;
            }
        }

        stats
    }

    /// Alerts in the window not yet acknowledged
    pub fn unacknowledged(&self) -> usize {
        self.total - self.acknowledged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::types::{AlertData, MetricSnapshot, Threshold};
    use chrono::Duration;

    fn alert(
        alert_type: Category,
        severity: Severity,
        symbol: &str,
        age_days: i64,
        now: DateTime<Utc>,
    ) -> Alert {
        let snapshot = MetricSnapshot::new(1.0, 1.0, 1.0, 1.0);
        Alert {
            id: format!("{}-{}", symbol, age_days),
            alert_type,
            level: "high".to_string(),
            severity,
            symbol: symbol.to_string(),
            date: "2024-01-15T00:00:00.000Z".to_string(),
            timestamp: now - Duration::days(age_days),
            message: String::new(),
            value: 1.0,
            threshold: Threshold::Value(1.0),
            data: AlertData::from(&snapshot),
            acknowledged: false,
        }
    }

    #[test]
    fn test_summarize_window() {
        let now = Utc::now();
        let mut acked = alert(Category::Volume, Severity::Medium, "MSFT", 1, now);
        acked.acknowledged = true;

        let alerts = vec![
            alert(Category::Volatility, Severity::High, "AAPL", 0, now),
            alert(Category::Volatility, Severity::Critical, "AAPL", 2, now),
            acked,
            alert(Category::Performance, Severity::High, "AAPL", 30, now),
        ];

        let stats = AlertStatistics::summarize(&alerts, 7, now);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_type[&Category::Volatility], 2);
        assert_eq!(stats.by_type[&Category::Volume], 1);
        assert!(!stats.by_type.contains_key(&Category::Performance));
        assert_eq!(stats.by_severity[&Severity::High], 1);
        assert_eq!(stats.by_severity[&Severity::Critical], 1);
        assert_eq!(stats.by_symbol["AAPL"], 2);
        assert_eq!(stats.by_symbol["MSFT"], 1);
        assert_eq!(stats.acknowledged, 1);
        assert_eq!(stats.unacknowledged(), 2);
    }

    #[test]
    fn test_summarize_window_boundary_inclusive() {
        let now = Utc::now();
        let alerts = vec![alert(Category::Volatility, Severity::High, "AAPL", 7, now)];

        let stats = AlertStatistics::summarize(&alerts, 7, now);
        assert_eq!(stats.total, 1);
    }

    #[test]
    fn test_summarize_huge_window_covers_everything() {
        let now = Utc::now();
        let alerts = vec![
            alert(Category::Volatility, Severity::High, "AAPL", 0, now),
            alert(Category::Volume, Severity::Medium, "MSFT", 36_500, now),
        ];

        let stats = AlertStatistics::summarize(&alerts, u32::MAX, now);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.window_days, u32::MAX);
    }

    #[test]
    fn test_summarize_empty() {
        let alerts: Vec<Alert> = Vec::new();
        let stats = AlertStatistics::summarize(&alerts, 7, Utc::now());
        assert_eq!(stats.total, 0);
        assert!(stats.by_type.is_empty());
        assert_eq!(stats.window_days, 7);
    }
}
