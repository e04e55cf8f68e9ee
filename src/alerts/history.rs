//! Alert history
//!
//! Bounded, newest-first log of every alert fired, persisted after each change.

use super::types::{Alert, Category, Severity};
use crate::storage::{load_record, save_record, Storage, StorageKey};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Default maximum number of alerts kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Conjunctive history filter; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    pub alert_type: Option<Category>,
    pub severity: Option<Severity>,
    pub symbol: Option<String>,
    /// Inclusive lower bound on `timestamp`
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `timestamp`
    pub date_to: Option<DateTime<Utc>>,
    pub acknowledged: Option<bool>,
    /// Cap on the number of results, applied after filtering
    pub limit: Option<usize>,
}

impl HistoryFilter {
    /// Filter matching every alert
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, alert_type: Category) -> Self {
        self.alert_type = Some(alert_type);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_date_from(mut self, from: DateTime<Utc>) -> Self {
        self.date_from = Some(from);
        self
    }

    pub fn with_date_to(mut self, to: DateTime<Utc>) -> Self {
        self.date_to = Some(to);
        self
    }

    pub fn with_acknowledged(mut self, acknowledged: bool) -> Self {
        self.acknowledged = Some(acknowledged);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check whether an alert passes every set filter
    pub fn matches(&self, alert: &Alert) -> bool {
        self.alert_type.map_or(true, |t| alert.alert_type == t)
            && self.severity.map_or(true, |s| alert.severity == s)
            && self.symbol.as_deref().map_or(true, |s| alert.symbol == s)
            && self.date_from.map_or(true, |from| alert.timestamp >= from)
            && self.date_to.map_or(true, |to| alert.timestamp <= to)
            && self.acknowledged.map_or(true, |a| alert.acknowledged == a)
    }
}

/// Persistent alert history
pub struct AlertHistory {
    /// Newest first
    entries: Vec<Alert>,
    capacity: usize,
    storage: Arc<dyn Storage>,
}

impl AlertHistory {
    /// Load stored history with the default capacity
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        Self::load_with_capacity(storage, DEFAULT_HISTORY_CAPACITY)
    }

    /// Load stored history, empty if absent or corrupt
    pub fn load_with_capacity(storage: Arc<dyn Storage>, capacity: usize) -> Self {
        let mut entries: Vec<Alert> =
            load_record(storage.as_ref(), StorageKey::History).unwrap_or_default();
        entries.truncate(capacity);

        Self {
            entries,
            capacity,
            storage,
        }
    }

    /// Maximum number of entries kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Alerts, newest first
    pub fn entries(&self) -> &[Alert] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.entries.iter()
    }

    /// Find an alert by id
    pub fn get(&self, id: &str) -> Option<&Alert> {
        self.entries.iter().find(|a| a.id == id)
    }

    /// Insert at the head, evicting the oldest beyond capacity
    pub fn append(&mut self, alert: Alert) {
        self.entries.insert(0, alert);
        self.entries.truncate(self.capacity);
        self.persist();
    }

    /// Matching alerts, newest first
    pub fn query(&self, filter: &HistoryFilter) -> Vec<Alert> {
        let matching = self.entries.iter().filter(|a| filter.matches(a)).cloned();

        match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        }
    }

    /// Acknowledge an alert; returns false if no alert had that id
    pub fn acknowledge(&mut self, id: &str) -> bool {
        let Some(alert) = self.entries.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        alert.acknowledge();
        self.persist();
        true
    }

    /// Acknowledge every matching alert with a single write.
    ///
    /// Returns the number of alerts matched.
    pub fn acknowledge_all(&mut self, filter: &HistoryFilter) -> usize {
        let limit = filter.limit.unwrap_or(usize::MAX);
        let mut count = 0;

        for alert in self.entries.iter_mut() {
            if count == limit {
                break;
            }
            if filter.matches(alert) {
                alert.acknowledge();
                count += 1;
            }
        }

        if count > 0 {
            self.persist();
        }
        count
    }

    /// Drop entries strictly older than `older_than`, or everything.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&mut self, older_than: Option<DateTime<Utc>>) -> usize {
        let before = self.entries.len();

        match older_than {
            Some(cutoff) => self.entries.retain(|a| a.timestamp >= cutoff),
            None => self.entries.clear(),
        }

        self.persist();
        before - self.entries.len()
    }

    fn persist(&self) {
        save_record(self.storage.as_ref(), StorageKey::History, &self.entries);
    }
}
