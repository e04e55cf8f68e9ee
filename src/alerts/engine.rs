//! Alert engine
//!
//! Evaluates metric snapshots against the rule table, records fired alerts
//! in the history and publishes them to subscribers.

use super::history::{AlertHistory, HistoryFilter, DEFAULT_HISTORY_CAPACITY};
use super::notifier::{Notifier, SubscriptionBus, SubscriptionId};
use super::rules::RuleStore;
use super::settings::AlertSettings;
use super::stats::AlertStatistics;
use super::types::{
    format_alert_date, generate_alert_id, Alert, AlertData, Category, CustomRule,
    CustomRuleDefinition, MetricSnapshot, Rule, Severity,
};
use crate::error::DomainError;
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Alert engine configuration
#[derive(Debug, Clone)]
pub struct AlertEngineConfig {
    /// Maximum number of alerts to keep in history
    pub max_history: usize,
}

impl Default for AlertEngineConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Alert engine
///
/// Owns the rule store, history, settings and subscription bus. Construct one
/// at startup and pass it to whatever feeds snapshots in.
pub struct AlertEngine {
    rules: RuleStore,
    history: AlertHistory,
    settings: AlertSettings,
    bus: SubscriptionBus,
    storage: Arc<dyn Storage>,
}

impl AlertEngine {
    /// Create an engine over `storage` with default configuration
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_config(storage, AlertEngineConfig::default())
    }

    /// Create an engine, loading rules, history and settings from `storage`
    pub fn with_config(storage: Arc<dyn Storage>, config: AlertEngineConfig) -> Self {
        let rules = RuleStore::load(storage.clone());
        let history = AlertHistory::load_with_capacity(storage.clone(), config.max_history);
        let settings = AlertSettings::load(storage.as_ref());

        log::debug!(
            "Alert engine ready: {} rules, {} alerts in history, enabled={}",
            rules.table().len(),
            history.len(),
            settings.enabled
        );

        Self {
            rules,
            history,
            settings,
            bus: SubscriptionBus::new(),
            storage,
        }
    }

    /// Evaluate a snapshot and record every alert it fires.
    ///
    /// Returns nothing and touches nothing when alerting is disabled or no
    /// snapshot is given. Otherwise each fired alert is appended to the
    /// history and then published, in evaluation order.
    pub fn check_alerts(
        &mut self,
        snapshot: Option<&MetricSnapshot>,
        symbol: &str,
        date: DateTime<Utc>,
    ) -> Vec<Alert> {
        if !self.settings.enabled {
            return Vec::new();
        }
        let Some(snapshot) = snapshot else {
            return Vec::new();
        };

        let alerts = self.evaluate(snapshot, symbol, date);

        for alert in &alerts {
            log::debug!(
                "Alert fired: {} {} {} ({})",
                alert.symbol,
                alert.alert_type,
                alert.level,
                alert.severity
            );
            self.history.append(alert.clone());
            self.bus.publish(alert);
        }

        alerts
    }

    /// Run every applicable rule without side effects
    fn evaluate(&self, snapshot: &MetricSnapshot, symbol: &str, date: DateTime<Utc>) -> Vec<Alert> {
        let date = format_alert_date(date);
        let data = AlertData::from(snapshot);
        let mut alerts = Vec::new();

        for category_rules in &self.rules.table().categories {
            let category = category_rules.category;
            let Some(value) = category.metric().and_then(|m| m.extract(snapshot)) else {
                continue;
            };

            for rule in category_rules.rules.iter().filter(|r| r.evaluate(value)) {
                alerts.push(Alert {
                    id: generate_alert_id(),
                    alert_type: category,
                    level: rule.level.clone(),
                    severity: graduated_severity(category, rule, snapshot),
                    symbol: symbol.to_string(),
                    date: date.clone(),
                    timestamp: Utc::now(),
                    message: rule_message(category, rule, value),
                    value,
                    threshold: rule.threshold.clone(),
                    data: data.clone(),
                    acknowledged: false,
                });
            }
        }

        for rule in self.rules.custom() {
            let Some((value, true)) = rule.evaluate(snapshot) else {
                continue;
            };

            alerts.push(Alert {
                id: generate_alert_id(),
                alert_type: Category::Custom,
                level: rule.name.clone(),
                severity: rule.severity,
                symbol: symbol.to_string(),
                date: date.clone(),
                timestamp: Utc::now(),
                message: custom_message(rule, value),
                value,
                threshold: rule.threshold.clone(),
                data: data.clone(),
                acknowledged: false,
            });
        }

        alerts
    }

    /// Publish an alert to subscribers unless alerting is disabled
    pub fn publish(&self, alert: &Alert) -> usize {
        if !self.settings.enabled {
            return 0;
        }
        self.bus.publish(alert)
    }

    /// Register a listener for freshly fired alerts
    pub fn subscribe(&mut self, listener: Arc<dyn Notifier>) -> SubscriptionId {
        self.bus.subscribe(listener)
    }

    /// Remove a listener
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Whether alerting is enabled
    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Turn alerting on or off (persisted)
    pub fn set_enabled(&mut self, enabled: bool) {
        self.settings.enabled = enabled;
        self.settings.save(self.storage.as_ref());
        log::info!("Alerting {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Current settings
    pub fn settings(&self) -> AlertSettings {
        self.settings
    }

    /// Rule store
    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// Mutable rule store for built-in rule edits
    pub fn rules_mut(&mut self) -> &mut RuleStore {
        &mut self.rules
    }

    /// Register or overwrite a custom rule
    pub fn add_custom_alert(
        &mut self,
        name: &str,
        definition: CustomRuleDefinition,
    ) -> Result<&CustomRule, DomainError> {
        self.rules.add_custom(name, definition)
    }

    /// Remove a custom rule; false if it did not exist
    pub fn remove_custom_alert(&mut self, name: &str) -> bool {
        self.rules.remove_custom(name)
    }

    /// Restore the built-in rule table
    pub fn reset_rules(&mut self) {
        self.rules.set_default();
    }

    /// Alert history
    pub fn history(&self) -> &AlertHistory {
        &self.history
    }

    /// Matching alerts from history, newest first
    pub fn query(&self, filter: &HistoryFilter) -> Vec<Alert> {
        self.history.query(filter)
    }

    /// Acknowledge an alert by id
    pub fn acknowledge(&mut self, id: &str) -> bool {
        self.history.acknowledge(id)
    }

    /// Acknowledge every matching alert
    pub fn acknowledge_all(&mut self, filter: &HistoryFilter) -> usize {
        self.history.acknowledge_all(filter)
    }

    /// Prune history, see [`AlertHistory::clear`]
    pub fn clear_history(&mut self, older_than: Option<DateTime<Utc>>) -> usize {
        self.history.clear(older_than)
    }

    /// Statistics over the last `window_days` days
    pub fn statistics(&self, window_days: u32) -> AlertStatistics {
        AlertStatistics::summarize(self.history.iter(), window_days, Utc::now())
    }
}

/// Severity derived from the category and the size of the move.
///
/// Built-in categories grade severity from the level and value so thresholds
/// can be retuned without touching severities; the rest use the rule's own.
fn graduated_severity(category: Category, rule: &Rule, snapshot: &MetricSnapshot) -> Severity {
    match category {
        Category::Volatility if rule.level == "critical" => Severity::Critical,
        Category::Volatility => Severity::High,
        Category::Performance if rule.level.contains("extreme") => Severity::Critical,
        Category::Performance if snapshot.change_percent.abs() > 10.0 => Severity::High,
        Category::Performance => Severity::Medium,
        Category::Volume => Severity::Medium,
        _ => rule.severity,
    }
}

fn level_title(level: &str) -> String {
    let level = level.replace('_', " ");
    let mut chars = level.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn rule_message(category: Category, rule: &Rule, value: f64) -> String {
    let level = level_title(&rule.level);
    let threshold = &rule.threshold;

    match category {
        Category::Volatility => format!(
            "{} volatility alert: {:.2}% (threshold: {}%)",
            level, value, threshold
        ),
        Category::Performance => format!(
            "{} performance alert: {:+.2}% change (threshold: {}%)",
            level, value, threshold
        ),
        Category::Volume => format!(
            "{} volume alert: {:.2}x average volume (threshold: {}x)",
            level, value, threshold
        ),
        _ => format!(
            "{} {} alert: {} = {:.2} ({} {})",
            level,
            category,
            category.metric().map(|m| m.as_str()).unwrap_or("value"),
            value,
            rule.condition.symbol(),
            threshold
        ),
    }
}

fn custom_message(rule: &CustomRule, value: f64) -> String {
    format!(
        "Custom alert '{}': {} = {:.2} ({} {})",
        rule.name,
        rule.metric,
        value,
        rule.condition.symbol(),
        rule.threshold
    )
}
