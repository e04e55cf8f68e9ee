//! Alert evaluation and history
//!
//! Threshold rules over market metric snapshots, a bounded alert history and
//! subscriber notification.

mod engine;
mod history;
mod notifier;
mod rules;
mod settings;
mod stats;
mod types;

pub use engine::{AlertEngine, AlertEngineConfig};
pub use history::{AlertHistory, HistoryFilter, DEFAULT_HISTORY_CAPACITY};
pub use notifier::{
    LogNotifier, Notifier, Presentation, SubscriptionBus, SubscriptionId, TerminalNotifier,
};
pub use rules::{CategoryRules, RuleStore, RuleTable};
pub use settings::AlertSettings;
pub use stats::AlertStatistics;
pub use types::{
    days_before, format_alert_date, generate_alert_id, parse_date, parse_date_end, Alert,
    AlertData, Category, Condition, CustomRule, CustomRuleDefinition, Metric, MetricSnapshot,
    Rule, Severity, Threshold,
};
