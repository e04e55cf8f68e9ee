//! Alert system domain types
//!
//! Defines the rule, condition, snapshot and alert types used by the engine.

use crate::error::DomainError;
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Low,
    /// Worth a look
    Medium,
    /// Significant move
    High,
    /// Requires attention now
    Critical,
}

impl Severity {
    /// All severities, lowest first
    pub const ALL: [Severity; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Lowercase name as used in storage and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.pad("LOW"),
            Self::Medium => f.pad("MEDIUM"),
            Self::High => f.pad("HIGH"),
            Self::Critical => f.pad("CRITICAL"),
        }
    }
}

impl FromStr for Severity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(DomainError::UnknownSeverity(s.to_string())),
        }
    }
}

/// Rule category, also the `type` of the alerts it produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Volatility,
    Performance,
    Volume,
    Price,
    Trend,
    Anomaly,
    /// User-defined rules, keyed by name
    Custom,
}

impl Category {
    /// Categories evaluated from the rule table, in evaluation order
    pub const BUILT_IN: [Category; 6] = [
        Self::Volatility,
        Self::Performance,
        Self::Volume,
        Self::Price,
        Self::Trend,
        Self::Anomaly,
    ];

    /// Snapshot metric read by rules in this category
    ///
    /// Custom rules name their own metric, so `Custom` has none.
    pub fn metric(&self) -> Option<Metric> {
        match self {
            Self::Volatility | Self::Anomaly => Some(Metric::Volatility),
            Self::Performance | Self::Trend => Some(Metric::ChangePercent),
            Self::Volume => Some(Metric::VolumeRatio),
            Self::Price => Some(Metric::Price),
            Self::Custom => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Volatility => "volatility",
            Self::Performance => "performance",
            Self::Volume => "volume",
            Self::Price => "price",
            Self::Trend => "trend",
            Self::Anomaly => "anomaly",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "volatility" => Ok(Self::Volatility),
            "performance" => Ok(Self::Performance),
            "volume" => Ok(Self::Volume),
            "price" => Ok(Self::Price),
            "trend" => Ok(Self::Trend),
            "anomaly" => Ok(Self::Anomaly),
            "custom" => Ok(Self::Custom),
            _ => Err(DomainError::UnknownCategory(s.to_string())),
        }
    }
}

/// Snapshot field a rule is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Price,
    Volume,
    Volatility,
    ChangePercent,
    /// `volume / avg_volume`
    VolumeRatio,
}

impl Metric {
    /// Read this metric from a snapshot, `None` when it cannot be computed
    pub fn extract(&self, snapshot: &MetricSnapshot) -> Option<f64> {
        match self {
            Self::Price => Some(snapshot.price),
            Self::Volume => Some(snapshot.volume),
            Self::Volatility => Some(snapshot.volatility),
            Self::ChangePercent => Some(snapshot.change_percent),
            Self::VolumeRatio => snapshot.volume_ratio(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Volume => "volume",
            Self::Volatility => "volatility",
            Self::ChangePercent => "change_percent",
            Self::VolumeRatio => "volume_ratio",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "price" => Ok(Self::Price),
            "volume" => Ok(Self::Volume),
            "volatility" => Ok(Self::Volatility),
            "change_percent" | "changepercent" => Ok(Self::ChangePercent),
            "volume_ratio" => Ok(Self::VolumeRatio),
            _ => Err(DomainError::UnknownMetric(s.to_string())),
        }
    }
}

/// Rule threshold: a single value, or a list for range conditions
///
/// Lists of any length deserialize so that a malformed range can be
/// stored and simply never fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Value(f64),
    List(Vec<f64>),
}

impl Threshold {
    /// Inclusive `[lo, hi]` range
    pub fn range(lo: f64, hi: f64) -> Self {
        Self::List(vec![lo, hi])
    }

    /// The scalar threshold, if this is one
    pub fn as_value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::List(_) => None,
        }
    }

    /// The `(lo, hi)` pair, if this is a two-element list
    pub fn as_pair(&self) -> Option<(f64, f64)> {
        match self {
            Self::List(values) if values.len() == 2 => Some((values[0], values[1])),
            _ => None,
        }
    }
}

impl From<f64> for Threshold {
    fn from(value: f64) -> Self {
        Self::Value(value)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}", v),
            Self::List(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl FromStr for Threshold {
    type Err = DomainError;

    /// Parses `15`, `-5`, `10,20` or `10..20`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidThreshold(s.to_string());
        let s = s.trim();

        let parts: Vec<&str> = if s.contains("..") {
            s.split("..").collect()
        } else {
            s.split(',').collect()
        };

        let values = parts
            .iter()
            .map(|p| p.trim().parse::<f64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        match values.as_slice() {
            [v] => Ok(Self::Value(*v)),
            _ => Ok(Self::List(values)),
        }
    }
}

/// Comparison applied between a metric value and a rule threshold
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    /// Value greater than threshold
    GreaterThan,
    /// Value less than threshold
    LessThan,
    /// Value within 0.01 of threshold
    Equals,
    /// Value within the inclusive `[lo, hi]` threshold pair
    Between,
    /// Ratio deviates from 1 by at least as much as the threshold does
    PercentageChange,
    /// Condition name this version does not know; never fires
    Unknown(String),
}

impl Condition {
    /// Tolerance for [`Condition::Equals`]
    pub const EQUALS_EPSILON: f64 = 0.01;

    /// Evaluate condition against a value.
    ///
    /// Malformed combinations (a range condition with a scalar threshold,
    /// a scalar condition with a list, an unknown condition) return false.
    pub fn evaluate(&self, value: f64, threshold: &Threshold) -> bool {
        match self {
            Self::GreaterThan => threshold.as_value().is_some_and(|t| value > t),
            Self::LessThan => threshold.as_value().is_some_and(|t| value < t),
            Self::Equals => threshold
                .as_value()
                .is_some_and(|t| (value - t).abs() < Self::EQUALS_EPSILON),
            Self::Between => threshold
                .as_pair()
                .is_some_and(|(lo, hi)| lo <= value && value <= hi),
            Self::PercentageChange => threshold
                .as_value()
                .is_some_and(|t| (value - 1.0).abs() >= (t - 1.0).abs()),
            Self::Unknown(_) => false,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::Equals => "equals",
            Self::Between => "between",
            Self::PercentageChange => "percentage_change",
            Self::Unknown(name) => name,
        }
    }

    /// Short operator form for messages
    pub fn symbol(&self) -> &str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::Equals => "=",
            Self::Between => "in",
            Self::PercentageChange => "deviates by",
            Self::Unknown(name) => name,
        }
    }
}

impl From<String> for Condition {
    fn from(name: String) -> Self {
        match name.as_str() {
            "greater_than" => Self::GreaterThan,
            "less_than" => Self::LessThan,
            "equals" => Self::Equals,
            "between" => Self::Between,
            "percentage_change" => Self::PercentageChange,
            _ => Self::Unknown(name),
        }
    }
}

impl From<Condition> for String {
    fn from(condition: Condition) -> Self {
        condition.as_str().to_string()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = DomainError;

    /// Strict parse for user input; unknown names are rejected here
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Condition::from(s.to_lowercase().replace('-', "_")) {
            Self::Unknown(_) => Err(DomainError::UnknownCondition(s.to_string())),
            condition => Ok(condition),
        }
    }
}

/// A threshold rule stored under a category and keyed by its level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Level name, unique within the category (e.g. "high", "extreme_bear")
    pub level: String,
    pub threshold: Threshold,
    pub condition: Condition,
    pub severity: Severity,
}

impl Rule {
    /// Create a new rule
    pub fn new(
        level: impl Into<String>,
        threshold: impl Into<Threshold>,
        condition: Condition,
        severity: Severity,
    ) -> Self {
        Self {
            level: level.into(),
            threshold: threshold.into(),
            condition,
            severity,
        }
    }

    /// Evaluate the rule condition against a value
    pub fn evaluate(&self, value: f64) -> bool {
        self.condition.evaluate(value, &self.threshold)
    }
}

/// Fields a caller supplies when registering a custom rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRuleDefinition {
    pub metric: Metric,
    pub threshold: Threshold,
    pub condition: Condition,
    pub severity: Severity,
}

/// User-defined rule in the reserved `custom` category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRule {
    /// Unique user-chosen name
    pub name: String,
    pub metric: Metric,
    pub threshold: Threshold,
    pub condition: Condition,
    pub severity: Severity,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl CustomRule {
    /// Build an enabled custom rule stamped with the current time
    pub fn new(name: impl Into<String>, definition: CustomRuleDefinition) -> Self {
        Self {
            name: name.into(),
            metric: definition.metric,
            threshold: definition.threshold,
            condition: definition.condition,
            severity: definition.severity,
            enabled: true,
            created_at: Utc::now(),
        }
    }

    /// Evaluate the rule against a snapshot, `None` if its metric is unavailable
    pub fn evaluate(&self, snapshot: &MetricSnapshot) -> Option<(f64, bool)> {
        if !self.enabled {
            return None;
        }
        let value = self.metric.extract(snapshot)?;
        Some((value, self.condition.evaluate(value, &self.threshold)))
    }
}

/// One point-in-time set of metrics for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub price: f64,
    pub volume: f64,
    /// Volatility in percent
    pub volatility: f64,
    #[serde(alias = "changePercent")]
    pub change_percent: f64,
    #[serde(default, alias = "avgVolume", skip_serializing_if = "Option::is_none")]
    pub avg_volume: Option<f64>,
}

impl MetricSnapshot {
    /// Create a snapshot without an average volume
    pub fn new(price: f64, volume: f64, volatility: f64, change_percent: f64) -> Self {
        Self {
            price,
            volume,
            volatility,
            change_percent,
            avg_volume: None,
        }
    }

    /// Set average volume
    pub fn with_avg_volume(mut self, avg_volume: f64) -> Self {
        self.avg_volume = Some(avg_volume);
        self
    }

    /// `volume / avg_volume`, only when a non-zero average is known
    pub fn volume_ratio(&self) -> Option<f64> {
        match self.avg_volume {
            Some(avg) if avg != 0.0 => Some(self.volume / avg),
            _ => None,
        }
    }
}

/// Raw snapshot values attached to an alert for later inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertData {
    pub price: f64,
    pub volume: f64,
    pub volatility: f64,
    pub change_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_ratio: Option<f64>,
}

impl From<&MetricSnapshot> for AlertData {
    fn from(snapshot: &MetricSnapshot) -> Self {
        Self {
            price: snapshot.price,
            volume: snapshot.volume,
            volatility: snapshot.volatility,
            change_percent: snapshot.change_percent,
            avg_volume: snapshot.avg_volume,
            volume_ratio: snapshot.volume_ratio(),
        }
    }
}

/// A rule having fired against a snapshot
///
/// Everything except `acknowledged` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique alert ID
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: Category,
    /// Rule level, or custom rule name
    pub level: String,
    pub severity: Severity,
    pub symbol: String,
    /// Snapshot date, see [`format_alert_date`]
    pub date: String,
    /// Creation instant
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub value: f64,
    pub threshold: Threshold,
    pub data: AlertData,
    #[serde(default)]
    pub acknowledged: bool,
}

impl Alert {
    /// Mark alert as acknowledged
    pub fn acknowledge(&mut self) {
        self.acknowledged = true;
    }
}

/// Generate an alert id from the current time and a random suffix
pub fn generate_alert_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .filter_map(|_| std::char::from_digit(rng.gen_range(0..36), 36))
        .collect();
    format!("{}-{}", millis, suffix)
}

/// Canonical fixed-width form of an alert date, e.g. `2024-01-15T00:00:00.000Z`
pub fn format_alert_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `now` minus `days`, saturating at the earliest representable instant
pub fn days_before(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Parse an inclusive upper date bound.
///
/// A bare `YYYY-MM-DD` covers the whole day; RFC 3339 is taken as is.
pub fn parse_date_end(s: &str) -> Result<DateTime<Utc>, DomainError> {
    if let Ok(date) = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
        if let Some(end) = date.and_hms_nano_opt(23, 59, 59, 999_999_999) {
            return Ok(end.and_utc());
        }
    }
    parse_date(s)
}

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, DomainError> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DomainError::InvalidDate(s.to_string()))
}
