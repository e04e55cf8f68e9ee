//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use crate::alerts::{Category, Condition, HistoryFilter, Metric, Severity, Threshold};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Market metric alerting tool
///
/// Evaluate price, volatility, change and volume snapshots against threshold
/// rules and keep a queryable history of fired alerts.
#[derive(Parser, Debug)]
#[command(name = "marketalert")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "MARKETALERT_CONFIG")]
    pub config: Option<String>,

    /// Directory for persisted rules, history and settings
    #[arg(long, global = true, env = "MARKETALERT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a single snapshot
    Check(CheckArgs),

    /// Evaluate JSON-lines snapshots from stdin and print alerts live
    Watch(WatchArgs),

    /// Show alert history
    History(HistoryArgs),

    /// Acknowledge alerts
    Ack(AckArgs),

    /// Remove alerts from history
    Clear {
        /// Only remove alerts older than this many days
        #[arg(long)]
        older_than_days: Option<u32>,
    },

    /// Show alert statistics
    Stats {
        /// Window size in days (defaults to the configured window)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        days: Option<u32>,
    },

    /// Manage alert rules
    Rules(RulesArgs),

    /// Turn alerting on
    Enable,

    /// Turn alerting off (nothing is evaluated, recorded or notified)
    Disable,

    /// Show whether alerting is enabled and history size
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Asset symbol
    #[arg(short, long)]
    pub symbol: String,

    /// Snapshot date (YYYY-MM-DD or RFC 3339, defaults to now)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Last price
    #[arg(long)]
    pub price: f64,

    /// Traded volume
    #[arg(long)]
    pub volume: f64,

    /// Volatility in percent
    #[arg(long)]
    pub volatility: f64,

    /// Percentage change
    #[arg(long, allow_hyphen_values = true)]
    pub change_percent: f64,

    /// Average volume, enables volume rules
    #[arg(long)]
    pub avg_volume: Option<f64>,
}

/// Arguments for the watch command
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Don't print alerts as they fire, only the final summary
    #[arg(short, long)]
    pub quiet: bool,
}

/// History filter flags shared by `history` and `ack --all`
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Alert type (volatility, performance, volume, price, trend, anomaly, custom)
    #[arg(long = "type")]
    pub alert_type: Option<Category>,

    /// Severity (low, medium, high, critical)
    #[arg(long)]
    pub severity: Option<Severity>,

    /// Asset symbol
    #[arg(long)]
    pub symbol: Option<String>,

    /// Only alerts created at or after this date
    #[arg(long)]
    pub from: Option<String>,

    /// Only alerts created at or before this date (a bare date includes the whole day)
    #[arg(long)]
    pub to: Option<String>,

    /// Only acknowledged alerts
    #[arg(long, conflicts_with = "unacknowledged")]
    pub acknowledged: bool,

    /// Only unacknowledged alerts
    #[arg(long)]
    pub unacknowledged: bool,
}

impl FilterArgs {
    /// Convert into a history filter, parsing date bounds
    pub fn to_filter(&self) -> Result<HistoryFilter, crate::error::DomainError> {
        let acknowledged = match (self.acknowledged, self.unacknowledged) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };

        Ok(HistoryFilter {
            alert_type: self.alert_type,
            severity: self.severity,
            symbol: self.symbol.clone(),
            date_from: self.from.as_deref().map(crate::alerts::parse_date).transpose()?,
            date_to: self.to.as_deref().map(crate::alerts::parse_date_end).transpose()?,
            acknowledged,
            limit: None,
        })
    }
}

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Show at most this many alerts
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for the ack command
#[derive(Args, Debug)]
pub struct AckArgs {
    /// Alert id to acknowledge
    #[arg(required_unless_present = "all")]
    pub id: Option<String>,

    /// Acknowledge every alert matching the filters
    #[arg(long, conflicts_with = "id")]
    pub all: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Arguments for rule management
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommands,
}

/// Rule subcommands
#[derive(Subcommand, Debug)]
pub enum RulesCommands {
    /// List all rules
    List,

    /// Restore the built-in rule table (drops custom rules)
    Reset,

    /// Set a built-in category rule
    Set {
        /// Category (volatility, performance, volume, price, trend, anomaly)
        category: Category,

        /// Level name, unique within the category
        level: String,

        /// Condition (greater_than, less_than, equals, between, percentage_change)
        #[arg(long)]
        condition: Condition,

        /// Threshold, a number or LO,HI for between
        #[arg(long, allow_hyphen_values = true)]
        threshold: Threshold,

        /// Severity for categories without graduated severity
        #[arg(long, default_value = "medium")]
        severity: Severity,
    },

    /// Add or replace a custom rule
    Add {
        /// Unique rule name
        name: String,

        /// Metric (price, volume, volatility, change_percent, volume_ratio)
        #[arg(long)]
        metric: Metric,

        /// Condition (greater_than, less_than, equals, between, percentage_change)
        #[arg(long)]
        condition: Condition,

        /// Threshold, a number or LO,HI for between
        #[arg(long, allow_hyphen_values = true)]
        threshold: Threshold,

        /// Severity
        #[arg(long, default_value = "medium")]
        severity: Severity,
    },

    /// Remove a custom rule
    Remove {
        /// Rule name
        name: String,
    },

    /// Enable a custom rule
    Enable {
        /// Rule name
        name: String,
    },

    /// Disable a custom rule
    Disable {
        /// Rule name
        name: String,
    },
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
