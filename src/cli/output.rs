//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::alerts::{Alert, AlertStatistics, RuleTable};
use crate::cli::args::OutputFormat;
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

/// List of alerts for display
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct AlertList {
    pub alerts: Vec<Alert>,
}

impl TableDisplay for AlertList {
    fn to_table(&self) -> String {
        if self.alerts.is_empty() {
            return "No alerts".to_string();
        }

        let mut output = format!(
            "{:<24} {:<20} {:<8} {:<12} {:<9} {}\n",
            "ID", "TIME", "SYMBOL", "TYPE", "SEVERITY", "MESSAGE"
        );
        output.push_str(&format!("{:-<100}\n", ""));

        for alert in &self.alerts {
            let ack = if alert.acknowledged { "✓ " } else { "" };
            output.push_str(&format!(
                "{:<24} {:<20} {:<8} {:<12} {:<9} {}{}\n",
                alert.id,
                alert.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                alert.symbol,
                alert.alert_type,
                alert.severity,
                ack,
                alert.message
            ));
        }

        output.push_str(&format!("\n{} alert(s)", self.alerts.len()));
        output
    }

    fn to_compact(&self) -> String {
        self.alerts
            .iter()
            .map(|a| format!("{}:{}:{}:{}", a.symbol, a.alert_type, a.level, a.severity))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl TableDisplay for RuleTable {
    fn to_table(&self) -> String {
        let mut output = String::from("Rules\n");
        output.push_str(&format!("{:-<70}\n", ""));

        for category in &self.categories {
            output.push_str(&format!("{}\n", category.category));
            for rule in &category.rules {
                output.push_str(&format!(
                    "  {:<14} {:<18} {:<12} {}\n",
                    rule.level,
                    rule.condition,
                    rule.threshold.to_string(),
                    rule.severity
                ));
            }
        }

        if !self.custom.is_empty() {
            output.push_str("custom\n");
            for rule in &self.custom {
                let status = if rule.enabled { "✓" } else { "✗" };
                output.push_str(&format!(
                    "  {} {:<12} {:<14} {:<18} {:<12} {}\n",
                    status,
                    rule.name,
                    rule.metric,
                    rule.condition,
                    rule.threshold.to_string(),
                    rule.severity
                ));
            }
        }

        output.push_str(&format!("{:-<70}\n", ""));
        output.push_str(&format!("Total rules: {}", self.len()));
        output
    }

    fn to_compact(&self) -> String {
        let builtin = self.categories.iter().flat_map(|c| {
            c.rules
                .iter()
                .map(move |r| format!("{}.{}", c.category, r.level))
        });
        let custom = self.custom.iter().map(|r| format!("custom.{}", r.name));
        builtin.chain(custom).collect::<Vec<_>>().join(", ")
    }
}

impl TableDisplay for AlertStatistics {
    fn to_table(&self) -> String {
        let mut output = format!("Alerts in the last {} day(s): {}\n", self.window_days, self.total);
        output.push_str(&format!(
            "Acknowledged: {} (unacknowledged: {})\n",
            self.acknowledged,
            self.unacknowledged()
        ));

        output.push_str("\nBy type:\n");
        for (alert_type, count) in &self.by_type {
            output.push_str(&format!("  {:<12} {}\n", alert_type, count));
        }

        output.push_str("\nBy severity:\n");
        for (severity, count) in self.by_severity.iter().rev() {
            output.push_str(&format!("  {:<12} {}\n", severity, count));
        }

        output.push_str("\nBy symbol:\n");
        for (symbol, count) in &self.by_symbol {
            output.push_str(&format!("  {:<12} {}\n", symbol, count));
        }

        output.trim_end().to_string()
    }

    fn to_compact(&self) -> String {
        format!(
            "total={} acknowledged={} days={}",
            self.total, self.acknowledged, self.window_days
        )
    }
}

/// Engine status for display
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub enabled: bool,
    pub rules: usize,
    pub custom_rules: usize,
    pub history: usize,
    pub history_capacity: usize,
    pub unacknowledged: usize,
    pub data_dir: String,
}

impl TableDisplay for StatusView {
    fn to_table(&self) -> String {
        format!(
            "Alerting: {}\nRules: {} ({} custom)\nHistory: {}/{} ({} unacknowledged)\nData directory: {}",
            if self.enabled { "enabled" } else { "disabled" },
            self.rules,
            self.custom_rules,
            self.history,
            self.history_capacity,
            self.unacknowledged,
            self.data_dir
        )
    }

    fn to_compact(&self) -> String {
        format!(
            "enabled={} rules={} history={}",
            self.enabled, self.rules, self.history
        )
    }
}
