//! Alert notification system
//!
//! Provides the subscription bus that fans fresh alerts out to listeners,
//! plus terminal and log listeners.

use super::types::{Alert, Category, Severity};
use crate::error::Result;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

/// Notification listener trait
///
/// Report delivery failures through the returned `Result`. Implementations
/// must not panic; the bus only isolates listeners that return `Err`.
pub trait Notifier: Send + Sync {
    /// Deliver a freshly fired alert
    fn notify(&self, alert: &Alert) -> Result<()>;

    /// Listener name for identification
    fn name(&self) -> &str;
}

/// How a notification surface should present an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    /// Icon keyed by alert type
    pub icon: &'static str,
    /// ANSI color keyed by severity
    pub color: &'static str,
    /// Stay on screen until dismissed
    pub persistent: bool,
    /// Auto-dismiss delay for non-persistent notifications
    pub timeout: Option<Duration>,
}

impl Presentation {
    /// Auto-dismiss delay for everything below critical
    pub const AUTO_DISMISS: Duration = Duration::from_secs(5);

    /// Presentation for an alert
    pub fn for_alert(alert: &Alert) -> Self {
        let persistent = alert.severity == Severity::Critical;

        Self {
            icon: Self::icon(alert.alert_type),
            color: Self::color(alert.severity),
            persistent,
            timeout: if persistent {
                None
            } else {
                Some(Self::AUTO_DISMISS)
            },
        }
    }

    fn icon(alert_type: Category) -> &'static str {
        match alert_type {
            Category::Volatility => "⚡",
            Category::Performance => "📈",
            Category::Volume => "📊",
            Category::Price => "💲",
            Category::Trend => "↗",
            Category::Anomaly => "⚠",
            Category::Custom => "🔔",
        }
    }

    fn color(severity: Severity) -> &'static str {
        match severity {
            Severity::Low => "\x1b[36m",             // Cyan
            Severity::Medium => "\x1b[33m",          // Yellow
            Severity::High => "\x1b[31m",            // Red
            Severity::Critical => "\x1b[35m\x1b[1m", // Bold Magenta
        }
    }

    /// Alert message, or a generic line when the message is empty
    pub fn message(alert: &Alert) -> String {
        if alert.message.trim().is_empty() {
            format!("{} alert for {}", alert.alert_type, alert.symbol)
        } else {
            alert.message.clone()
        }
    }
}

/// Terminal/console notifier
///
/// Outputs alerts to stdout/stderr with colored formatting
pub struct TerminalNotifier {
    /// Use stderr instead of stdout
    use_stderr: bool,
    /// Use colors (ANSI escape codes)
    use_colors: bool,
}

impl TerminalNotifier {
    /// Create a new terminal notifier
    pub fn new() -> Self {
        Self {
            use_stderr: true,
            use_colors: Self::supports_color(),
        }
    }

    /// Create a notifier that uses stdout
    pub fn stdout() -> Self {
        Self {
            use_stderr: false,
            use_colors: Self::supports_color(),
        }
    }

    /// Override color detection
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Check if terminal supports colors
    fn supports_color() -> bool {
        std::env::var("TERM")
            .map(|term| term != "dumb")
            .unwrap_or(false)
            && std::env::var_os("NO_COLOR").is_none()
    }

    /// Format alert as a single line
    fn format_alert(&self, alert: &Alert) -> String {
        let presentation = Presentation::for_alert(alert);

        format!(
            "[{}] {} {} {} {}: {}",
            alert.timestamp.format("%H:%M:%S"),
            presentation.icon,
            self.format_severity(alert.severity),
            alert.symbol,
            alert.alert_type,
            Presentation::message(alert)
        )
    }

    /// Format severity with colors
    fn format_severity(&self, severity: Severity) -> String {
        if !self.use_colors {
            return format!("{}", severity);
        }
        format!("{}{}\x1b[0m", Presentation::color(severity), severity)
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, alert: &Alert) -> Result<()> {
        let message = self.format_alert(alert);

        if self.use_stderr {
            let stderr = io::stderr();
            let mut handle = stderr.lock();
            writeln!(handle, "{}", message)?;
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", message)?;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "terminal"
    }
}

/// Forwards alerts to the `log` facade
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, alert: &Alert) -> Result<()> {
        let level = match alert.severity {
            Severity::Low => log::Level::Debug,
            Severity::Medium => log::Level::Info,
            Severity::High | Severity::Critical => log::Level::Warn,
        };
        log::log!(
            level,
            "[{}] {} {}: {}",
            alert.severity,
            alert.symbol,
            alert.alert_type,
            Presentation::message(alert)
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Handle returned by [`SubscriptionBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fan-out of freshly fired alerts to registered listeners
///
/// Owns only the listener handles; alerts are borrowed for delivery.
pub struct SubscriptionBus {
    listeners: Vec<(SubscriptionId, Arc<dyn Notifier>)>,
    next_id: u64,
}

impl SubscriptionBus {
    /// Create a bus with no listeners
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a listener
    pub fn subscribe(&mut self, listener: Arc<dyn Notifier>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        log::debug!("Subscribed {} listener ({:?})", listener.name(), id);
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    /// Deliver an alert to every listener in subscription order.
    ///
    /// A failing listener is logged and skipped. Returns the number of
    /// listeners that accepted the alert.
    pub fn publish(&self, alert: &Alert) -> usize {
        let mut delivered = 0;
        for (_, listener) in &self.listeners {
            match listener.notify(alert) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    log::warn!(
                        "Failed to notify {} of alert {}: {}",
                        listener.name(),
                        alert.id,
                        e
                    );
                }
            }
        }
        delivered
    }

    /// Get number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for SubscriptionBus {
    fn default() -> Self {
        Self::new()
    }
}
