//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod check;
pub mod history;
pub mod rules;
pub mod settings;
pub mod watch;

pub use check::run_check;
pub use history::{run_ack, run_clear, run_history, run_stats};
pub use rules::run_rules;
pub use settings::{run_set_enabled, run_status};
pub use watch::run_watch;
