//! Enable, disable and status commands

use crate::alerts::{AlertEngine, HistoryFilter};
use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, StatusView};
use crate::error::Result;
use std::path::Path;

/// Turn alerting on or off
pub fn run_set_enabled(enabled: bool, engine: &mut AlertEngine) -> Result<()> {
    engine.set_enabled(enabled);

    if enabled {
        println!("Alerting enabled");
    } else {
        println!("Alerting disabled");
    }
    Ok(())
}

/// Execute the status command
pub fn run_status(engine: &AlertEngine, data_dir: &Path, format: OutputFormat) -> Result<()> {
    let unacknowledged = HistoryFilter::new().with_acknowledged(false);
    let table = engine.rules().table();

    let status = StatusView {
        enabled: engine.is_enabled(),
        rules: table.len(),
        custom_rules: table.custom.len(),
        history: engine.history().len(),
        history_capacity: engine.history().capacity(),
        unacknowledged: engine.query(&unacknowledged).len(),
        data_dir: data_dir.display().to_string(),
    };

    print_output(&status, format)?;
    Ok(())
}
