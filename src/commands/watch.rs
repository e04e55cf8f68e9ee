//! Watch command implementation
//!
//! Streams JSON-lines snapshots from stdin through the engine.

use crate::alerts::{AlertEngine, LogNotifier, TerminalNotifier};
use crate::cli::args::WatchArgs;
use crate::config::Config;
use crate::error::Result;
use crate::services::IngestService;
use std::io;
use std::sync::Arc;

/// Execute the watch command
pub fn run_watch(args: &WatchArgs, engine: &mut AlertEngine, config: &Config) -> Result<()> {
    if !engine.is_enabled() {
        eprintln!("Alerting is disabled, snapshots will not be evaluated");
    }

    let log_subscription = engine.subscribe(Arc::new(LogNotifier));
    let subscription = if !args.quiet && config.alerts.notify_terminal {
        let mut notifier = TerminalNotifier::stdout();
        if let Some(use_colors) = config.alerts.use_colors {
            notifier = notifier.with_colors(use_colors);
        }
        Some(engine.subscribe(Arc::new(notifier)))
    } else {
        None
    };

    log::info!("Reading snapshots from stdin");
    let stdin = io::stdin();
    let result = IngestService::new(engine).run(stdin.lock());

    if let Some(id) = subscription {
        engine.unsubscribe(id);
    }
    engine.unsubscribe(log_subscription);

    let summary = result?;
    eprintln!(
        "Processed {} snapshot(s), {} alert(s) fired, {} line(s) skipped",
        summary.snapshots, summary.alerts, summary.skipped
    );

    Ok(())
}
