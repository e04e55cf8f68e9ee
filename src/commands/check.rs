//! Check command implementation
//!
//! Evaluates a single snapshot given on the command line.

use crate::alerts::{parse_date, AlertEngine, MetricSnapshot};
use crate::cli::args::{CheckArgs, OutputFormat};
use crate::cli::output::{print_output, AlertList};
use crate::error::Result;
use chrono::Utc;

/// Execute the check command
pub fn run_check(args: &CheckArgs, engine: &mut AlertEngine, format: OutputFormat) -> Result<()> {
    let date = match args.date.as_deref() {
        Some(date) => parse_date(date)?,
        None => Utc::now(),
    };

    let mut snapshot = MetricSnapshot::new(
        args.price,
        args.volume,
        args.volatility,
        args.change_percent,
    );
    if let Some(avg_volume) = args.avg_volume {
        snapshot = snapshot.with_avg_volume(avg_volume);
    }

    if !engine.is_enabled() {
        eprintln!("Alerting is disabled, run 'marketalert enable' to turn it on");
    }

    let alerts = engine.check_alerts(Some(&snapshot), &args.symbol, date);
    log::info!("{} alert(s) fired for {}", alerts.len(), args.symbol);

    print_output(&AlertList { alerts }, format)?;

    Ok(())
}
