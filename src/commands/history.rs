//! History command implementations
//!
//! Query, acknowledge, prune and summarize recorded alerts.

use crate::alerts::{days_before, AlertEngine};
use crate::cli::args::{AckArgs, HistoryArgs, OutputFormat};
use crate::cli::output::{print_output, AlertList};
use crate::error::{AppError, Result};
use chrono::Utc;

/// Execute the history command
pub fn run_history(args: &HistoryArgs, engine: &AlertEngine, format: OutputFormat) -> Result<()> {
    let mut filter = args.filter.to_filter()?;
    filter.limit = args.limit;

    let alerts = engine.query(&filter);
    print_output(&AlertList { alerts }, format)?;

    Ok(())
}

/// Execute the ack command
pub fn run_ack(args: &AckArgs, engine: &mut AlertEngine) -> Result<()> {
    if args.all {
        let filter = args.filter.to_filter()?;
        let count = engine.acknowledge_all(&filter);
        println!("Acknowledged {} alert(s)", count);
        return Ok(());
    }

    let Some(id) = args.id.as_deref() else {
        return Ok(());
    };

    if !engine.acknowledge(id) {
        return Err(AppError::AlertNotFound(id.to_string()));
    }

    println!("Alert {} acknowledged", id);
    Ok(())
}

/// Execute the clear command
pub fn run_clear(older_than_days: Option<u32>, engine: &mut AlertEngine) -> Result<()> {
    let cutoff = older_than_days.map(|days| days_before(Utc::now(), days));
    let removed = engine.clear_history(cutoff);

    match older_than_days {
        Some(days) => println!("Removed {} alert(s) older than {} day(s)", removed, days),
        None => println!("Removed {} alert(s)", removed),
    }

    Ok(())
}

/// Execute the stats command
pub fn run_stats(days: u32, engine: &AlertEngine, format: OutputFormat) -> Result<()> {
    let stats = engine.statistics(days);
    print_output(&stats, format)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{MetricSnapshot, Severity};
    use crate::cli::args::FilterArgs;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn engine_with_alerts() -> AlertEngine {
        let mut engine = AlertEngine::new(Arc::new(MemoryStorage::new()));
        let date = Utc::now();
        engine.check_alerts(
            Some(&MetricSnapshot::new(10.0, 1.0, 30.0, 0.0)),
            "AAPL",
            date,
        );
        engine.check_alerts(
            Some(&MetricSnapshot::new(10.0, 1.0, 1.0, 6.0)),
            "MSFT",
            date,
        );
        engine
    }

    #[test]
    fn test_ack_by_id() {
        let mut engine = engine_with_alerts();
        let id = engine.history().entries()[0].id.clone();

        let args = AckArgs {
            id: Some(id.clone()),
            all: false,
            filter: FilterArgs::default(),
        };
        run_ack(&args, &mut engine).unwrap();

        assert!(engine.history().get(&id).unwrap().acknowledged);
    }

    #[test]
    fn test_ack_unknown_id() {
        let mut engine = engine_with_alerts();
        let args = AckArgs {
            id: Some("missing".to_string()),
            all: false,
            filter: FilterArgs::default(),
        };

        let err = run_ack(&args, &mut engine).unwrap_err();
        assert!(matches!(err, AppError::AlertNotFound(id) if id == "missing"));
    }

    #[test]
    fn test_ack_all_with_filter() {
        let mut engine = engine_with_alerts();
        let args = AckArgs {
            id: None,
            all: true,
            filter: FilterArgs {
                symbol: Some("AAPL".to_string()),
                ..FilterArgs::default()
            },
        };
        run_ack(&args, &mut engine).unwrap();

        for alert in engine.history().iter() {
            assert_eq!(alert.acknowledged, alert.symbol == "AAPL");
        }
    }

    #[test]
    fn test_clear_keeps_recent() {
        let mut engine = engine_with_alerts();
        let before = engine.history().len();

        run_clear(Some(1), &mut engine).unwrap();
        assert_eq!(engine.history().len(), before);

        run_clear(None, &mut engine).unwrap();
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_clear_huge_age_keeps_everything() {
        let mut engine = engine_with_alerts();
        let before = engine.history().len();

        run_clear(Some(u32::MAX), &mut engine).unwrap();
        assert_eq!(engine.history().len(), before);

        run_stats(u32::MAX, &engine, OutputFormat::Compact).unwrap();
        assert_eq!(engine.statistics(u32::MAX).total, before);
    }

    #[test]
    fn test_history_bad_date_filter() {
        let engine = engine_with_alerts();
        let args = HistoryArgs {
            filter: FilterArgs {
                from: Some("last week".to_string()),
                ..FilterArgs::default()
            },
            limit: None,
        };

        assert!(run_history(&args, &engine, OutputFormat::Compact).is_err());
    }

    #[test]
    fn test_stats_counts_window() {
        let engine = engine_with_alerts();
        run_stats(7, &engine, OutputFormat::Compact).unwrap();

        let stats = engine.statistics(7);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_severity.get(&Severity::Critical), Some(&1));
    }
}
