//! marketalert - market metric alerting tool
//!
//! A command-line tool that checks market snapshots against alert rules and
//! manages the resulting alert history.

use clap::Parser;
use marketalert::alerts::AlertEngine;
use marketalert::cli::args::{generate_completions, Cli, Commands};
use marketalert::commands::{
    run_ack, run_check, run_clear, run_history, run_rules, run_set_enabled, run_stats,
    run_status, run_watch,
};
use marketalert::config::{Config, ConfigBuilder};
use marketalert::error::AppError;
use marketalert::storage::FileStorage;
use std::sync::Arc;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    let result = load_config(&cli).and_then(|config| {
        // Set log level based on verbose flag or config
        if config.general.verbose {
            log::set_max_level(log::LevelFilter::Debug);
        }
        run(&cli, &config)
    });

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<Config, AppError> {
    let config = ConfigBuilder::new()
        .with_file(cli.config.as_deref())?
        .with_verbose(cli.verbose.then_some(true))
        .with_data_dir(cli.data_dir.clone())
        .with_colors(cli.no_color.then_some(false))
        .build();
    Ok(config)
}

fn run(cli: &Cli, config: &Config) -> Result<(), AppError> {
    if let Commands::Completions { shell } = &cli.command {
        generate_completions(*shell);
        return Ok(());
    }

    let storage = match &config.general.data_dir {
        Some(dir) => FileStorage::new(dir),
        None => FileStorage::at_default_location(),
    };
    let data_dir = storage.dir().to_path_buf();
    log::debug!("Using data directory {}", data_dir.display());

    let mut engine = AlertEngine::with_config(Arc::new(storage), config.engine_config());

    match &cli.command {
        Commands::Check(args) => run_check(args, &mut engine, cli.format),

        Commands::Watch(args) => run_watch(args, &mut engine, config),

        Commands::History(args) => run_history(args, &engine, cli.format),

        Commands::Ack(args) => run_ack(args, &mut engine),

        Commands::Clear { older_than_days } => run_clear(*older_than_days, &mut engine),

        Commands::Stats { days } => run_stats(
            days.unwrap_or(config.alerts.stats_window_days),
            &engine,
            cli.format,
        ),

        Commands::Rules(args) => run_rules(&args.command, &mut engine, cli.format),

        Commands::Enable => run_set_enabled(true, &mut engine),

        Commands::Disable => run_set_enabled(false, &mut engine),

        Commands::Status => run_status(&engine, &data_dir, cli.format),

        Commands::Completions { .. } => Ok(()),
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::AlertNotFound(_) => {
            eprintln!();
            eprintln!("Hint: Use 'marketalert history' to list alert ids.");
        }
        AppError::RuleNotFound(_) => {
            eprintln!();
            eprintln!("Hint: Use 'marketalert rules list' to see custom rule names.");
        }
        AppError::Config(marketalert::error::ConfigError::FileNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Omit --config to use the default locations.");
        }
        _ => {}
    }
}
