//! marketalert - threshold alerting over market metric snapshots
//!
//! This library evaluates price, volume, volatility and change snapshots
//! against configurable rules, keeps a bounded history of fired alerts and
//! notifies subscribers as alerts fire.
//!
//! # Modules
//!
//! - [`alerts`]: Rules, evaluation engine, history and notification
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`error`]: Error types
//! - [`services`]: Snapshot ingestion
//! - [`storage`]: Key-value persistence for rules, history and settings

pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod services;
pub mod storage;

pub use error::{AppError, Result};
