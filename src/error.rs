//! Unified error types for marketalert
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the persistence layer
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Error from domain type validation
    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    /// Alert not found by id
    #[error("Alert not found: {0}")]
    AlertNotFound(String),

    /// Custom rule not found by name
    #[error("Custom rule not found: {0}")]
    RuleNotFound(String),

    /// IO error (file operations, stdin)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from persistence operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading a stored record failed
    #[error("Failed to read {key}: {message}")]
    Read { key: String, message: String },

    /// Writing a stored record failed
    #[error("Failed to write {key}: {message}")]
    Write { key: String, message: String },

    /// Stored record could not be decoded
    #[error("Corrupt record {key}: {message}")]
    Corrupt { key: String, message: String },

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from domain type validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Unknown rule category name
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Unknown metric name
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Unknown condition name
    #[error("Unknown condition: {0}")]
    UnknownCondition(String),

    /// Unknown severity name
    #[error("Unknown severity: {0}")]
    UnknownSeverity(String),

    /// Threshold could not be parsed
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Date or timestamp could not be parsed
    #[error("Invalid date: {0} (expected YYYY-MM-DD or RFC 3339)")]
    InvalidDate(String),

    /// Rule name is empty or otherwise unusable
    #[error("Invalid rule name: {0:?}")]
    InvalidRuleName(String),

    /// Invalid value provided
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
