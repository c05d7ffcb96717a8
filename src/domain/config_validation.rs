//! Configuration validation.
//!
//! Validates the `[data]` and `[dashboard]` sections before a refresh runs.

use crate::domain::error::SentinelError;
use crate::domain::refresh::{MAX_REFRESH_SECS, MIN_REFRESH_SECS};
use crate::ports::config_port::ConfigPort;

pub const PRICE_SOURCES: [&str; 2] = ["csv", "sqlite"];

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), SentinelError> {
    validate_path(config, "watchlist")?;
    validate_path(config, "trade_log")?;
    validate_price_source(config)?;
    Ok(())
}

pub fn validate_dashboard_config(config: &dyn ConfigPort) -> Result<(), SentinelError> {
    validate_refresh_interval(config)?;
    validate_history_bars(config)?;
    validate_rsi_period(config)?;
    Ok(())
}

fn validate_path(config: &dyn ConfigPort, key: &str) -> Result<(), SentinelError> {
    match config.get_string("data", key) {
        Some(s) if s.trim().is_empty() => Err(SentinelError::ConfigInvalid {
            section: "data".to_string(),
            key: key.to_string(),
            reason: format!("{} path must not be empty", key),
        }),
        _ => Ok(()),
    }
}

fn validate_price_source(config: &dyn ConfigPort) -> Result<(), SentinelError> {
    let source = config
        .get_string("data", "price_source")
        .unwrap_or_else(|| "csv".to_string());
    let source = source.trim().to_lowercase();

    if !PRICE_SOURCES.contains(&source.as_str()) {
        return Err(SentinelError::ConfigInvalid {
            section: "data".to_string(),
            key: "price_source".to_string(),
            reason: format!("unknown price source '{}', expected csv or sqlite", source),
        });
    }

    if source == "sqlite" {
        match config.get_string("sqlite", "path") {
            Some(p) if !p.trim().is_empty() => {}
            _ => {
                return Err(SentinelError::ConfigMissing {
                    section: "sqlite".to_string(),
                    key: "path".to_string(),
                });
            }
        }
    }
    Ok(())
}

fn validate_refresh_interval(config: &dyn ConfigPort) -> Result<(), SentinelError> {
    let value = config.get_int("dashboard", "refresh_interval", 60);
    if !(MIN_REFRESH_SECS..=MAX_REFRESH_SECS).contains(&value) {
        return Err(SentinelError::ConfigInvalid {
            section: "dashboard".to_string(),
            key: "refresh_interval".to_string(),
            reason: format!(
                "refresh_interval must be between {} and {} seconds",
                MIN_REFRESH_SECS, MAX_REFRESH_SECS
            ),
        });
    }
    Ok(())
}

fn validate_history_bars(config: &dyn ConfigPort) -> Result<(), SentinelError> {
    let value = config.get_int("dashboard", "history_bars", 5);
    if value < 1 {
        return Err(SentinelError::ConfigInvalid {
            section: "dashboard".to_string(),
            key: "history_bars".to_string(),
            reason: "history_bars must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_rsi_period(config: &dyn ConfigPort) -> Result<(), SentinelError> {
    let value = config.get_int("dashboard", "rsi_period", 14);
    if value < 1 {
        return Err(SentinelError::ConfigInvalid {
            section: "dashboard".to_string(),
            key: "rsi_period".to_string(),
            reason: "rsi_period must be at least 1".to_string(),
        });
    }
    Ok(())
}
