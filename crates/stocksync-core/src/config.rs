use crate::app_config::{AppConfig, CommitMode, ErpConfig};
use crate::ConfigError;

const DEFAULT_WAREHOUSES: &str = "0,1,2,4,6,7,8,9,15";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let parse_u16 = |var: &str, default: &str| -> Result<u16, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected true/false, got \"{other}\""),
            }),
        }
    };

    let erp = ErpConfig {
        host: require("STOCKSYNC_ERP_HOST")?,
        port: parse_u16("STOCKSYNC_ERP_PORT", "1433")?,
        database: require("STOCKSYNC_ERP_DATABASE")?,
        user: require("STOCKSYNC_ERP_USER")?,
        password: require("STOCKSYNC_ERP_PASSWORD")?,
        trust_cert: parse_bool("STOCKSYNC_ERP_TRUST_CERT", "false")?,
    };

    let database_url = require("DATABASE_URL")?;
    let warehouses = parse_warehouses(&or_default("STOCKSYNC_WAREHOUSES", DEFAULT_WAREHOUSES))?;
    let commit_mode = parse_commit_mode(&or_default("STOCKSYNC_COMMIT_MODE", "batch"))?;
    let log_level = or_default("STOCKSYNC_LOG_LEVEL", "info");

    Ok(AppConfig {
        erp,
        database_url,
        warehouses,
        commit_mode,
        log_level,
    })
}

/// Parse a comma-separated list of warehouse ids, e.g. `"0, 1,2"`.
///
/// An empty entry anywhere in the list is rejected; a blank variable falls back
/// to the default list before this runs, so the result is never empty.
fn parse_warehouses(raw: &str) -> Result<Vec<i32>, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "STOCKSYNC_WAREHOUSES".to_string(),
        reason,
    };

    raw.split(',')
        .map(str::trim)
        .map(|part| {
            part.parse::<i32>()
                .map_err(|e| invalid(format!("\"{part}\": {e}")))
        })
        .collect()
}

fn parse_commit_mode(s: &str) -> Result<CommitMode, ConfigError> {
    match s.trim() {
        "batch" => Ok(CommitMode::Batch),
        "per_row" => Ok(CommitMode::PerRow),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOCKSYNC_COMMIT_MODE".to_string(),
            reason: format!("expected \"batch\" or \"per_row\", got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
