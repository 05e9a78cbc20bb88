use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
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
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let at_least_one = |var: &str, value: u64| -> Result<u64, ConfigError> {
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("CRAGDEALS_ENV", "development"))?;

    let bind_addr = parse_addr("CRAGDEALS_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("CRAGDEALS_LOG_LEVEL", "info");
    let categories_path = PathBuf::from(or_default(
        "CRAGDEALS_CATEGORIES_PATH",
        "./config/categories.yaml",
    ));
    let sites_path = PathBuf::from(or_default("CRAGDEALS_SITES_PATH", "./config/sites.yaml"));
    let fixtures_dir = PathBuf::from(or_default("CRAGDEALS_FIXTURES_DIR", "./fixtures"));

    let scraper_request_timeout_secs = parse_u64("CRAGDEALS_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("CRAGDEALS_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_max_concurrent_fetches =
        parse_usize("CRAGDEALS_SCRAPER_MAX_CONCURRENT_FETCHES", "4")?;
    if scraper_max_concurrent_fetches == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CRAGDEALS_SCRAPER_MAX_CONCURRENT_FETCHES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let render_url = optional("CRAGDEALS_RENDER_URL");
    let render_token = optional("CRAGDEALS_RENDER_TOKEN");
    let render_settle_ms = parse_u64("CRAGDEALS_RENDER_SETTLE_MS", "5000")?;
    let refresh_interval_hours = at_least_one(
        "CRAGDEALS_REFRESH_INTERVAL_HOURS",
        parse_u64("CRAGDEALS_REFRESH_INTERVAL_HOURS", "12")?,
    )?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        categories_path,
        sites_path,
        fixtures_dir,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_concurrent_fetches,
        render_url,
        render_token,
        render_settle_ms,
        refresh_interval_hours,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CRAGDEALS_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
