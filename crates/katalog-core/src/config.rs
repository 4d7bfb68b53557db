use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(var, format!("expected a boolean, got \"{raw}\""))),
        }
    };

    let parse_rate = |var: &str, default: &str| -> Result<Decimal, ConfigError> {
        let rate = Decimal::from_str(or_default(var, default).trim())
            .map_err(|e| invalid(var, e.to_string()))?;
        if rate <= Decimal::ZERO {
            return Err(invalid(var, "rate must be positive".to_string()));
        }
        Ok(rate)
    };

    let log_level = or_default("KATALOG_LOG_LEVEL", "info");
    let source_url = or_default("KATALOG_SOURCE_URL", "https://modayakamoz.com/xml/yalin1");
    let raw_path = PathBuf::from(or_default("KATALOG_RAW_PATH", "./modayakamoz_raw.xml"));
    let output_path = PathBuf::from(or_default(
        "KATALOG_OUTPUT_PATH",
        "./translatedsample_yakamoz.xml",
    ));
    let ids_path = PathBuf::from(or_default(
        "KATALOG_IDS_PATH",
        "./translated_ids_yakamoz.json",
    ));
    let schema_path = lookup("KATALOG_SCHEMA_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);

    let translate_url = or_default(
        "KATALOG_TRANSLATE_URL",
        "https://translate.googleapis.com/translate_a/single",
    );
    let source_lang = or_default("KATALOG_SOURCE_LANG", "tr");
    let target_lang = or_default("KATALOG_TARGET_LANG", "en");
    let rate_url = or_default(
        "KATALOG_RATE_URL",
        "https://api.exchangerate.host/latest?base=TRY&symbols=USD",
    );
    let fallback_rate = parse_rate("KATALOG_FALLBACK_RATE", "0.031")?;

    let request_timeout_secs = parse_u64("KATALOG_REQUEST_TIMEOUT_SECS", "10")?;
    let fetch_timeout_secs = parse_u64("KATALOG_FETCH_TIMEOUT_SECS", "1200")?;
    let user_agent = or_default("KATALOG_USER_AGENT", "katalog/0.1 (catalog-bridge)");
    let retain_translated_history = parse_bool("KATALOG_RETAIN_TRANSLATED_HISTORY", "false")?;

    Ok(AppConfig {
        log_level,
        source_url,
        raw_path,
        output_path,
        ids_path,
        schema_path,
        translate_url,
        source_lang,
        target_lang,
        rate_url,
        fallback_rate,
        request_timeout_secs,
        fetch_timeout_secs,
        user_agent,
        retain_translated_history,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
