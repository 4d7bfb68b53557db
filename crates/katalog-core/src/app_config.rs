use std::path::PathBuf;

use rust_decimal::Decimal;

/// Runtime configuration for a catalog run, assembled from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// Remote vendor feed downloaded by `katalog fetch`.
    pub source_url: String,
    /// Local copy of the vendor feed; the merge always streams from disk.
    pub raw_path: PathBuf,
    pub output_path: PathBuf,
    /// JSON array of translation ids already translated in earlier runs.
    pub ids_path: PathBuf,
    /// Optional YAML override of the built-in [`crate::CatalogSchema`].
    pub schema_path: Option<PathBuf>,
    pub translate_url: String,
    pub source_lang: String,
    pub target_lang: String,
    pub rate_url: String,
    /// TRY to USD rate used when the live rate cannot be fetched.
    pub fallback_rate: Decimal,
    pub request_timeout_secs: u64,
    /// Upper bound on the feed download; the vendor endpoint is very slow.
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    pub retain_translated_history: bool,
}
