//! `fetch` and `check` command handlers.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use katalog_core::{AppConfig, CatalogSchema};
use katalog_feed::{check_well_formed, FeedClient};

/// Downloads the vendor feed, overwriting the raw file only on success.
pub(crate) async fn run_fetch(
    config: &AppConfig,
    url: Option<&str>,
    raw: Option<&Path>,
) -> anyhow::Result<()> {
    let url = url.unwrap_or(&config.source_url);
    let raw = raw.unwrap_or(&config.raw_path);
    download(config, url, raw).await.map(|_| ())
}

pub(crate) async fn download(config: &AppConfig, url: &str, dest: &Path) -> anyhow::Result<u64> {
    let started = chrono::Utc::now();
    tracing::info!(url, timeout_secs = config.fetch_timeout_secs, "downloading feed");

    let client = FeedClient::new(config.fetch_timeout_secs, &config.user_agent)?;
    let bytes = client
        .download_to(url, dest)
        .await
        .with_context(|| format!("failed to download feed from {url}"))?;

    let elapsed = chrono::Utc::now() - started;
    tracing::info!(bytes, elapsed_secs = elapsed.num_seconds(), "download finished");
    Ok(bytes)
}

pub(crate) fn run_check(config: &AppConfig, source: Option<&Path>) -> anyhow::Result<()> {
    let schema = load_schema(config)?;
    let source = source.unwrap_or(&config.raw_path);
    let products = check_source(source, &schema)?;
    tracing::info!(path = %source.display(), products, "feed is well-formed");
    Ok(())
}

/// Streams the whole feed once, returning its product count.
pub(crate) fn check_source(source: &Path, schema: &CatalogSchema) -> anyhow::Result<usize> {
    let file = File::open(source)
        .with_context(|| format!("source feed {} cannot be opened", source.display()))?;
    check_well_formed(BufReader::new(file), schema)
        .with_context(|| format!("source feed {} is malformed", source.display()))
}

pub(crate) fn load_schema(config: &AppConfig) -> anyhow::Result<CatalogSchema> {
    match &config.schema_path {
        Some(path) => katalog_core::load_schema(path)
            .with_context(|| format!("failed to load schema {}", path.display())),
        None => Ok(CatalogSchema::default()),
    }
}
