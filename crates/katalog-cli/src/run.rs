//! The `run` command: check, merge and persist.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use katalog_core::AppConfig;
use katalog_feed::ProductReader;
use katalog_merge::{merge_catalog, MergeOptions, MergeOutcome, MergeReport, MergeState};
use katalog_store::{load_ids, load_prior_catalog, save_catalog, save_ids};
use katalog_translate::{resolve_rate, GoogleTranslator, RateClient};

use crate::feed::{check_source, download, load_schema};

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    /// Local feed file (defaults to KATALOG_RAW_PATH)
    #[arg(long)]
    pub source: Option<PathBuf>,
    /// Download the feed into the source file before merging
    #[arg(long)]
    pub fetch: bool,
    /// Translated catalog (defaults to KATALOG_OUTPUT_PATH)
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Translation id file (defaults to KATALOG_IDS_PATH)
    #[arg(long)]
    pub ids: Option<PathBuf>,
    /// Run the merge and report without writing either file
    #[arg(long)]
    pub dry_run: bool,
}

/// Files touched by one run after applying CLI overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunPaths {
    pub source: PathBuf,
    pub output: PathBuf,
    pub ids: PathBuf,
}

impl RunPaths {
    pub(crate) fn resolve(config: &AppConfig, args: &RunArgs) -> Self {
        Self {
            source: args.source.clone().unwrap_or_else(|| config.raw_path.clone()),
            output: args.output.clone().unwrap_or_else(|| config.output_path.clone()),
            ids: args.ids.clone().unwrap_or_else(|| config.ids_path.clone()),
        }
    }
}

/// Runs the whole pipeline once.
///
/// A malformed source feed or id file aborts before any translation work;
/// rate, translation and prior-catalog failures degrade to fallbacks. When
/// no candidate survives duplicate suppression nothing is written.
///
/// # Errors
///
/// Returns an error if the source is missing or malformed, the id file is
/// malformed, a client cannot be built, or the outputs cannot be written.
pub(crate) async fn run_pipeline(config: &AppConfig, args: &RunArgs) -> anyhow::Result<()> {
    let started = chrono::Utc::now();
    tracing::info!(started = %started.to_rfc3339(), "catalog run started");

    let schema = load_schema(config)?;
    let paths = RunPaths::resolve(config, args);

    if args.fetch {
        download(config, &config.source_url, &paths.source).await?;
    }
    if !paths.source.exists() {
        anyhow::bail!("source feed {} does not exist", paths.source.display());
    }

    let products = check_source(&paths.source, &schema)?;
    tracing::info!(path = %paths.source.display(), products, "source feed is well-formed");

    let translated_ids = load_ids(&paths.ids).context("translation id file is unusable")?;
    let catalog = load_prior_catalog(&paths.output, &schema);

    let rate_client = RateClient::new(
        &config.rate_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    let quote = resolve_rate(&rate_client, config.fallback_rate).await;

    let translator = GoogleTranslator::new(
        &config.translate_url,
        &config.source_lang,
        &config.target_lang,
        config.request_timeout_secs,
        &config.user_agent,
    )?;

    let options = MergeOptions {
        rate: quote.rate,
        retain_translated_history: config.retain_translated_history,
    };
    let candidates = ProductReader::from_path(&paths.source, &schema)?;
    let outcome = merge_catalog(
        candidates,
        MergeState {
            catalog,
            translated_ids,
        },
        &translator,
        &schema,
        &options,
    )
    .await?;

    log_report(outcome.report());

    match outcome {
        MergeOutcome::NoChanges { .. } => {
            tracing::info!("no new products; catalog and ids left untouched");
        }
        MergeOutcome::Merged { state, .. } if args.dry_run => {
            tracing::info!(
                products = state.catalog.len(),
                ids = state.translated_ids.len(),
                "dry run; nothing written"
            );
        }
        MergeOutcome::Merged { state, report } => {
            save_catalog(&paths.output, &state.catalog, &schema)?;
            save_ids(&paths.ids, &state.translated_ids)?;
            tracing::info!(
                path = %paths.output.display(),
                new_products = report.merged,
                "translated catalog written"
            );
        }
    }

    let elapsed = chrono::Utc::now() - started;
    tracing::info!(elapsed_secs = elapsed.num_seconds(), "catalog run finished");
    Ok(())
}

fn log_report(report: &MergeReport) {
    tracing::info!(
        candidates_seen = report.candidates_seen,
        merged = report.merged,
        duplicates_skipped = report.duplicates_skipped,
        translated = report.translated,
        translation_fallbacks = report.translation_fallbacks,
        prices_converted = report.prices_converted,
        prices_unparsed = report.prices_unparsed,
        carried_forward = report.carried_forward,
        "merge finished"
    );
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
