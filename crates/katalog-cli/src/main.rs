mod feed;
mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "katalog")]
#[command(about = "Translate and reprice the Yakamoz vendor catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download the vendor feed to the raw file
    Fetch {
        /// Feed URL (defaults to KATALOG_SOURCE_URL)
        #[arg(long)]
        url: Option<String>,
        /// Destination file (defaults to KATALOG_RAW_PATH)
        #[arg(long)]
        raw: Option<PathBuf>,
    },
    /// Check that a local feed is well-formed and count its products
    Check {
        /// Feed file (defaults to KATALOG_RAW_PATH)
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Merge the feed into the translated catalog
    Run(run::RunArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = katalog_core::load_app_config();
    let log_level = config.as_ref().map_or("info", |c| c.log_level.as_str());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return Ok(());
        }
    };

    let result = match cli.command {
        Commands::Fetch { url, raw } => {
            feed::run_fetch(&config, url.as_deref(), raw.as_deref()).await
        }
        Commands::Check { source } => feed::run_check(&config, source.as_deref()),
        Commands::Run(args) => run::run_pipeline(&config, &args).await,
    };

    if let Err(e) = result {
        tracing::error!("katalog failed: {e:#}");
    }
    Ok(())
}
