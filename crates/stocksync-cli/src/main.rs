mod sync;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::sync::SyncOutcome;

#[derive(Debug, Parser)]
#[command(name = "stocksync")]
#[command(about = "Sync in-stock ERP products into the storefront database")]
struct Cli {
    /// Read and transform products, print them as JSON lines, and leave the
    /// target database untouched.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = stocksync_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    if cli.dry_run {
        // stdout carries the preview, so logs move to stderr.
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!(
        warehouses = ?config.warehouses,
        commit_mode = %config.commit_mode,
        dry_run = cli.dry_run,
        "starting product sync"
    );

    if cli.dry_run {
        let counts = sync::run_preview(&config)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "preview aborted"))?;
        for (category, count) in &counts {
            tracing::info!(%category, code = category.code(), count, "dry-run category total");
        }
    } else {
        let outcome = sync::run(&config)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "sync aborted"))?;
        if let SyncOutcome::Synced(summary) = outcome {
            if summary.errors > 0 {
                tracing::warn!(
                    errors = summary.errors,
                    processed = summary.processed,
                    "some products failed to sync"
                );
            }
        }
    }

    tracing::info!("product sync finished");
    Ok(())
}
