//! One sync run: connect, read, transform, write, close.
//!
//! Both connections are closed on every path out of [`run`], including when
//! the second connection or the batch write fails.

use std::collections::BTreeMap;
use std::io::Write;

use stocksync_core::{to_target, AppConfig, Category, CommitMode, TargetProduct};
use stocksync_db::{DbError, PgSink, SyncSummary};
use stocksync_erp::{ErpError, ErpReader, InStock};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum SyncError {
    #[error("cannot connect to ERP: {0}")]
    SourceConnection(#[source] ErpError),
    #[error("cannot connect to target database: {0}")]
    TargetConnection(#[source] DbError),
    #[error(transparent)]
    Write(#[from] DbError),
    #[error("failed to write preview output: {0}")]
    Output(#[from] std::io::Error),
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SyncOutcome {
    NothingToSync,
    Synced(SyncSummary),
}

/// Read side of a run. A failed query yields an empty batch; undecodable rows
/// are counted in [`InStock::rejected`].
pub(crate) trait ProductSource {
    async fn fetch_in_stock(&mut self) -> InStock;
    async fn close(self);
}

/// Write side of a run.
pub(crate) trait ProductSink {
    async fn write(
        &mut self,
        products: &[TargetProduct],
        mode: CommitMode,
    ) -> Result<SyncSummary, DbError>;
    async fn close(self);
}

impl ProductSource for ErpReader {
    async fn fetch_in_stock(&mut self) -> InStock {
        ErpReader::fetch_in_stock(self).await
    }

    async fn close(self) {
        ErpReader::close(self).await;
    }
}

impl ProductSink for PgSink {
    async fn write(
        &mut self,
        products: &[TargetProduct],
        mode: CommitMode,
    ) -> Result<SyncSummary, DbError> {
        self.sync_products(products, mode).await
    }

    async fn close(self) {
        PgSink::close(self).await;
    }
}

/// Connect to both stores and run one sync.
///
/// # Errors
///
/// Returns [`SyncError::SourceConnection`] or [`SyncError::TargetConnection`]
/// when a store is unreachable, and [`SyncError::Write`] when the batch cannot
/// be persisted.
pub(crate) async fn run(config: &AppConfig) -> Result<SyncOutcome, SyncError> {
    let source = ErpReader::connect(&config.erp, &config.warehouses)
        .await
        .map_err(SyncError::SourceConnection)?;

    let sink = match PgSink::connect(&config.database_url).await {
        Ok(sink) => sink,
        Err(e) => {
            source.close().await;
            return Err(SyncError::TargetConnection(e));
        }
    };

    sync_and_close(source, sink, config.commit_mode).await
}

/// Run one sync over already-open connections, then close both regardless of
/// the result.
pub(crate) async fn sync_and_close<S, K>(
    mut source: S,
    mut sink: K,
    mode: CommitMode,
) -> Result<SyncOutcome, SyncError>
where
    S: ProductSource,
    K: ProductSink,
{
    let result = sync_once(&mut source, &mut sink, mode).await;
    source.close().await;
    sink.close().await;
    result
}

async fn sync_once<S, K>(
    source: &mut S,
    sink: &mut K,
    mode: CommitMode,
) -> Result<SyncOutcome, SyncError>
where
    S: ProductSource,
    K: ProductSink,
{
    let batch = source.fetch_in_stock().await;
    if batch.is_empty() {
        tracing::info!("no products to sync");
        return Ok(SyncOutcome::NothingToSync);
    }

    let mut summary = if batch.products.is_empty() {
        SyncSummary::default()
    } else {
        let targets: Vec<TargetProduct> = batch.products.iter().map(to_target).collect();
        sink.write(&targets, mode).await?
    };
    summary.record_rejected(batch.rejected);
    Ok(SyncOutcome::Synced(summary))
}

/// Connect to the ERP only and print what a run would write.
///
/// # Errors
///
/// Returns [`SyncError::SourceConnection`] if the ERP is unreachable and
/// [`SyncError::Output`] if stdout cannot be written.
pub(crate) async fn run_preview(config: &AppConfig) -> Result<BTreeMap<Category, usize>, SyncError> {
    let source = ErpReader::connect(&config.erp, &config.warehouses)
        .await
        .map_err(SyncError::SourceConnection)?;
    preview(source, std::io::stdout().lock()).await
}

/// Read and transform every product, writing each as one JSON line to `out`,
/// and return how many landed in each category.
pub(crate) async fn preview<S, W>(
    mut source: S,
    mut out: W,
) -> Result<BTreeMap<Category, usize>, SyncError>
where
    S: ProductSource,
    W: Write,
{
    let batch = source.fetch_in_stock().await;
    source.close().await;

    let mut counts = BTreeMap::new();
    for product in &batch.products {
        let target = to_target(product);
        *counts.entry(target.category).or_insert(0) += 1;
        serde_json::to_writer(&mut out, &target).map_err(std::io::Error::from)?;
        writeln!(out)?;
    }
    out.flush()?;

    Ok(counts)
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
