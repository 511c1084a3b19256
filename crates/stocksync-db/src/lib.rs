use sqlx::{Connection, PgConnection};
use stocksync_core::{CommitMode, TargetProduct};
use thiserror::Error;

pub mod products;

pub use products::{sync_products, upsert_product, SyncSummary, UpsertOutcome};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to connect to target database: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("upsert failed for product {code}: {source}")]
    RowUpsert {
        code: i64,
        #[source]
        source: sqlx::Error,
    },
    #[error("transaction control failed: {0}")]
    Transaction(#[source] sqlx::Error),
    #[error("batch commit failed, no rows were persisted: {0}")]
    Commit(#[source] sqlx::Error),
}

/// Open a single connection to the target Postgres database.
///
/// # Errors
///
/// Returns [`DbError::Connection`] if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgConnection, DbError> {
    PgConnection::connect(database_url)
        .await
        .map_err(DbError::Connection)
}

/// Write side of the sync: owns the one target connection for a run.
pub struct PgSink {
    conn: PgConnection,
}

impl PgSink {
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] if the connection cannot be established.
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        let conn = connect(database_url).await?;
        tracing::info!("connected to target database");
        Ok(Self { conn })
    }

    /// Upsert every product; see [`sync_products`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Transaction`] or [`DbError::Commit`] when the batch
    /// cannot be persisted. Row failures are counted, not returned.
    pub async fn sync_products(
        &mut self,
        products: &[TargetProduct],
        mode: CommitMode,
    ) -> Result<SyncSummary, DbError> {
        sync_products(&mut self.conn, products, mode).await
    }

    /// Close the connection gracefully. Failures are logged.
    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            tracing::warn!(error = %e, "target connection did not close cleanly");
        }
    }
}
