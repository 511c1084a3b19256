//! Upserts into the storefront `"Producto"` table.

use sqlx::{Connection, PgConnection, PgExecutor};
use stocksync_core::{CommitMode, TargetProduct};

use crate::DbError;

/// Whether an upsert created the row or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Counts for one pass over the product list.
///
/// `inserted + updated + errors == processed` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub processed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub errors: usize,
}

impl SyncSummary {
    /// Rows that reached the table, fresh or overwritten.
    #[must_use]
    pub fn upserted(&self) -> usize {
        self.inserted + self.updated
    }

    /// Count rows that were dropped before reaching the sink, e.g. source rows
    /// that could not be decoded.
    pub fn record_rejected(&mut self, count: usize) {
        self.processed += count;
        self.errors += count;
    }

    fn record(&mut self, outcome: UpsertOutcome) {
        self.processed += 1;
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }

    fn record_error(&mut self, err: &DbError) {
        self.processed += 1;
        self.errors += 1;
        tracing::warn!(error = %err, "skipping product");
    }
}

/// Upserts one product keyed by `codigo`.
///
/// Conflicts overwrite every non-key column with the incoming values. The
/// system column `xmax` is zero only for freshly inserted tuples, which is how
/// the outcome is told apart.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the statement fails, e.g. on a constraint
/// violation or a value that does not fit its column.
pub async fn upsert_product<'e, E>(
    executor: E,
    product: &TargetProduct,
) -> Result<UpsertOutcome, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let inserted: bool = sqlx::query_scalar::<_, bool>(
        "INSERT INTO \"Producto\" \
             (codigo, nombre, talla, color, marca_descripcion, \
              precio_lista, stock_disponible, subrubro, imagen_url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (codigo) DO UPDATE SET \
             nombre            = EXCLUDED.nombre, \
             talla             = EXCLUDED.talla, \
             color             = EXCLUDED.color, \
             marca_descripcion = EXCLUDED.marca_descripcion, \
             precio_lista      = EXCLUDED.precio_lista, \
             stock_disponible  = EXCLUDED.stock_disponible, \
             subrubro          = EXCLUDED.subrubro, \
             imagen_url        = EXCLUDED.imagen_url \
         RETURNING (xmax = 0) AS inserted",
    )
    .bind(product.code)
    .bind(&product.name)
    .bind(&product.size)
    .bind(&product.color)
    .bind(&product.brand_description)
    .bind(product.final_price)
    .bind(product.available_stock)
    .bind(product.category.code())
    .bind(&product.image_url)
    .fetch_one(executor)
    .await?;

    Ok(if inserted {
        UpsertOutcome::Inserted
    } else {
        UpsertOutcome::Updated
    })
}

/// Upserts every product, isolating failures to the row that caused them.
///
/// With [`CommitMode::Batch`] the whole list shares one transaction and each
/// row runs under its own savepoint, so a failed row is rolled back alone and
/// the rest commit together at the end. With [`CommitMode::PerRow`] each row
/// commits independently and a failed commit counts against that row only.
///
/// # Errors
///
/// Returns [`DbError::Transaction`] if a transaction or savepoint cannot be
/// opened or released, and [`DbError::Commit`] if the final batch commit
/// fails. Row-level failures are logged and counted in the summary.
pub async fn sync_products(
    conn: &mut PgConnection,
    products: &[TargetProduct],
    mode: CommitMode,
) -> Result<SyncSummary, DbError> {
    let summary = match mode {
        CommitMode::Batch => sync_batch(conn, products).await?,
        CommitMode::PerRow => sync_per_row(conn, products).await?,
    };

    tracing::info!(
        processed = summary.processed,
        inserted = summary.inserted,
        updated = summary.updated,
        errors = summary.errors,
        %mode,
        "product sync completed"
    );
    Ok(summary)
}

async fn sync_batch(
    conn: &mut PgConnection,
    products: &[TargetProduct],
) -> Result<SyncSummary, DbError> {
    let mut summary = SyncSummary::default();
    let mut tx = conn.begin().await.map_err(DbError::Transaction)?;

    for product in products {
        let mut savepoint = Connection::begin(&mut *tx)
            .await
            .map_err(DbError::Transaction)?;

        let upserted = upsert_product(&mut *savepoint, product).await;
        match upserted {
            Ok(outcome) => {
                savepoint.commit().await.map_err(DbError::Transaction)?;
                summary.record(outcome);
            }
            Err(source) => {
                savepoint.rollback().await.map_err(DbError::Transaction)?;
                summary.record_error(&DbError::RowUpsert {
                    code: product.code,
                    source,
                });
            }
        }
    }

    tx.commit().await.map_err(DbError::Commit)?;
    Ok(summary)
}

async fn sync_per_row(
    conn: &mut PgConnection,
    products: &[TargetProduct],
) -> Result<SyncSummary, DbError> {
    let mut summary = SyncSummary::default();

    for product in products {
        let mut tx = conn.begin().await.map_err(DbError::Transaction)?;

        let upserted = upsert_product(&mut *tx, product).await;
        let result = match upserted {
            Ok(outcome) => tx.commit().await.map(|()| outcome),
            Err(source) => {
                tx.rollback().await.map_err(DbError::Transaction)?;
                Err(source)
            }
        };

        match result {
            Ok(outcome) => summary.record(outcome),
            Err(source) => summary.record_error(&DbError::RowUpsert {
                code: product.code,
                source,
            }),
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_add_up() {
        let mut summary = SyncSummary::default();
        summary.record(UpsertOutcome::Inserted);
        summary.record(UpsertOutcome::Updated);
        summary.record(UpsertOutcome::Updated);
        summary.record_error(&DbError::RowUpsert {
            code: 7,
            source: sqlx::Error::RowNotFound,
        });

        assert_eq!(summary.processed, 4);
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.updated, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.upserted(), 3);
        assert_eq!(summary.upserted() + summary.errors, summary.processed);
    }

    #[test]
    fn rejected_rows_count_as_processed_errors() {
        let mut summary = SyncSummary::default();
        summary.record(UpsertOutcome::Inserted);
        summary.record_rejected(2);

        assert_eq!(summary.processed, 3);
        assert_eq!(summary.errors, 2);
        assert_eq!(summary.upserted() + summary.errors, summary.processed);
    }

    #[test]
    fn row_upsert_error_names_the_product() {
        let err = DbError::RowUpsert {
            code: 1234,
            source: sqlx::Error::RowNotFound,
        };
        assert!(err.to_string().contains("1234"), "got: {err}");
    }
}
