//! The in-stock product query and row decoding.

use rust_decimal::Decimal;
use stocksync_core::SourceProduct;
use tiberius::{FromSql, Row};

use crate::error::ErpError;

/// Builds the aggregating in-stock query for `warehouse_count` warehouse ids,
/// bound as `@P1..@Pn`.
///
/// Stock is summed across the listed warehouses only; articles without a
/// stock, brand or offer row still join, with stock and offer defaulting to
/// zero. Groups whose summed stock is not positive are dropped, and rows come
/// back ordered by article code.
///
/// Numeric columns are cast to the widths [`product_from_row`] decodes, since
/// the TDS client does not widen integer types on read.
#[must_use]
pub fn in_stock_query(warehouse_count: usize) -> String {
    let placeholders = (1..=warehouse_count)
        .map(|i| format!("@P{i}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "SELECT \
             CAST(a.codigo AS BIGINT) AS codigo, \
             ISNULL(a.descripcion_1, '') AS nombre, \
             CAST(a.descripcion_5 AS NVARCHAR(255)) AS talla, \
             CAST(a.color AS NVARCHAR(255)) AS color, \
             m.descripcion AS marca_descripcion, \
             CAST(a.precio_1 AS DECIMAL(18, 4)) AS precio_lista, \
             CAST(a.codigo_sinonimo AS NVARCHAR(40)) AS codigo_sinonimo, \
             CAST(ISNULL(SUM(s.stock_actual), 0) AS BIGINT) AS stock_total, \
             CAST(ISNULL(o.porcentaje, 0) AS DECIMAL(9, 4)) AS descuento_oferta \
         FROM web_articulo a \
             LEFT JOIN marcas m ON m.codigo = a.marca \
             LEFT JOIN omicron_web_stock s ON s.articulo = a.codigo \
                 AND s.deposito IN ({placeholders}) \
             LEFT JOIN tabla_ofertas o ON o.codigo = a.codigo \
         GROUP BY \
             a.codigo, a.descripcion_1, a.descripcion_5, a.color, \
             m.descripcion, a.precio_1, a.codigo_sinonimo, o.porcentaje \
         HAVING ISNULL(SUM(s.stock_actual), 0) > 0 \
         ORDER BY a.codigo"
    )
}

/// Products read in one pass, plus the rows that could not be decoded.
#[derive(Debug, Default, PartialEq)]
pub struct InStock {
    pub products: Vec<SourceProduct>,
    /// Rows skipped because a column failed to decode.
    pub rejected: usize,
}

impl InStock {
    /// Keeps every row that decoded and counts the rest. Each rejected row is
    /// logged; the decode error names its product code when one was read.
    #[must_use]
    pub fn from_decoded<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Result<SourceProduct, ErpError>>,
    {
        let mut batch = Self::default();
        for row in rows {
            match row {
                Ok(product) => batch.products.push(product),
                Err(e) => {
                    batch.rejected += 1;
                    tracing::warn!(error = %e, "skipping undecodable ERP row");
                }
            }
        }
        batch
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.rejected == 0
    }
}

/// Decodes one row of [`in_stock_query`] into a [`SourceProduct`].
///
/// # Errors
///
/// Returns [`ErpError::Decode`] if a column has an unexpected type or a
/// non-nullable column is NULL.
pub fn product_from_row(row: &Row) -> Result<SourceProduct, ErpError> {
    let code = required::<i64>(row, "codigo", None)?;
    let ctx = Some(code);

    Ok(SourceProduct {
        code,
        name: required::<&str>(row, "nombre", ctx)?.to_owned(),
        size: optional::<&str>(row, "talla", ctx)?.map(str::to_owned),
        color: optional::<&str>(row, "color", ctx)?.map(str::to_owned),
        brand_description: optional::<&str>(row, "marca_descripcion", ctx)?.map(str::to_owned),
        list_price: required::<Decimal>(row, "precio_lista", ctx)?,
        synonym_code: optional::<&str>(row, "codigo_sinonimo", ctx)?.map(str::to_owned),
        total_stock: required::<i64>(row, "stock_total", ctx)?,
        offer_percentage: optional::<Decimal>(row, "descuento_oferta", ctx)?,
    })
}

fn optional<'a, T>(
    row: &'a Row,
    column: &'static str,
    code: Option<i64>,
) -> Result<Option<T>, ErpError>
where
    T: FromSql<'a>,
{
    row.try_get::<T, _>(column)
        .map_err(|e| ErpError::Decode {
            column,
            code,
            reason: e.to_string(),
        })
}

fn required<'a, T>(row: &'a Row, column: &'static str, code: Option<i64>) -> Result<T, ErpError>
where
    T: FromSql<'a>,
{
    optional(row, column, code)?.ok_or_else(|| ErpError::Decode {
        column,
        code,
        reason: "unexpected NULL".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(code: i64) -> SourceProduct {
        SourceProduct {
            code,
            name: "Zapatilla".to_string(),
            size: None,
            color: None,
            brand_description: None,
            list_price: Decimal::new(100, 0),
            synonym_code: None,
            total_stock: 1,
            offer_percentage: None,
        }
    }

    fn null_price(code: i64) -> ErpError {
        ErpError::Decode {
            column: "precio_lista",
            code: Some(code),
            reason: "unexpected NULL".to_string(),
        }
    }

    #[test]
    fn undecodable_row_is_skipped_and_counted() {
        let batch = InStock::from_decoded(vec![
            Ok(product(1)),
            Err(null_price(2)),
            Ok(product(3)),
        ]);

        let codes: Vec<i64> = batch.products.iter().map(|p| p.code).collect();
        assert_eq!(codes, vec![1, 3]);
        assert_eq!(batch.rejected, 1);
        assert!(!batch.is_empty());
    }

    #[test]
    fn all_rows_rejected_is_not_empty() {
        let batch = InStock::from_decoded(vec![Err(null_price(1)), Err(null_price(2))]);
        assert!(batch.products.is_empty());
        assert_eq!(batch.rejected, 2);
        assert!(!batch.is_empty());
    }

    #[test]
    fn no_rows_is_empty() {
        let batch = InStock::from_decoded(Vec::new());
        assert_eq!(batch, InStock::default());
        assert!(batch.is_empty());
    }

    #[test]
    fn placeholders_match_warehouse_count() {
        let sql = in_stock_query(3);
        assert!(sql.contains("s.deposito IN (@P1, @P2, @P3)"), "got: {sql}");
        assert!(!sql.contains("@P4"));
    }

    #[test]
    fn single_warehouse_has_single_placeholder() {
        let sql = in_stock_query(1);
        assert!(sql.contains("IN (@P1)"), "got: {sql}");
    }

    #[test]
    fn keeps_only_positive_stock_ordered_by_code() {
        let sql = in_stock_query(9);
        let having = sql.find("HAVING ISNULL(SUM(s.stock_actual), 0) > 0").unwrap();
        let order = sql.find("ORDER BY a.codigo").unwrap();
        assert!(having < order);
        assert!(sql.trim_end().ends_with("ORDER BY a.codigo"));
    }

    #[test]
    fn reference_tables_are_left_joined() {
        let sql = in_stock_query(2);
        for join in [
            "LEFT JOIN marcas m",
            "LEFT JOIN omicron_web_stock s",
            "LEFT JOIN tabla_ofertas o",
        ] {
            assert!(sql.contains(join), "missing {join}");
        }
        assert!(!sql.contains("INNER JOIN"));
    }

    #[test]
    fn selects_every_decoded_column() {
        let sql = in_stock_query(1);
        for column in [
            "AS codigo,",
            "AS nombre,",
            "AS talla,",
            "AS color,",
            "AS marca_descripcion,",
            "AS precio_lista,",
            "AS codigo_sinonimo,",
            "AS stock_total,",
            "AS descuento_oferta ",
        ] {
            assert!(sql.contains(column), "missing {column}");
        }
    }
}
