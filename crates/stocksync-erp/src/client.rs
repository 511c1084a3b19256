use stocksync_core::ErpConfig;
use tiberius::{AuthMethod, Client, Config, ToSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::error::ErpError;
use crate::query::{in_stock_query, product_from_row, InStock};

/// A TDS client over a plain tokio TCP stream.
pub type ErpClient = Client<Compat<TcpStream>>;

/// Open and authenticate one SQL Server session.
///
/// # Errors
///
/// Returns [`ErpError::Connect`] if the TCP connection cannot be opened and
/// [`ErpError::Login`] if the TDS handshake or login is rejected.
pub async fn connect_client(config: &ErpConfig) -> Result<ErpClient, ErpError> {
    let mut tib_config = Config::new();
    tib_config.host(&config.host);
    tib_config.port(config.port);
    tib_config.database(&config.database);
    tib_config.authentication(AuthMethod::sql_server(&config.user, &config.password));
    if config.trust_cert {
        tib_config.trust_cert();
    }

    let addr = tib_config.get_addr();
    let tcp = TcpStream::connect(addr.as_str())
        .await
        .map_err(|source| ErpError::Connect { addr, source })?;
    tcp.set_nodelay(true).ok();

    Client::connect(tib_config, tcp.compat_write())
        .await
        .map_err(ErpError::Login)
}

/// Reads in-stock products for a fixed set of warehouses over one session.
pub struct ErpReader {
    client: ErpClient,
    warehouses: Vec<i32>,
}

impl ErpReader {
    /// Connect to the ERP and bind the warehouse filter for later reads.
    ///
    /// # Errors
    ///
    /// Returns a connection-tier [`ErpError`]; see [`connect_client`].
    pub async fn connect(config: &ErpConfig, warehouses: &[i32]) -> Result<Self, ErpError> {
        let client = connect_client(config).await?;
        tracing::info!(
            host = %config.host,
            database = %config.database,
            "connected to ERP"
        );
        Ok(Self::new(client, warehouses.to_vec()))
    }

    /// Wrap an already-authenticated client.
    #[must_use]
    pub fn new(client: ErpClient, warehouses: Vec<i32>) -> Self {
        Self { client, warehouses }
    }

    /// Run the in-stock query and decode it row by row.
    ///
    /// An empty warehouse filter short-circuits to an empty result without
    /// touching the server. A row that fails to decode is skipped and counted
    /// in [`InStock::rejected`]; the other rows are still returned.
    ///
    /// # Errors
    ///
    /// Returns [`ErpError::Query`] if the query fails.
    pub async fn try_fetch_in_stock(&mut self) -> Result<InStock, ErpError> {
        if self.warehouses.is_empty() {
            tracing::warn!("no warehouses configured; nothing to read");
            return Ok(InStock::default());
        }

        let sql = in_stock_query(self.warehouses.len());
        let params: Vec<&dyn ToSql> = self.warehouses.iter().map(|w| w as &dyn ToSql).collect();

        let rows = self
            .client
            .query(sql, &params)
            .await
            .map_err(ErpError::Query)?
            .into_first_result()
            .await
            .map_err(ErpError::Query)?;

        Ok(InStock::from_decoded(rows.iter().map(product_from_row)))
    }

    /// Like [`try_fetch_in_stock`](Self::try_fetch_in_stock), but a failed
    /// query is logged and reported as "nothing in stock".
    pub async fn fetch_in_stock(&mut self) -> InStock {
        match self.try_fetch_in_stock().await {
            Ok(batch) => {
                tracing::info!(
                    count = batch.products.len(),
                    rejected = batch.rejected,
                    "fetched in-stock products"
                );
                batch
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch products from ERP");
                InStock::default()
            }
        }
    }

    /// End the session. Failures are logged; the socket is dropped either way.
    pub async fn close(self) {
        if let Err(e) = self.client.close().await {
            tracing::warn!(error = %e, "ERP connection did not close cleanly");
        }
    }
}
