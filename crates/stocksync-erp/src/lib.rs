//! Read side of the sync: pulls in-stock products out of the ERP's SQL Server.

pub mod client;
pub mod error;
pub mod query;

pub use client::{connect_client, ErpClient, ErpReader};
pub use error::ErpError;
pub use query::{in_stock_query, InStock};
