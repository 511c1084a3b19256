use thiserror::Error;

#[derive(Debug, Error)]
pub enum ErpError {
    #[error("failed to reach ERP server at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ERP login failed: {0}")]
    Login(#[source] tiberius::error::Error),

    #[error("ERP query failed: {0}")]
    Query(#[source] tiberius::error::Error),

    #[error("cannot decode column {column} of product {code:?}: {reason}")]
    Decode {
        column: &'static str,
        code: Option<i64>,
        reason: String,
    },
}

impl ErpError {
    /// Connection-tier errors end the job; query-tier errors mean "no data".
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, ErpError::Connect { .. } | ErpError::Login(_))
    }
}
