/// How the sink groups row upserts into transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitMode {
    /// One transaction for the whole batch, one savepoint per row, one commit.
    #[default]
    Batch,
    /// Every row commits on its own.
    PerRow,
}

impl std::fmt::Display for CommitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitMode::Batch => write!(f, "batch"),
            CommitMode::PerRow => write!(f, "per_row"),
        }
    }
}

/// Connection settings for the ERP SQL Server.
#[derive(Clone)]
pub struct ErpConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub trust_cert: bool,
}

impl std::fmt::Debug for ErpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[redacted]")
            .field("trust_cert", &self.trust_cert)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub erp: ErpConfig,
    pub database_url: String,
    pub warehouses: Vec<i32>,
    pub commit_mode: CommitMode,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("erp", &self.erp)
            .field("database_url", &"[redacted]")
            .field("warehouses", &self.warehouses)
            .field("commit_mode", &self.commit_mode)
            .field("log_level", &self.log_level)
            .finish()
    }
}
