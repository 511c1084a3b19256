mod app_config;
mod config;
pub mod products;
pub mod transform;

use thiserror::Error;

pub use app_config::{AppConfig, CommitMode, ErpConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{Category, SourceProduct, TargetProduct};
pub use transform::{classify_category, final_price, image_url, to_target};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
