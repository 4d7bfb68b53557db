//! Shared domain model and configuration for the katalog workspace.

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod schema;

use thiserror::Error;

pub use app_config::AppConfig;
pub use catalog::{Catalog, Field, FieldValue, Product, TextField, TranslatedIds, Variant};
pub use config::{load_app_config, load_app_config_from_env};
pub use schema::{load_schema, CatalogSchema};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read schema file {path}: {source}")]
    SchemaFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema file: {0}")]
    SchemaFileParse(#[from] serde_yaml::Error),

    #[error("schema validation failed: {0}")]
    Validation(String),
}
