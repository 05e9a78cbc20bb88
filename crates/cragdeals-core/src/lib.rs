pub mod app_config;
pub mod catalog;
pub mod config;
pub mod discount;
pub mod site;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, Catalog, CategoriesFile, SiteConfig, SitesFile, UrlSpec};
pub use config::{load_app_config, load_app_config_from_env};
pub use discount::{Discount, DiscountUrl};
pub use site::{capitalize_site_name, Site, UnknownSite};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    CatalogFileParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("catalog validation failed: {0}")]
    Validation(String),
}
