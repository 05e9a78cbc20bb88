use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    /// Only production scrapes live pages; every other environment reads
    /// captured fixtures.
    #[must_use]
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub categories_path: PathBuf,
    pub sites_path: PathBuf,
    pub fixtures_dir: PathBuf,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_concurrent_fetches: usize,
    pub render_url: Option<String>,
    pub render_token: Option<String>,
    pub render_settle_ms: u64,
    pub refresh_interval_hours: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("categories_path", &self.categories_path)
            .field("sites_path", &self.sites_path)
            .field("fixtures_dir", &self.fixtures_dir)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field(
                "scraper_max_concurrent_fetches",
                &self.scraper_max_concurrent_fetches,
            )
            .field("render_url", &self.render_url)
            .field(
                "render_token",
                &self.render_token.as_ref().map(|_| "[redacted]"),
            )
            .field("render_settle_ms", &self.render_settle_ms)
            .field("refresh_interval_hours", &self.refresh_interval_hours)
            .finish()
    }
}
