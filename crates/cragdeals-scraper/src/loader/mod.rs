//! Ways of turning a URL into a parsed [`Document`].

mod fixture;
mod http;
mod rendered;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cragdeals_core::{AppConfig, Site};
use url::Url;

use crate::document::Document;
use crate::error::FetchError;
use crate::registry::{PageRef, UrlRegistry};

pub use fixture::{fixture_file_name, FixtureLoader};
pub use http::HttpLoader;
pub use rendered::RenderedLoader;

#[async_trait]
pub trait ContentLoader: Send + Sync {
    /// Fetch and parse the page at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure, a non-success status, or
    /// a blank body.
    async fn load(&self, url: &Url) -> Result<Document, FetchError>;

    /// Load a configured page. `url` is `page.url` already parsed.
    ///
    /// Network loaders only need the URL. Loaders that key on the page's
    /// site and category override this.
    ///
    /// # Errors
    ///
    /// Same as [`ContentLoader::load`].
    async fn load_page(&self, _page: &PageRef<'_>, url: &Url) -> Result<Document, FetchError> {
        self.load(url).await
    }

    /// Upper bound on a single [`ContentLoader::load`] call.
    fn budget(&self) -> Duration;
}

/// Which loader each site gets, chosen once when scrapers are built.
#[derive(Clone)]
pub enum LoaderStrategy {
    /// Network loaders. Sites that need client-side rendering use `rendered`
    /// when it is configured.
    Live {
        direct: Arc<HttpLoader>,
        rendered: Option<Arc<RenderedLoader>>,
    },
    /// Captured pages from disk.
    Fixture(Arc<FixtureLoader>),
    /// The same loader for every site.
    Shared(Arc<dyn ContentLoader>),
}

impl LoaderStrategy {
    /// Live loaders in production, fixtures everywhere else.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if an HTTP client cannot be built or the render
    /// service URL is invalid.
    pub fn from_config(
        config: &AppConfig,
        registry: &Arc<UrlRegistry>,
    ) -> Result<Self, FetchError> {
        if !config.env.is_production() {
            tracing::info!(
                env = %config.env,
                dir = %config.fixtures_dir.display(),
                "using fixture loader"
            );
            return Ok(Self::Fixture(Arc::new(FixtureLoader::new(
                &config.fixtures_dir,
                registry,
            ))));
        }

        Self::live(config)
    }

    /// Network loaders regardless of environment.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if an HTTP client cannot be built or the render
    /// service URL is invalid.
    pub fn live(config: &AppConfig) -> Result<Self, FetchError> {
        let direct = Arc::new(HttpLoader::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
        )?);

        let rendered = match config.render_url.as_deref() {
            Some(base_url) => Some(Arc::new(RenderedLoader::new(
                base_url,
                config.render_token.as_deref(),
                config.render_settle_ms,
                config.scraper_request_timeout_secs,
            )?)),
            None => {
                tracing::warn!(
                    "CRAGDEALS_RENDER_URL not set; sites that need rendering will be fetched directly"
                );
                None
            }
        };

        Ok(Self::Live { direct, rendered })
    }

    #[must_use]
    pub fn loader_for(&self, site: Site) -> Arc<dyn ContentLoader> {
        match self {
            Self::Live { direct, rendered } => match rendered {
                Some(rendered) if site.requires_rendering() => {
                    rendered.clone() as Arc<dyn ContentLoader>
                }
                _ => direct.clone() as Arc<dyn ContentLoader>,
            },
            Self::Fixture(loader) => loader.clone() as Arc<dyn ContentLoader>,
            Self::Shared(loader) => Arc::clone(loader),
        }
    }

    /// The rendered loader, if one is configured.
    #[must_use]
    pub fn rendered(&self) -> Option<Arc<dyn ContentLoader>> {
        match self {
            Self::Live {
                rendered: Some(rendered),
                ..
            } => Some(rendered.clone() as Arc<dyn ContentLoader>),
            _ => None,
        }
    }
}

impl std::fmt::Debug for LoaderStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live { rendered, .. } => f
                .debug_struct("Live")
                .field("rendered", &rendered.is_some())
                .finish(),
            Self::Fixture(loader) => f.debug_tuple("Fixture").field(loader).finish(),
            Self::Shared(_) => f.write_str("Shared"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use cragdeals_core::{Catalog, Environment};

    use super::*;

    fn config(env: Environment, render_url: Option<&str>) -> AppConfig {
        AppConfig {
            env,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "info".to_string(),
            categories_path: PathBuf::from("config/categories.yaml"),
            sites_path: PathBuf::from("config/sites.yaml"),
            fixtures_dir: PathBuf::from("fixtures"),
            scraper_request_timeout_secs: 5,
            scraper_user_agent: "cragdeals-test/0.1".to_string(),
            scraper_max_concurrent_fetches: 2,
            render_url: render_url.map(str::to_string),
            render_token: None,
            render_settle_ms: 100,
            refresh_interval_hours: 12,
        }
    }

    fn registry() -> Arc<UrlRegistry> {
        Arc::new(UrlRegistry::from_catalog(&Catalog {
            categories: vec!["ropes".to_string()],
            site_urls: BTreeMap::new(),
        }))
    }

    #[test]
    fn development_uses_fixtures() {
        let strategy =
            LoaderStrategy::from_config(&config(Environment::Development, None), &registry())
                .unwrap();
        assert!(matches!(strategy, LoaderStrategy::Fixture(_)));
        assert!(strategy.rendered().is_none());
    }

    #[test]
    fn production_uses_rendering_only_where_required() {
        let strategy = LoaderStrategy::from_config(
            &config(Environment::Production, Some("http://localhost:3000")),
            &registry(),
        )
        .unwrap();
        assert!(strategy.rendered().is_some());
        // Rendered budget includes the settle delay; direct does not.
        assert_eq!(
            strategy.loader_for(Site::Mountex).budget(),
            Duration::from_millis(5_100)
        );
        assert_eq!(
            strategy.loader_for(Site::Bergfreunde).budget(),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn production_without_render_service_falls_back_to_direct() {
        let strategy =
            LoaderStrategy::from_config(&config(Environment::Production, None), &registry())
                .unwrap();
        assert!(strategy.rendered().is_none());
        assert_eq!(
            strategy.loader_for(Site::Mountex).budget(),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn invalid_render_url_is_rejected() {
        let err = LoaderStrategy::from_config(
            &config(Environment::Production, Some("not a url")),
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, FetchError::InvalidRenderUrl { .. }));
    }
}
