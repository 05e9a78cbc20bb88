use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use cragdeals_core::{Discount, DiscountUrl, Site};
use tokio::sync::Semaphore;
use url::Url;

use crate::error::{FetchError, ScraperError};
use crate::extract::{extractor_for, SiteExtractor};
use crate::loader::{ContentLoader, LoaderStrategy};
use crate::registry::{PageRef, UrlRegistry};

/// An extractor bound to its loader and its slice of the registry.
pub struct SiteScraper {
    site: Site,
    extractor: Box<dyn SiteExtractor>,
    loader: Arc<dyn ContentLoader>,
    urls: Vec<DiscountUrl>,
}

impl SiteScraper {
    #[must_use]
    pub fn new(
        site: Site,
        extractor: Box<dyn SiteExtractor>,
        loader: Arc<dyn ContentLoader>,
        urls: Vec<DiscountUrl>,
    ) -> Self {
        Self {
            site,
            extractor,
            loader,
            urls,
        }
    }

    #[must_use]
    pub fn site(&self) -> Site {
        self.site
    }

    #[must_use]
    pub fn urls(&self) -> &[DiscountUrl] {
        &self.urls
    }

    /// This site's pages for `category`, indexed within that category.
    pub fn pages_for_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = PageRef<'a>> + 'a {
        self.urls
            .iter()
            .filter(move |u| u.category == category)
            .enumerate()
            .map(move |(index, u)| PageRef {
                site: self.site,
                category: u.category.as_str(),
                index,
                url: u.url.as_str(),
            })
    }

    /// Scrape every configured page of `category`.
    ///
    /// A page that fails to load or extract is logged and contributes
    /// nothing; the remaining pages still run. A category with no pages for
    /// this site yields an empty list.
    pub async fn scrape_category(&self, category: &str, pool: &Semaphore) -> Vec<Discount> {
        let mut discounts = Vec::new();
        for page in self.pages_for_category(category) {
            match self.scrape_page(&page, pool).await {
                Ok(found) => {
                    tracing::debug!(
                        site = %self.site,
                        category,
                        url = page.url,
                        count = found.len(),
                        "page scraped"
                    );
                    discounts.extend(found);
                }
                Err(e) => {
                    tracing::warn!(
                        site = %self.site,
                        category,
                        url = page.url,
                        error = %e,
                        "page scrape failed"
                    );
                }
            }
        }
        discounts
    }

    /// Load one page under a pool permit and the loader's time budget, then
    /// extract it.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the URL is invalid, the load fails or
    /// times out, or the page markup is unusable.
    pub async fn scrape_page(
        &self,
        page: &PageRef<'_>,
        pool: &Semaphore,
    ) -> Result<Vec<Discount>, ScraperError> {
        let parsed = Url::parse(page.url).map_err(|e| ScraperError::InvalidUrl {
            url: page.url.to_string(),
            reason: e.to_string(),
        })?;

        let document = {
            let _permit = pool.acquire().await.map_err(|_| ScraperError::PoolClosed)?;
            let budget = self.loader.budget();
            tokio::time::timeout(budget, self.loader.load_page(page, &parsed))
                .await
                .map_err(|_| FetchError::Timeout {
                    url: page.url.to_string(),
                    budget,
                })??
        };

        self.extractor.extract(&document)
    }
}

impl std::fmt::Debug for SiteScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteScraper")
            .field("site", &self.site)
            .field("urls", &self.urls.len())
            .finish_non_exhaustive()
    }
}

/// Owns one [`SiteScraper`] per configured site.
///
/// Scrapers are built on first access and reused afterwards.
pub struct ScraperManager {
    registry: Arc<UrlRegistry>,
    strategy: LoaderStrategy,
    scrapers: OnceLock<BTreeMap<Site, Arc<SiteScraper>>>,
}

impl ScraperManager {
    #[must_use]
    pub fn new(registry: Arc<UrlRegistry>, strategy: LoaderStrategy) -> Self {
        Self {
            registry,
            strategy,
            scrapers: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &UrlRegistry {
        &self.registry
    }

    /// Site → scraper for every site with configured pages.
    pub fn scrapers(&self) -> &BTreeMap<Site, Arc<SiteScraper>> {
        self.scrapers.get_or_init(|| self.build())
    }

    fn build(&self) -> BTreeMap<Site, Arc<SiteScraper>> {
        self.registry
            .sites()
            .map(|site| {
                let urls = self.registry.for_site(site).to_vec();
                tracing::info!(
                    site = %site,
                    urls = urls.len(),
                    rendered = site.requires_rendering(),
                    "initialized scraper"
                );
                let scraper = SiteScraper::new(
                    site,
                    extractor_for(site),
                    self.strategy.loader_for(site),
                    urls,
                );
                (site, Arc::new(scraper))
            })
            .collect()
    }
}
