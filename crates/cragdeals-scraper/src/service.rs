//! Category fan-out and the atomically swapped discount cache.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use cragdeals_core::Discount;
use serde::Serialize;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

use crate::manager::ScraperManager;

/// One complete refresh result.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    /// Starts at 0 (nothing scraped yet) and increases by one per refresh.
    pub generation: u64,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub discounts: BTreeMap<String, Vec<Discount>>,
}

impl CacheSnapshot {
    fn empty(categories: &[String]) -> Self {
        Self {
            generation: 0,
            refreshed_at: None,
            discounts: categories
                .iter()
                .map(|c| (c.clone(), Vec::new()))
                .collect(),
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.discounts.values().map(Vec::len).sum()
    }
}

struct Inner {
    manager: ScraperManager,
    pool: Arc<Semaphore>,
    cache: RwLock<Arc<CacheSnapshot>>,
    refresh_lock: Mutex<()>,
}

/// Aggregates discounts across sites and owns the shared cache.
///
/// Cheap to clone; clones share the manager, the fetch pool and the cache.
#[derive(Clone)]
pub struct DiscountService {
    inner: Arc<Inner>,
}

impl DiscountService {
    /// `max_concurrent_fetches` bounds page loads across every category and
    /// site for the lifetime of the service.
    #[must_use]
    pub fn new(manager: ScraperManager, max_concurrent_fetches: usize) -> Self {
        let empty = CacheSnapshot::empty(manager.registry().categories());
        Self {
            inner: Arc::new(Inner {
                manager,
                pool: Arc::new(Semaphore::new(max_concurrent_fetches.max(1))),
                cache: RwLock::new(Arc::new(empty)),
                refresh_lock: Mutex::new(()),
            }),
        }
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        self.inner.manager.registry().categories()
    }

    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.inner.manager.registry().has_category(category)
    }

    /// Scrape one category across every site concurrently.
    ///
    /// Every returned record carries `category` and the capitalised site
    /// name. A failing site is logged and contributes nothing. Records are
    /// ordered deepest discount first, unknown percents last.
    pub async fn fetch_category(&self, category: &str) -> Vec<Discount> {
        let mut tasks = JoinSet::new();
        for (site, scraper) in self.inner.manager.scrapers() {
            let site = *site;
            let scraper = Arc::clone(scraper);
            let pool = Arc::clone(&self.inner.pool);
            let category = category.to_string();
            tasks.spawn(async move {
                let found = scraper.scrape_category(&category, &pool).await;
                (site, found)
            });
        }

        let mut discounts = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((site, found)) => {
                    let display = site.display_name();
                    discounts.extend(found.into_iter().map(|d| d.tagged(category, &display)));
                }
                Err(e) => {
                    tracing::error!(category, error = %e, "site scrape task failed");
                }
            }
        }

        discounts.sort_by_key(|d| Reverse(d.percent_value()));
        discounts
    }

    /// Scrape every configured category concurrently.
    ///
    /// The key set always equals the configured categories; a category
    /// whose task fails maps to an empty list.
    pub async fn fetch_all(&self) -> BTreeMap<String, Vec<Discount>> {
        let mut all: BTreeMap<String, Vec<Discount>> = self
            .categories()
            .iter()
            .map(|c| (c.clone(), Vec::new()))
            .collect();

        let mut tasks = JoinSet::new();
        for category in self.categories() {
            let service = self.clone();
            let category = category.clone();
            tasks.spawn(async move {
                let found = service.fetch_category(&category).await;
                (category, found)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((category, found)) => {
                    tracing::info!(category = %category, count = found.len(), "category fetched");
                    all.insert(category, found);
                }
                Err(e) => {
                    tracing::error!(error = %e, "category fetch task failed");
                }
            }
        }

        all
    }

    /// Compute a full new generation and publish it in one swap.
    ///
    /// Concurrent callers queue; each runs its own complete fetch.
    pub async fn refresh(&self) -> Arc<CacheSnapshot> {
        let _guard = self.inner.refresh_lock.lock().await;

        let started = std::time::Instant::now();
        let discounts = self.fetch_all().await;
        let next = Arc::new(CacheSnapshot {
            generation: self.snapshot().generation + 1,
            refreshed_at: Some(Utc::now()),
            discounts,
        });

        {
            let mut cache = self
                .inner
                .cache
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *cache = Arc::clone(&next);
        }

        tracing::info!(
            generation = next.generation,
            categories = next.discounts.len(),
            total = next.total(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "discounts refreshed"
        );
        next
    }

    /// The current generation.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        let cache = self
            .inner
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&cache)
    }

    /// Cached discounts for `category`, or `None` if it is not configured.
    #[must_use]
    pub fn cached(&self, category: &str) -> Option<Vec<Discount>> {
        self.snapshot().discounts.get(category).cloned()
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
