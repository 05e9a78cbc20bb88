//! `snapshot` command: capture live pages as fixture files.
//!
//! Each configured page is written under the name the fixture loader reads
//! it back from. Per-page failures are reported and skipped.

use std::path::{Path, PathBuf};

use cragdeals_core::{AppConfig, Site};
use cragdeals_scraper::{fixture_file_name, ContentLoader, FetchError, LoaderStrategy, UrlRegistry};
use futures::stream::{self, StreamExt};
use url::Url;

/// One page to capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SnapshotTarget {
    pub site: Site,
    pub category: String,
    pub index: usize,
    pub url: String,
}

impl SnapshotTarget {
    fn file_name(&self) -> String {
        fixture_file_name(self.site, &self.category, self.index)
    }
}

pub(crate) fn snapshot_targets(registry: &UrlRegistry, only: Option<Site>) -> Vec<SnapshotTarget> {
    registry
        .pages()
        .filter(|page| only.is_none_or(|site| site == page.site))
        .map(|page| SnapshotTarget {
            site: page.site,
            category: page.category.to_string(),
            index: page.index,
            url: page.url.to_string(),
        })
        .collect()
}

/// Capture every configured page (optionally for one site) into `out_dir`.
///
/// # Errors
///
/// Returns an error if the loaders cannot be built, `out_dir` cannot be
/// created, or not a single page could be captured.
pub(crate) async fn run_snapshot(
    config: &AppConfig,
    registry: &UrlRegistry,
    only: Option<Site>,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let targets = snapshot_targets(registry, only);
    if targets.is_empty() {
        println!("no configured pages to capture");
        return Ok(());
    }

    tokio::fs::create_dir_all(out_dir).await?;
    let strategy = LoaderStrategy::live(config)?;
    let rendered = strategy.rendered();

    println!(
        "Capturing {} pages into {}",
        targets.len(),
        out_dir.display()
    );

    let results: Vec<(&SnapshotTarget, anyhow::Result<PathBuf>)> = stream::iter(&targets)
        .map(|target| {
            let primary = strategy.loader_for(target.site);
            let fallback = if target.site.requires_rendering() {
                None
            } else {
                rendered.clone()
            };
            async move {
                let outcome =
                    capture_page(target, primary.as_ref(), fallback.as_deref(), out_dir).await;
                (target, outcome)
            }
        })
        .buffer_unordered(config.scraper_max_concurrent_fetches.max(1))
        .collect()
        .await;

    let mut failed = 0usize;
    for (target, outcome) in &results {
        match outcome {
            Ok(path) => println!("  \u{2713} {}", path.display()),
            Err(e) => {
                failed += 1;
                tracing::error!(
                    site = %target.site,
                    category = %target.category,
                    url = %target.url,
                    error = %e,
                    "snapshot capture failed"
                );
                println!("  \u{2717} {} {} {}: {e:#}", target.site, target.category, target.url);
            }
        }
    }

    let captured = results.len() - failed;
    println!("captured {captured} of {} pages", results.len());
    if captured == 0 {
        anyhow::bail!("no pages could be captured");
    }
    Ok(())
}

/// Load one page and write it to its fixture file.
///
/// When `primary` fails and a `fallback` loader is given, the page is
/// retried once through it.
pub(crate) async fn capture_page(
    target: &SnapshotTarget,
    primary: &dyn ContentLoader,
    fallback: Option<&dyn ContentLoader>,
    out_dir: &Path,
) -> anyhow::Result<PathBuf> {
    let url = Url::parse(&target.url)?;

    let markup = match load_markup(primary, &url).await {
        Ok(markup) => markup,
        Err(e) => {
            let Some(fallback) = fallback else {
                return Err(e.into());
            };
            tracing::warn!(
                site = %target.site,
                url = %url,
                error = %e,
                "direct fetch failed; retrying through render service"
            );
            load_markup(fallback, &url).await?
        }
    };

    let path = out_dir.join(target.file_name());
    tokio::fs::write(&path, markup).await?;
    Ok(path)
}

async fn load_markup(loader: &dyn ContentLoader, url: &Url) -> Result<String, FetchError> {
    let budget = loader.budget();
    let document = tokio::time::timeout(budget, loader.load(url))
        .await
        .map_err(|_| FetchError::Timeout {
            url: url.to_string(),
            budget,
        })??;
    Ok(document.html().html())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use cragdeals_core::{Catalog, DiscountUrl};
    use cragdeals_scraper::Document;

    use super::*;

    struct StubLoader {
        body: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl StubLoader {
        fn serving(body: &'static str) -> Self {
            Self {
                body: Some(body),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                body: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContentLoader for StubLoader {
        async fn load(&self, url: &Url) -> Result<Document, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.body {
                Some(body) => Document::parse(url.clone(), body),
                None => Err(FetchError::UnexpectedStatus {
                    status: 403,
                    url: url.to_string(),
                }),
            }
        }

        fn budget(&self) -> Duration {
            Duration::from_secs(5)
        }
    }

    fn target(index: usize) -> SnapshotTarget {
        SnapshotTarget {
            site: Site::Bergfreunde,
            category: "friends-nuts".to_string(),
            index,
            url: "https://www.bergfreunde.eu/nuts-hexes/".to_string(),
        }
    }

    fn registry() -> UrlRegistry {
        let mut site_urls = BTreeMap::new();
        site_urls.insert(
            Site::Bergfreunde,
            vec![
                DiscountUrl::new("friends-nuts", "https://www.bergfreunde.eu/camming-devices-friends/"),
                DiscountUrl::new("friends-nuts", "https://www.bergfreunde.eu/nuts-hexes/"),
            ],
        );
        site_urls.insert(
            Site::Maszas,
            vec![DiscountUrl::new("ropes", "https://www.maszas.hu/kotelek")],
        );
        UrlRegistry::from_catalog(&Catalog {
            categories: vec!["friends-nuts".to_string(), "ropes".to_string()],
            site_urls,
        })
    }

    #[test]
    fn targets_cover_every_page_with_positions() {
        let targets = snapshot_targets(&registry(), None);
        let names: Vec<String> = targets.iter().map(SnapshotTarget::file_name).collect();
        assert_eq!(
            names,
            vec![
                "bergfreunde_friends-nuts.html",
                "bergfreunde_friends-nuts_2.html",
                "maszas_ropes.html",
            ]
        );
    }

    #[test]
    fn targets_can_be_limited_to_one_site() {
        let targets = snapshot_targets(&registry(), Some(Site::Maszas));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].url, "https://www.maszas.hu/kotelek");
    }

    #[tokio::test]
    async fn capture_writes_fixture_file() {
        let dir = tempfile::tempdir().unwrap();
        let primary = StubLoader::serving("<html><body><ul><li>nut</li></ul></body></html>");

        let path = capture_page(&target(1), &primary, None, dir.path())
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("bergfreunde_friends-nuts_2.html"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<li>nut</li>"));
    }

    #[tokio::test]
    async fn failed_direct_fetch_retries_through_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let primary = StubLoader::failing();
        let fallback = StubLoader::serving("<html><body><p>rendered</p></body></html>");

        let path = capture_page(&target(0), &primary, Some(&fallback), dir.path())
            .await
            .unwrap();

        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
        assert!(std::fs::read_to_string(path).unwrap().contains("rendered"));
    }

    #[tokio::test]
    async fn slow_load_reports_its_budget() {
        struct StallingLoader;

        #[async_trait]
        impl ContentLoader for StallingLoader {
            async fn load(&self, _url: &Url) -> Result<Document, FetchError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                unreachable!("load should have timed out")
            }

            fn budget(&self) -> Duration {
                Duration::from_millis(150)
            }
        }

        let url = Url::parse("https://www.maszas.hu/kotelek").unwrap();
        let err = load_markup(&StallingLoader, &url).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "timed out after 150ms loading https://www.maszas.hu/kotelek"
        );
    }

    #[tokio::test]
    async fn failure_without_fallback_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let primary = StubLoader::failing();

        let err = capture_page(&target(0), &primary, None, dir.path())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("403"));
        assert!(!dir.path().join("bergfreunde_friends-nuts.html").exists());
    }
}
