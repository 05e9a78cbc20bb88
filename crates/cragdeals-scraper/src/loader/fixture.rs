use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cragdeals_core::Site;
use url::Url;

use super::ContentLoader;
use crate::document::Document;
use crate::error::FetchError;
use crate::registry::{PageRef, UrlRegistry};

const FIXTURE_BUDGET: Duration = Duration::from_secs(10);

/// `{site}_{category}.html` for the first page of an entry,
/// `{site}_{category}_{n}.html` for the n-th (n ≥ 2).
#[must_use]
pub fn fixture_file_name(site: Site, category: &str, index: usize) -> String {
    if index == 0 {
        format!("{}_{category}.html", site.name())
    } else {
        format!("{}_{category}_{}.html", site.name(), index + 1)
    }
}

/// Reads captured pages instead of touching the network.
///
/// A page's file is named after its site, category and position, so the
/// same URL configured under two categories reads two different files. The
/// returned document keeps the configured URL so links resolve exactly as
/// they would live.
#[derive(Debug)]
pub struct FixtureLoader {
    dir: PathBuf,
    registry: Arc<UrlRegistry>,
}

impl FixtureLoader {
    #[must_use]
    pub fn new(dir: &Path, registry: &Arc<UrlRegistry>) -> Self {
        Self {
            dir: dir.to_path_buf(),
            registry: Arc::clone(registry),
        }
    }

    #[must_use]
    pub fn path_for(&self, page: &PageRef<'_>) -> PathBuf {
        self.dir
            .join(fixture_file_name(page.site, page.category, page.index))
    }

    async fn read(&self, page: &PageRef<'_>, url: &Url) -> Result<Document, FetchError> {
        let path = self.path_for(page);
        let markup = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FetchError::FixtureMissing {
                    path: path.display().to_string(),
                }
            } else {
                FetchError::FixtureIo {
                    path: path.display().to_string(),
                    source: e,
                }
            }
        })?;

        tracing::debug!(url = %url, path = %path.display(), "fixture loaded");
        Document::parse(url.clone(), &markup)
    }
}

#[async_trait]
impl ContentLoader for FixtureLoader {
    /// Looks `url` up in the registry; with no category to go on, the first
    /// page configured with that URL wins.
    async fn load(&self, url: &Url) -> Result<Document, FetchError> {
        let page = self
            .registry
            .locate(url)
            .ok_or_else(|| FetchError::UnmappedFixtureUrl {
                url: url.to_string(),
            })?;
        self.read(&page, url).await
    }

    async fn load_page(&self, page: &PageRef<'_>, url: &Url) -> Result<Document, FetchError> {
        self.read(page, url).await
    }

    fn budget(&self) -> Duration {
        FIXTURE_BUDGET
    }
}
