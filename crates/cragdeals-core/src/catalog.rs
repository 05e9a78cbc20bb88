use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::discount::DiscountUrl;
use crate::site::Site;
use crate::ConfigError;

/// A `(category, site)` entry may name a single page or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UrlSpec {
    One(String),
    Many(Vec<String>),
}

impl UrlSpec {
    #[must_use]
    pub fn urls(&self) -> Vec<&str> {
        match self {
            UrlSpec::One(url) => vec![url.as_str()],
            UrlSpec::Many(urls) => urls.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesFile {
    pub categories: BTreeMap<String, BTreeMap<String, UrlSpec>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitesFile {
    pub sites: Vec<SiteConfig>,
}

/// The validated `{category × site → urls}` configuration, restricted to
/// enabled sites that have an extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Every configured category, including ones no enabled site serves.
    pub categories: Vec<String>,
    /// Pages per site in category order, preserving list order within a
    /// `(category, site)` entry.
    pub site_urls: BTreeMap<Site, Vec<DiscountUrl>>,
}

impl Catalog {
    /// Build a catalog from already-parsed files.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` when either file is malformed.
    pub fn from_files(
        categories_file: &CategoriesFile,
        sites_file: &SitesFile,
    ) -> Result<Self, ConfigError> {
        validate_sites(sites_file)?;
        validate_categories(categories_file)?;

        let enabled = enabled_sites(sites_file);

        let mut site_urls: BTreeMap<Site, Vec<DiscountUrl>> = BTreeMap::new();
        for (category, by_site) in &categories_file.categories {
            for (site_name, spec) in by_site {
                let Ok(site) = site_name.parse::<Site>() else {
                    tracing::warn!(site = %site_name, category = %category, "no extractor for site; skipping");
                    continue;
                };
                if !enabled.contains(&site) {
                    tracing::debug!(site = %site, category = %category, "site disabled or not listed; skipping");
                    continue;
                }
                let entry = site_urls.entry(site).or_default();
                for url in spec.urls() {
                    entry.push(DiscountUrl::new(category.clone(), url));
                }
            }
        }

        Ok(Self {
            categories: categories_file.categories.keys().cloned().collect(),
            site_urls,
        })
    }
}

/// Load and validate the categories and sites files.
///
/// # Errors
///
/// Returns `ConfigError` if either file cannot be read, parsed, or fails validation.
pub fn load_catalog(categories_path: &Path, sites_path: &Path) -> Result<Catalog, ConfigError> {
    let categories_file: CategoriesFile = read_yaml(categories_path)?;
    let sites_file: SitesFile = read_yaml(sites_path)?;
    Catalog::from_files(&categories_file, &sites_file)
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    serde_yaml::from_str(&content).map_err(|e| ConfigError::CatalogFileParse {
        path: path.display().to_string(),
        source: e,
    })
}

fn enabled_sites(sites_file: &SitesFile) -> HashSet<Site> {
    sites_file
        .sites
        .iter()
        .filter(|s| s.enabled)
        .filter_map(|s| match s.name.parse::<Site>() {
            Ok(site) => Some(site),
            Err(e) => {
                tracing::warn!(error = %e, "site listed without an extractor; ignoring");
                None
            }
        })
        .collect()
}

fn validate_sites(sites_file: &SitesFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for site in &sites_file.sites {
        let name = site.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "site name must be non-empty".to_string(),
            ));
        }
        if !seen.insert(name) {
            return Err(ConfigError::Validation(format!(
                "duplicate site: '{}'",
                site.name
            )));
        }
    }
    Ok(())
}

fn validate_categories(categories_file: &CategoriesFile) -> Result<(), ConfigError> {
    for (category, by_site) in &categories_file.categories {
        if category.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category name must be non-empty".to_string(),
            ));
        }

        for (site, spec) in by_site {
            let urls = spec.urls();
            if urls.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "category '{category}' lists no URLs for site '{site}'"
                )));
            }
            for raw in urls {
                validate_url(category, site, raw)?;
            }
        }
    }
    Ok(())
}

fn validate_url(category: &str, site: &str, raw: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|e| {
        ConfigError::Validation(format!(
            "category '{category}', site '{site}': invalid URL '{raw}': {e}"
        ))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Validation(format!(
            "category '{category}', site '{site}': URL '{raw}' must be http(s)"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
