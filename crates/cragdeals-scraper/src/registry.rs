use std::collections::BTreeMap;

use cragdeals_core::{Catalog, DiscountUrl, Site};
use url::Url;

/// One configured page, addressed by site, category and its position within
/// that `(site, category)` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRef<'a> {
    pub site: Site,
    pub category: &'a str,
    pub index: usize,
    pub url: &'a str,
}

/// Read-only index over the configured `{category × site → urls}` pages.
#[derive(Debug, Clone, Default)]
pub struct UrlRegistry {
    categories: Vec<String>,
    by_site: BTreeMap<Site, Vec<DiscountUrl>>,
}

impl UrlRegistry {
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            categories: catalog.categories.clone(),
            by_site: catalog.site_urls.clone(),
        }
    }

    /// Every configured category, whether or not any site serves it.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Sites with at least one configured page.
    pub fn sites(&self) -> impl Iterator<Item = Site> + '_ {
        self.by_site.keys().copied()
    }

    #[must_use]
    pub fn for_site(&self, site: Site) -> &[DiscountUrl] {
        self.by_site
            .get(&site)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Pages across all sites for one category.
    #[must_use]
    pub fn for_category(&self, category: &str) -> Vec<(Site, &DiscountUrl)> {
        self.by_site
            .iter()
            .flat_map(|(site, urls)| urls.iter().map(move |u| (*site, u)))
            .filter(|(_, u)| u.category == category)
            .collect()
    }

    /// Every page with its position inside its `(site, category)` entry.
    pub fn pages(&self) -> impl Iterator<Item = PageRef<'_>> + '_ {
        self.by_site.iter().flat_map(|(site, urls)| {
            urls.iter().enumerate().map(move |(i, u)| PageRef {
                site: *site,
                category: u.category.as_str(),
                index: urls[..i].iter().filter(|p| p.category == u.category).count(),
                url: u.url.as_str(),
            })
        })
    }

    /// Find the configured page whose URL matches `url`.
    #[must_use]
    pub fn locate(&self, url: &Url) -> Option<PageRef<'_>> {
        self.pages()
            .find(|page| Url::parse(page.url).is_ok_and(|configured| &configured == url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> UrlRegistry {
        let mut site_urls = BTreeMap::new();
        site_urls.insert(
            Site::Bergfreunde,
            vec![
                DiscountUrl::new("friends-nuts", "https://www.bergfreunde.eu/camming-devices-friends/"),
                DiscountUrl::new("friends-nuts", "https://www.bergfreunde.eu/nuts-hexes/"),
                DiscountUrl::new("ropes", "https://www.bergfreunde.eu/climbing-ropes/"),
            ],
        );
        site_urls.insert(
            Site::Maszas,
            vec![DiscountUrl::new("ropes", "https://www.maszas.hu/kotelek")],
        );
        UrlRegistry::from_catalog(&Catalog {
            categories: vec![
                "friends-nuts".to_string(),
                "ropes".to_string(),
                "slings".to_string(),
            ],
            site_urls,
        })
    }

    #[test]
    fn for_site_returns_only_that_sites_pages() {
        let r = registry();
        assert_eq!(r.for_site(Site::Bergfreunde).len(), 3);
        assert_eq!(r.for_site(Site::Maszas).len(), 1);
        assert!(r.for_site(Site::Mountex).is_empty());
    }

    #[test]
    fn for_category_spans_sites() {
        let r = registry();
        let ropes = r.for_category("ropes");
        let sites: Vec<Site> = ropes.iter().map(|(s, _)| *s).collect();
        assert_eq!(sites, vec![Site::Bergfreunde, Site::Maszas]);
        assert!(r.for_category("slings").is_empty());
    }

    #[test]
    fn categories_include_unserved_ones() {
        let r = registry();
        assert!(r.has_category("slings"));
        assert!(!r.has_category("helmets"));
        assert_eq!(r.categories().len(), 3);
    }

    #[test]
    fn pages_number_entries_within_site_and_category() {
        let r = registry();
        let indexes: Vec<(Site, &str, usize)> =
            r.pages().map(|p| (p.site, p.category, p.index)).collect();
        assert_eq!(
            indexes,
            vec![
                (Site::Bergfreunde, "friends-nuts", 0),
                (Site::Bergfreunde, "friends-nuts", 1),
                (Site::Bergfreunde, "ropes", 0),
                (Site::Maszas, "ropes", 0),
            ]
        );
    }

    #[test]
    fn locate_matches_parsed_urls() {
        let r = registry();
        let page = r
            .locate(&Url::parse("https://www.bergfreunde.eu/nuts-hexes/").unwrap())
            .unwrap();
        assert_eq!(page.site, Site::Bergfreunde);
        assert_eq!(page.category, "friends-nuts");
        assert_eq!(page.index, 1);
        assert!(r
            .locate(&Url::parse("https://www.rei.com/").unwrap())
            .is_none());
    }
}
