//! Per-retailer extraction of discounted listings.
//!
//! Each extractor owns the markup rules for one site and nothing else. The
//! loader that produced the [`Document`] is irrelevant here, which keeps
//! fixture runs and live runs on the same parsing code.

mod bergfreunde;
mod fourcamping;
mod maszas;
mod mountex;

use cragdeals_core::{Discount, Site};
use scraper::Selector;

use crate::document::Document;
use crate::error::ScraperError;

pub use bergfreunde::BergfreundeExtractor;
pub use fourcamping::FourCampingExtractor;
pub use maszas::MaszasExtractor;
pub use mountex::MountexExtractor;

pub trait SiteExtractor: Send + Sync {
    /// Extract every discounted product on the page.
    ///
    /// Items missing a product URL or either price are skipped. A page with
    /// no product containers yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Markup`] when the page has no usable body.
    fn extract(&self, document: &Document) -> Result<Vec<Discount>, ScraperError>;
}

#[must_use]
pub fn extractor_for(site: Site) -> Box<dyn SiteExtractor> {
    match site {
        Site::Bergfreunde => Box::new(BergfreundeExtractor),
        Site::Mountex => Box::new(MountexExtractor),
        Site::FourCamping => Box::new(FourCampingExtractor),
        Site::Maszas => Box::new(MaszasExtractor),
    }
}

/// Selectors are compile-time constants; a parse failure is a programming error.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

pub(crate) fn ensure_listing_page(document: &Document) -> Result<(), ScraperError> {
    if document.has_body_content() {
        Ok(())
    } else {
        Err(ScraperError::Markup {
            url: document.url().to_string(),
            reason: "document body is empty".to_string(),
        })
    }
}

/// Join brand, model and variant into a display name.
///
/// The brand is dropped when the model already starts with it.
pub(crate) fn compose_name(brand: Option<&str>, model: &str, variant: Option<&str>) -> String {
    let model = model.trim();
    let mut parts: Vec<&str> = Vec::with_capacity(3);

    if let Some(brand) = brand.map(str::trim).filter(|b| !b.is_empty()) {
        if !model.to_lowercase().starts_with(&brand.to_lowercase()) {
            parts.push(brand);
        }
    }
    if !model.is_empty() {
        parts.push(model);
    }
    if let Some(variant) = variant.map(str::trim).filter(|v| !v.is_empty()) {
        parts.push(variant);
    }

    parts.join(" ")
}

/// A record as an extractor emits it: no category, no site.
pub(crate) fn untagged(
    product: String,
    url: String,
    image_url: Option<String>,
    old_price: String,
    new_price: String,
    discount_percent: Option<String>,
) -> Discount {
    Discount {
        product,
        url,
        image_url,
        old_price,
        new_price,
        category: None,
        site: None,
        discount_percent,
    }
}
