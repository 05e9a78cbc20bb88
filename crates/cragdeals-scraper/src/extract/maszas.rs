use std::sync::LazyLock;

use cragdeals_core::Discount;
use scraper::Selector;

use super::{ensure_listing_page, selector, untagged, SiteExtractor};
use crate::document::{attr, first, first_text, Document};
use crate::error::ScraperError;
use crate::percent::derive_percent;

static ITEM: LazyLock<Selector> =
    LazyLock::new(|| selector("div.product-snapshot.list_div_item"));
static NAME: LazyLock<Selector> = LazyLock::new(|| selector("h2 a"));
static OLD_PRICE: LazyLock<Selector> = LazyLock::new(|| selector("span.list_original"));
static NEW_PRICE: LazyLock<Selector> = LazyLock::new(|| selector("span.list_special"));
static THUMBNAIL_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.img-thumbnail-link"));
static THUMBNAIL: LazyLock<Selector> = LazyLock::new(|| selector("a.img-thumbnail-link img"));

/// Maszas prints no percent label; it is always computed from prices.
pub struct MaszasExtractor;

impl SiteExtractor for MaszasExtractor {
    fn extract(&self, document: &Document) -> Result<Vec<Discount>, ScraperError> {
        ensure_listing_page(document)?;

        let mut discounts = Vec::new();
        for item in document.html().select(&ITEM) {
            let Some(old_price) = first_text(item, &OLD_PRICE) else {
                continue;
            };
            let Some(new_price) = first_text(item, &NEW_PRICE) else {
                continue;
            };
            let Some(url) = first(item, &THUMBNAIL_LINK)
                .and_then(|link| attr(link, "href"))
                .and_then(|href| document.resolve(href))
            else {
                continue;
            };
            let Some(product) = first_text(item, &NAME) else {
                tracing::warn!(url = %document.url(), product_url = %url, "maszas item without a name; skipping");
                continue;
            };

            // Lazy-loaded thumbnails keep the real source in data-src.
            let image_url = first(item, &THUMBNAIL)
                .and_then(|img| attr(img, "data-src").or_else(|| attr(img, "src")))
                .and_then(|src| document.resolve(src));

            let discount_percent = derive_percent(None, &old_price, &new_price);

            discounts.push(untagged(
                product,
                url,
                image_url,
                old_price,
                new_price,
                discount_percent,
            ));
        }

        tracing::debug!(url = %document.url(), count = discounts.len(), "maszas page extracted");
        Ok(discounts)
    }
}
