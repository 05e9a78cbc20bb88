use std::sync::LazyLock;

use cragdeals_core::Discount;
use scraper::Selector;

use super::{compose_name, ensure_listing_page, selector, untagged, SiteExtractor};
use crate::document::{attr, first, first_text, text, Document};
use crate::error::ScraperError;
use crate::percent::derive_percent;

static CARD: LazyLock<Selector> = LazyLock::new(|| selector("div.bg-white.rounded-16"));
static PERCENT: LazyLock<Selector> = LazyLock::new(|| selector("span.bg-brand-highlight"));
static NAME_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.text-black.unstyled"));
static BRAND: LazyLock<Selector> = LazyLock::new(|| selector("div.font-bold.font-lora"));
static DIV: LazyLock<Selector> = LazyLock::new(|| selector("div"));
static OLD_PRICE: LazyLock<Selector> = LazyLock::new(|| selector("div.originalPrice"));
static NEW_PRICE: LazyLock<Selector> = LazyLock::new(|| selector("div.inActionPrice"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("a[href] img"));

/// Listings here are rendered client-side; the markup is the post-render DOM.
pub struct MountexExtractor;

impl SiteExtractor for MountexExtractor {
    fn extract(&self, document: &Document) -> Result<Vec<Discount>, ScraperError> {
        ensure_listing_page(document)?;

        let mut discounts = Vec::new();
        for card in document.html().select(&CARD) {
            let (Some(old_price), Some(new_price)) =
                (first_text(card, &OLD_PRICE), first_text(card, &NEW_PRICE))
            else {
                continue;
            };
            let Some(link) = first(card, &NAME_LINK) else {
                continue;
            };
            let Some(url) = attr(link, "href").and_then(|href| document.resolve(href)) else {
                continue;
            };

            // The second div inside the link carries the model name.
            let brand = first_text(link, &BRAND);
            let model = link
                .select(&DIV)
                .nth(1)
                .map_or_else(|| text(link), text);
            let product = compose_name(brand.as_deref(), &model, None);

            let image_url = first(card, &IMAGE)
                .and_then(|img| attr(img, "src"))
                .and_then(|src| document.resolve(src));

            let label = first_text(card, &PERCENT);
            let discount_percent = derive_percent(label.as_deref(), &old_price, &new_price);

            discounts.push(untagged(
                product,
                url,
                image_url,
                old_price,
                new_price,
                discount_percent,
            ));
        }

        tracing::debug!(url = %document.url(), count = discounts.len(), "mountex page extracted");
        Ok(discounts)
    }
}
