use std::sync::LazyLock;

use cragdeals_core::Discount;
use scraper::Selector;

use super::{compose_name, ensure_listing_page, selector, untagged, SiteExtractor};
use crate::document::{attr, first, first_text, text, Document};
use crate::error::ScraperError;
use crate::percent::derive_percent;

static CARD: LazyLock<Selector> = LazyLock::new(|| selector(".product-card__inner"));
static OLD_PRICE: LazyLock<Selector> = LazyLock::new(|| selector(".card-price__discount del"));
static NEW_PRICE: LazyLock<Selector> = LazyLock::new(|| selector(".card-price__full strong"));
static PERCENT: LazyLock<Selector> =
    LazyLock::new(|| selector(".card-price__discount .card-price__discount-percent"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector(".product-card__heading-link"));
static PRODUCER: LazyLock<Selector> =
    LazyLock::new(|| selector(".product-card__heading-producer"));
static MODEL: LazyLock<Selector> = LazyLock::new(|| selector(".product-card__heading-model"));
static VARIANT: LazyLock<Selector> = LazyLock::new(|| selector(".product-card__heading-type"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| selector(".product-card__thumbnail img"));

pub struct FourCampingExtractor;

impl SiteExtractor for FourCampingExtractor {
    fn extract(&self, document: &Document) -> Result<Vec<Discount>, ScraperError> {
        ensure_listing_page(document)?;

        let mut discounts = Vec::new();
        for card in document.html().select(&CARD) {
            let Some(old_price) = first_text(card, &OLD_PRICE) else {
                continue;
            };
            let Some(link) = first(card, &LINK) else {
                continue;
            };
            let Some(url) = attr(link, "href").and_then(|href| document.resolve(href)) else {
                continue;
            };
            let Some(new_price) = first_text(card, &NEW_PRICE) else {
                continue;
            };

            let product = match (first_text(link, &PRODUCER), first_text(link, &MODEL)) {
                (Some(producer), Some(model)) => compose_name(
                    Some(&producer),
                    &model,
                    first_text(card, &VARIANT).as_deref(),
                ),
                _ => compose_name(None, &text(link), first_text(card, &VARIANT).as_deref()),
            };

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

        tracing::debug!(url = %document.url(), count = discounts.len(), "4camping page extracted");
        Ok(discounts)
    }
}
