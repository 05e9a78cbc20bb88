use std::sync::LazyLock;

use cragdeals_core::Discount;
use scraper::Selector;

use super::{compose_name, ensure_listing_page, selector, untagged, SiteExtractor};
use crate::document::{attr, first, first_text, text, Document};
use crate::error::ScraperError;
use crate::percent::derive_percent;

static ITEM: LazyLock<Selector> = LazyLock::new(|| selector("li.product-item.product-fallback"));
static PERCENT: LazyLock<Selector> =
    LazyLock::new(|| selector("span.js-special-discount-percent"));
static BRAND: LazyLock<Selector> = LazyLock::new(|| selector("div.manufacturer-title"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("div.product-title"));
static OLD_PRICE: LazyLock<Selector> = LazyLock::new(|| selector("span.uvp"));
static NEW_PRICE: LazyLock<Selector> = LazyLock::new(|| selector("span.price.high-light"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.product-link"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("a.product-link img.product-image"));

const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Prices on "from" listings read `from 89,95 €`.
fn strip_from(price: &str) -> String {
    price.replace("from ", "").trim().to_string()
}

pub struct BergfreundeExtractor;

impl SiteExtractor for BergfreundeExtractor {
    fn extract(&self, document: &Document) -> Result<Vec<Discount>, ScraperError> {
        ensure_listing_page(document)?;

        let mut discounts = Vec::new();
        for item in document.html().select(&ITEM) {
            let Some(old_price) = first_text(item, &OLD_PRICE).map(|p| strip_from(&p)) else {
                continue;
            };
            let Some(new_price) = first_text(item, &NEW_PRICE).map(|p| strip_from(&p)) else {
                continue;
            };
            if old_price.is_empty() || new_price.is_empty() {
                continue;
            }
            let Some(url) = first(item, &LINK)
                .and_then(|link| attr(link, "href"))
                .and_then(|href| document.resolve(href))
            else {
                continue;
            };

            let brand = first_text(item, &BRAND);
            let title = first(item, &TITLE)
                .map(text)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string());
            let product = compose_name(brand.as_deref(), &title, None);

            let image_url = first(item, &IMAGE)
                .and_then(|img| attr(img, "src"))
                .and_then(|src| document.resolve(src));

            let label = first_text(item, &PERCENT);
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

        tracing::debug!(url = %document.url(), count = discounts.len(), "bergfreunde page extracted");
        Ok(discounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::document;

    const PAGE_URL: &str = "https://www.bergfreunde.eu/climbing-ropes/";

    fn item(inner: &str) -> String {
        format!(r#"<ul><li class="product-item product-fallback">{inner}</li></ul>"#)
    }

    const FULL_ITEM: &str = r#"
        <a class="product-link" href="/edelrid-boa-9-8mm-climbing-rope/">
            <img class="product-image" src="https://images.bergfreunde.eu/boa.jpg">
        </a>
        <div class="manufacturer-title">Edelrid</div>
        <div class="product-title"><span>Boa</span> <span>9.8mm</span></div>
        <span class="js-special-discount-percent">-25 %</span>
        <span class="uvp">from 159,95 €</span>
        <span class="price high-light">from 119,95 €</span>
    "#;

    #[test]
    fn extracts_a_complete_item() {
        let page = document(PAGE_URL, &item(FULL_ITEM));
        let found = BergfreundeExtractor.extract(&page).unwrap();
        assert_eq!(found.len(), 1);
        let d = &found[0];
        assert_eq!(d.product, "Edelrid Boa 9.8mm");
        assert_eq!(
            d.url,
            "https://www.bergfreunde.eu/edelrid-boa-9-8mm-climbing-rope/"
        );
        assert_eq!(
            d.image_url.as_deref(),
            Some("https://images.bergfreunde.eu/boa.jpg")
        );
        assert_eq!(d.old_price, "159,95 €");
        assert_eq!(d.new_price, "119,95 €");
        assert_eq!(d.discount_percent.as_deref(), Some("-25"));
        assert!(d.category.is_none());
        assert!(d.site.is_none());
    }

    #[test]
    fn does_not_repeat_brand_already_in_title() {
        let markup = FULL_ITEM.replace(
            "<span>Boa</span>",
            "<span>Edelrid</span> <span>Boa</span>",
        );
        let page = document(PAGE_URL, &item(&markup));
        let found = BergfreundeExtractor.extract(&page).unwrap();
        assert_eq!(found[0].product, "Edelrid Boa 9.8mm");
    }

    #[test]
    fn missing_title_falls_back_to_unknown_product() {
        let markup = FULL_ITEM.replace(
            r#"<div class="product-title"><span>Boa</span> <span>9.8mm</span></div>"#,
            "",
        );
        let page = document(PAGE_URL, &item(&markup));
        let found = BergfreundeExtractor.extract(&page).unwrap();
        assert_eq!(found[0].product, "Edelrid Unknown Product");
    }

    #[test]
    fn computes_percent_when_label_is_absent() {
        let markup = FULL_ITEM
            .replace(r#"<span class="js-special-discount-percent">-25 %</span>"#, "")
            .replace("from 159,95 €", "120,00 €")
            .replace("from 119,95 €", "102,00 €");
        let page = document(PAGE_URL, &item(&markup));
        let found = BergfreundeExtractor.extract(&page).unwrap();
        assert_eq!(found[0].discount_percent.as_deref(), Some("-15"));
    }

    #[test]
    fn skips_items_without_both_prices_or_a_link() {
        let no_old = FULL_ITEM.replace(r#"<span class="uvp">from 159,95 €</span>"#, "");
        let no_link = FULL_ITEM.replace(
            r#"href="/edelrid-boa-9-8mm-climbing-rope/""#,
            "",
        );
        let body = format!("{}{}", item(&no_old), item(&no_link));
        let page = document(PAGE_URL, &body);
        assert!(BergfreundeExtractor.extract(&page).unwrap().is_empty());
    }
}
