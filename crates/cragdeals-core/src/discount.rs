use serde::{Deserialize, Serialize};

/// One page that must be fetched for a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscountUrl {
    pub category: String,
    pub url: String,
}

impl DiscountUrl {
    #[must_use]
    pub fn new(category: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            url: url.into(),
        }
    }
}

/// A normalized discounted product.
///
/// Extractors leave `category` and `site` as `None`; the aggregation layer
/// fills both exactly once before a record leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub product: String,
    pub url: String,
    pub image_url: Option<String>,
    pub old_price: String,
    pub new_price: String,
    pub category: Option<String>,
    pub site: Option<String>,
    /// `-<N>` with no `%`, or `None` when it could not be derived.
    pub discount_percent: Option<String>,
}

impl Discount {
    /// Numeric depth of the discount (`"-15"` gives `15`).
    #[must_use]
    pub fn percent_value(&self) -> Option<u32> {
        self.discount_percent
            .as_deref()
            .and_then(|p| p.trim_start_matches('-').parse::<u32>().ok())
    }

    /// Stamp the aggregation context onto an extractor-produced record.
    #[must_use]
    pub fn tagged(mut self, category: &str, site: &str) -> Self {
        self.category = Some(category.to_string());
        self.site = Some(site.to_string());
        self
    }
}
