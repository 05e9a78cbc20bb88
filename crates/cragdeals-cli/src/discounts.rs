//! `discounts` and `categories` command handlers.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::sync::Arc;

use cragdeals_core::{AppConfig, Discount};
use cragdeals_scraper::{DiscountService, LoaderStrategy, ScraperManager, UrlRegistry};

/// Scrape one category or all of them and print the listings.
///
/// # Errors
///
/// Returns an error if `category` is not configured or the loaders cannot
/// be built. Per-site scrape failures are logged, not propagated.
pub(crate) async fn run_discounts(
    config: &AppConfig,
    registry: Arc<UrlRegistry>,
    category: Option<&str>,
    show_images: bool,
    show_summary: bool,
) -> anyhow::Result<()> {
    if let Some(category) = category {
        if !registry.has_category(category) {
            anyhow::bail!(
                "category '{category}' is not configured; available: {}",
                registry.categories().join(", ")
            );
        }
    }

    let strategy = LoaderStrategy::from_config(config, &registry)?;
    let manager = ScraperManager::new(registry, strategy);
    let service = DiscountService::new(manager, config.scraper_max_concurrent_fetches);

    if let Some(category) = category {
        println!("Fetching discounts for category: {category}");
        let discounts = service.fetch_category(category).await;
        print!("{}", format_listing(category, &discounts, show_images));
        return Ok(());
    }

    println!("Fetching all discounts...");
    let all = service.fetch_all().await;
    for (category, discounts) in &all {
        print!("{}", format_listing(category, discounts, show_images));
    }
    if show_summary {
        print!("{}", format_summary(&all));
    }
    Ok(())
}

pub(crate) fn run_categories(registry: &UrlRegistry) {
    println!("Available categories:");
    for category in registry.categories() {
        println!("   - {category}");
    }
}

fn format_listing(category: &str, discounts: &[Discount], show_images: bool) -> String {
    let mut out = String::new();
    if discounts.is_empty() {
        let _ = writeln!(out, "\n[{category}] No discounts found.");
        return out;
    }

    let _ = writeln!(
        out,
        "\n[{}] {} discounts found:",
        category.to_uppercase(),
        discounts.len()
    );
    let _ = writeln!(out, "{}", "=".repeat(60));

    for (i, discount) in discounts.iter().enumerate() {
        let _ = writeln!(out, "{:2}. {}", i + 1, discount.product);
        let _ = writeln!(out, "    Site: {}", discount.site.as_deref().unwrap_or("-"));
        let _ = writeln!(out, "    URL: {}", discount.url);
        if show_images {
            if let Some(image) = &discount.image_url {
                let _ = writeln!(out, "    Image: {image}");
            }
        }
        let _ = write!(
            out,
            "    Price: {} \u{2192} {}",
            discount.old_price, discount.new_price
        );
        match &discount.discount_percent {
            Some(percent) => {
                let _ = writeln!(out, " ({percent}%)");
            }
            None => out.push('\n'),
        }
        out.push('\n');
    }
    out
}

fn format_summary(all: &BTreeMap<String, Vec<Discount>>) -> String {
    let total: usize = all.values().map(Vec::len).sum();
    let mut out = format!(
        "\nSUMMARY: {total} total discounts across {} categories\n",
        all.len()
    );
    for (category, discounts) in all {
        if discounts.is_empty() {
            continue;
        }
        let sites: BTreeSet<&str> = discounts.iter().filter_map(|d| d.site.as_deref()).collect();
        let _ = writeln!(
            out,
            "   {category}: {} discounts from {}",
            discounts.len(),
            sites.into_iter().collect::<Vec<_>>().join(", ")
        );
    }
    out
}
