mod discounts;
mod snapshot;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use cragdeals_core::{AppConfig, Site};
use cragdeals_scraper::UrlRegistry;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cragdeals-cli")]
#[command(about = "Climbing gear discount aggregator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape and print discounts (fixtures outside production)
    Discounts {
        /// Only this category
        #[arg(long, short = 'c')]
        category: Option<String>,

        /// Hide image URLs
        #[arg(long)]
        no_images: bool,

        /// Hide the closing summary
        #[arg(long)]
        no_summary: bool,
    },
    /// List configured categories
    Categories,
    /// Capture every configured page into the fixtures directory
    Snapshot {
        /// Only this site
        #[arg(long)]
        site: Option<Site>,

        /// Write here instead of `CRAGDEALS_FIXTURES_DIR`
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cragdeals_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let registry = load_registry(&config)?;

    match cli.command {
        Commands::Discounts {
            category,
            no_images,
            no_summary,
        } => {
            discounts::run_discounts(
                &config,
                registry,
                category.as_deref(),
                !no_images,
                !no_summary,
            )
            .await?;
        }
        Commands::Categories => discounts::run_categories(&registry),
        Commands::Snapshot { site, out_dir } => {
            let out_dir = out_dir.unwrap_or_else(|| config.fixtures_dir.clone());
            snapshot::run_snapshot(&config, &registry, site, &out_dir).await?;
        }
    }

    Ok(())
}

fn load_registry(config: &AppConfig) -> anyhow::Result<Arc<UrlRegistry>> {
    let catalog = cragdeals_core::load_catalog(&config.categories_path, &config.sites_path)
        .context("failed to load category catalog")?;
    Ok(Arc::new(UrlRegistry::from_catalog(&catalog)))
}
