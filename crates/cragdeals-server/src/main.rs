mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use anyhow::Context as _;
use cragdeals_scraper::{DiscountService, LoaderStrategy, ScraperManager, UrlRegistry};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = cragdeals_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let catalog = cragdeals_core::load_catalog(&config.categories_path, &config.sites_path)
        .context("failed to load category catalog")?;
    let registry = Arc::new(UrlRegistry::from_catalog(&catalog));
    tracing::info!(
        env = %config.env,
        categories = registry.categories().len(),
        sites = registry.sites().count(),
        "catalog loaded"
    );

    let strategy = LoaderStrategy::from_config(&config, &registry)?;
    let manager = ScraperManager::new(registry, strategy);
    let service = DiscountService::new(manager, config.scraper_max_concurrent_fetches);

    let initial = service.refresh().await;
    tracing::info!(
        generation = initial.generation,
        total = initial.total(),
        "initial refresh complete"
    );

    let _scheduler =
        scheduler::build_scheduler(service.clone(), config.refresh_interval_hours).await?;

    let app = build_app(AppState { service });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
