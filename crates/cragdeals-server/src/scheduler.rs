//! Background job scheduler.
//!
//! Registers the recurring discount refresh. The first refresh runs in
//! `main` before the listener binds, so the first tick here is one full
//! interval after startup.

use std::time::Duration;

use cragdeals_scraper::DiscountService;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    service: DiscountService,
    interval_hours: u64,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_refresh_job(&scheduler, service, interval_hours).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_refresh_job(
    scheduler: &JobScheduler,
    service: DiscountService,
    interval_hours: u64,
) -> Result<(), JobSchedulerError> {
    let interval = refresh_interval(interval_hours);

    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let service = service.clone();
        Box::pin(async move {
            tracing::info!("scheduler: starting discount refresh");
            let snapshot = service.refresh().await;
            tracing::info!(
                generation = snapshot.generation,
                total = snapshot.total(),
                "scheduler: discount refresh complete"
            );
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(interval_hours, "scheduler: refresh job registered");
    Ok(())
}

fn refresh_interval(hours: u64) -> Duration {
    Duration::from_secs(hours.max(1).saturating_mul(3600))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_interval_is_hours_in_seconds() {
        assert_eq!(refresh_interval(12), Duration::from_secs(43_200));
    }

    #[test]
    fn refresh_interval_never_zero() {
        assert_eq!(refresh_interval(0), Duration::from_secs(3600));
    }
}
