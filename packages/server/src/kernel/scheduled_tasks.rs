//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! The only scheduled task is the claim-expiry sweep. It reads due-times
//! from the database on every run, so no timer state is lost across
//! restarts and each firing is idempotent.
//!
//! ```text
//! Scheduler (every 5 minutes)
//!     │
//!     └─► sweep_expired_reviews()
//!             └─► For each overdue review → archive review, requeue transcript
//! ```

use anyhow::Result;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::CoreConfig;
use crate::domains::reviews::expiry::sweep_expired_reviews;

/// Start all scheduled tasks
pub async fn start_scheduler(pool: PgPool, config: CoreConfig) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let sweep_pool = pool.clone();
    let sweep_job = Job::new_async("0 */5 * * * *", move |_uuid, _lock| {
        let pool = sweep_pool.clone();
        Box::pin(async move {
            match sweep_expired_reviews(&pool, &config).await {
                Ok(expired) if expired > 0 => {
                    tracing::info!("Expiry sweep requeued {} transcripts", expired);
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Expiry sweep failed: {}", e),
            }
        })
    })?;

    scheduler.add(sweep_job).await?;
    scheduler.start().await?;

    tracing::info!(
        "Scheduled tasks started (claim expiry sweep every 5 minutes, window {}h)",
        config.expiry_hours
    );
    Ok(scheduler)
}
