//! The worker's claim loop (§4.H): poll for work, run it, repeat, with a
//! grace period for an in-flight job on shutdown.

use std::sync::Arc;

use ragq_domain::value_objects::constants::SHUTDOWN_GRACE_SECS;
use ragq_domain::ports::ClaimOutcome;
use tokio::sync::watch;

use crate::context::WorkerContext;
use crate::dispatch::process_job;

/// Run the claim loop until `shutdown` is signalled. Returns once the loop
/// has cleanly exited: either idle with no job in flight, or after waiting
/// out the shutdown grace period for one that was.
pub async fn run(ctx: Arc<WorkerContext>, mut shutdown: watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }

        let claimed = match ctx.queue.claim(ctx.worker_type, &ctx.worker_id).await {
            Ok(ClaimOutcome::Claimed(job)) => Some(job),
            Ok(ClaimOutcome::Empty | ClaimOutcome::Unavailable) => None,
            Err(e) => {
                tracing::warn!(error = %e, "claim attempt failed");
                None
            }
        };

        let Some(job) = claimed else {
            tokio::select! {
                () = tokio::time::sleep(ctx.poll_interval) => {}
                _ = shutdown.changed() => {}
            }
            continue;
        };

        let handle = tokio::spawn(process_job(ctx.clone(), job));
        tokio::pin!(handle);
        tokio::select! {
            _ = &mut handle => {}
            _ = shutdown.changed() => {
                let grace = std::time::Duration::from_secs(SHUTDOWN_GRACE_SECS);
                if tokio::time::timeout(grace, &mut handle).await.is_err() {
                    tracing::warn!("shutdown grace period elapsed with a job still in flight");
                }
            }
        }
    }
}
