//! Daemon driver — invokes a run-once cycle on a fixed interval.
//!
//! The business logic stays in the cycle function; this driver only owns the
//! timing, logs and swallows cycle errors, and always reschedules, so one
//! failed cycle never terminates the process.

use std::future::Future;
use std::time::Duration;

use tracing::{error, info};

pub async fn run_on_interval<F, Fut>(interval: Duration, mut cycle: F)
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    loop {
        if let Err(e) = cycle().await {
            error!("Cycle failed: {e:#}");
        }
        info!("Sleeping for {}s", interval.as_secs());
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_failed_cycle_does_not_stop_the_daemon() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_cycle = calls.clone();

        let daemon = tokio::spawn(run_on_interval(Duration::from_secs(300), move || {
            let calls = calls_in_cycle.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    anyhow::bail!("oracle unavailable");
                }
                Ok(())
            }
        }));

        // First cycle runs immediately and fails.
        tokio::task::yield_now().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // After the interval the next cycle still runs.
        tokio::time::sleep(Duration::from_secs(301)).await;
        assert!(calls.load(Ordering::SeqCst) >= 2);

        daemon.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycles_run_once_per_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_cycle = calls.clone();

        let daemon = tokio::spawn(run_on_interval(Duration::from_secs(60), move || {
            let calls = calls_in_cycle.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }));

        tokio::time::sleep(Duration::from_secs(181)).await;
        let seen = calls.load(Ordering::SeqCst);
        assert!((3..=4).contains(&seen), "expected ~4 cycles, saw {seen}");

        daemon.abort();
    }
}
