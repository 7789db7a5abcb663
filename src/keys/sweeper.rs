//! Expiry sweeper background task.
//!
//! Sweeps the ledger once per period for the life of the process. The first
//! sweep runs one full period after startup. Missed ticks are skipped, not
//! replayed: one sweep covers everything that expired in the meantime.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use super::ledger::Ledger;

/// Spawn the expiry sweeper.
pub fn spawn_sweep_task(ledger: Arc<Ledger>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            run_sweep(&ledger, Utc::now());
        }
    })
}

/// Run one sweep, logging the outcome. Returns the number of records removed.
pub fn run_sweep(ledger: &Ledger, now: DateTime<Utc>) -> usize {
    match ledger.sweep(now) {
        Ok(0) => 0,
        Ok(removed) => {
            info!(removed, remaining = ledger.len(), "Expired keys removed");
            removed
        }
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "Key sweep failed");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn run_sweep_reports_removed_count() {
        let ledger = Ledger::in_memory();
        let now = Utc::now();
        ledger.grant("u1", "K1", "1hr", now).unwrap();
        ledger.grant("u2", "K2", "L", now).unwrap();

        assert_eq!(run_sweep(&ledger, now), 0);
        assert_eq!(run_sweep(&ledger, now + TimeDelta::hours(2)), 1);
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn task_sweeps_after_each_period() {
        let ledger = Arc::new(Ledger::in_memory());
        ledger.grant("u1", "ZERO", "0hr", Utc::now()).unwrap();

        let handle = spawn_sweep_task(Arc::clone(&ledger), Duration::from_secs(3600));

        tokio::time::sleep(Duration::from_secs(1800)).await;
        assert_eq!(ledger.len(), 1, "no sweep before the first period");

        tokio::time::sleep(Duration::from_secs(1801)).await;
        assert!(ledger.is_empty());

        handle.abort();
    }
}
