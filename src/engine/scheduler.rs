//! Background trigger for the annual rollover.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use super::rollover::AnnualRollover;

/// Shortest interval the scheduler ticks at.
pub const MIN_CHECK_INTERVAL: Duration = Duration::from_millis(1);

/// Spawns the scheduler with the interval from the engine settings
/// (`rollover_check_interval_secs`).
pub fn spawn_rollover_scheduler(rollover: AnnualRollover) -> JoinHandle<()> {
    let interval = rollover.context().settings().rollover_check_interval();
    spawn_rollover_scheduler_every(rollover, interval)
}

/// Spawns a task that checks the clock every `interval` and runs the
/// rollover once for each calendar year that starts while it is running.
///
/// Intervals below [`MIN_CHECK_INTERVAL`] are raised to it. The year
/// current at spawn time is treated as already rolled over; a failed run is
/// retried on the next tick. The task runs until aborted through the
/// returned handle.
pub fn spawn_rollover_scheduler_every(rollover: AnnualRollover, interval: Duration) -> JoinHandle<()> {
    let interval = interval.max(MIN_CHECK_INTERVAL);
    tokio::spawn(async move {
        let mut last_year = rollover.context().clock().current_year();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(
            year = last_year,
            interval_ms = interval.as_millis() as u64,
            "Rollover scheduler started"
        );

        loop {
            ticker.tick().await;
            let year = rollover.context().clock().current_year();
            if year <= last_year {
                continue;
            }

            match rollover.run(Some(year)).await {
                Ok(report) => {
                    info!(
                        year,
                        succeeded = report.succeeded,
                        failed = report.failed,
                        "Scheduled rollover completed"
                    );
                    last_year = year;
                }
                Err(err) => {
                    error!(year, error = %err, "Scheduled rollover failed");
                }
            }
        }
    })
}
