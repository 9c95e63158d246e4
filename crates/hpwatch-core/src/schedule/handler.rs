use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{Cadence, RefreshInterval};
use crate::cycle::{CycleCoordinator, CycleOutcome};

/// Starts a cycle immediately and then on every tick of the refresh interval.
///
/// Each cycle runs on its own task, so a slow cycle never delays the next
/// tick; outcomes reach the receiver in completion order, which can differ
/// from start order when cycles overlap.
pub struct Scheduler {
    coordinator: Arc<CycleCoordinator>,
    seed_id: Arc<str>,
    interval: RefreshInterval,
}

impl Scheduler {
    pub fn new(
        coordinator: Arc<CycleCoordinator>,
        seed_id: &str,
        interval: RefreshInterval,
    ) -> Self {
        Self {
            coordinator,
            seed_id: Arc::from(seed_id),
            interval,
        }
    }

    /// Run until `shutdown` is cancelled or the outcome receiver is dropped.
    ///
    /// Cycles already in flight are left to finish and deliver.
    pub async fn run(self, outcomes: mpsc::Sender<CycleOutcome>, shutdown: CancellationToken) {
        let mut ticker = Ticker::new(self.interval.cadence());
        let mut cycle: u64 = 0;

        info!(
            event = "core.schedule.started",
            seed_id = %self.seed_id,
            interval = %self.interval
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = outcomes.closed() => {
                    debug!(event = "core.schedule.receiver_closed");
                    break;
                }
                _ = ticker.tick() => {
                    cycle += 1;
                    debug!(event = "core.schedule.tick", cycle = cycle);
                    self.spawn_cycle(cycle, outcomes.clone());
                }
            }
        }

        info!(event = "core.schedule.stopped", cycles_started = cycle);
    }

    fn spawn_cycle(&self, cycle: u64, outcomes: mpsc::Sender<CycleOutcome>) {
        let coordinator = Arc::clone(&self.coordinator);
        let seed_id = Arc::clone(&self.seed_id);

        tokio::spawn(async move {
            let outcome = coordinator.run_cycle(cycle, &seed_id).await;
            if outcomes.send(outcome).await.is_err() {
                debug!(event = "core.schedule.outcome_dropped", cycle = cycle);
            }
        });
    }
}

/// Tick source. The first tick always completes immediately.
enum Ticker {
    /// Fixed periods run on the tokio clock; missed ticks are delayed.
    Every(Interval),
    /// Cron patterns follow the UTC wall clock.
    WallClock {
        cadence: Cadence,
        started: bool,
        last: Option<DateTime<Utc>>,
    },
}

impl Ticker {
    fn new(cadence: &Cadence) -> Self {
        match cadence {
            Cadence::Every(period) => {
                let mut interval = tokio::time::interval(*period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                Ticker::Every(interval)
            }
            Cadence::Cron(_) => Ticker::WallClock {
                cadence: cadence.clone(),
                started: false,
                last: None,
            },
        }
    }

    async fn tick(&mut self) {
        match self {
            Ticker::Every(interval) => {
                interval.tick().await;
            }
            Ticker::WallClock {
                cadence,
                started,
                last,
            } => {
                if !*started {
                    *started = true;
                    return;
                }

                let now = Utc::now();
                // Never fire the same match twice if the wall clock lags the timer.
                let from = last.map_or(now, |fired| fired.max(now));
                match cadence.next_after(from) {
                    Some(next) => {
                        *last = Some(next);
                        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
                        tokio::time::sleep(wait).await;
                    }
                    None => {
                        warn!(event = "core.schedule.no_next_run");
                        std::future::pending::<()>().await;
                    }
                }
            }
        }
    }
}
