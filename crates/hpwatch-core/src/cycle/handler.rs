use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Semaphore, mpsc};
use tracing::{error, info, warn};

use crate::config::CycleConfig;
use crate::cycle::errors::CycleError;
use crate::cycle::operations;
use crate::cycle::types::{CycleFailure, CycleOutcome, CycleReport, ResultRow};
use crate::errors::HpWatchError;
use crate::fetch::{Character, FetchError, HpSource};
use crate::roster::{self, Roster, RosterMember, RosterSource};

type FetchResult = (RosterMember, Result<Character, FetchError>);

/// Runs one complete cycle: resolve the roster, fetch every member
/// concurrently, and apply the failure policy.
///
/// Cycles share no mutable state, so any number may run at once.
#[derive(Clone)]
pub struct CycleCoordinator {
    roster_source: Arc<dyn RosterSource>,
    hp_source: Arc<dyn HpSource>,
    config: CycleConfig,
}

impl CycleCoordinator {
    pub fn new(
        roster_source: Arc<dyn RosterSource>,
        hp_source: Arc<dyn HpSource>,
        config: CycleConfig,
    ) -> Self {
        Self {
            roster_source,
            hp_source,
            config,
        }
    }

    /// Run cycle number `cycle` for `seed_id`.
    pub async fn run_cycle(&self, cycle: u64, seed_id: &str) -> CycleOutcome {
        let started_at = Utc::now();
        info!(
            event = "core.cycle.started",
            cycle = cycle,
            seed_id = seed_id,
            started_at = %started_at.to_rfc3339()
        );

        match self.execute(seed_id).await {
            Ok((campaign_name, rows)) => {
                let report = CycleReport {
                    cycle,
                    started_at,
                    campaign_name,
                    rows,
                };
                info!(
                    event = "core.cycle.completed",
                    cycle = cycle,
                    row_count = report.rows.len(),
                    unavailable = report.unavailable_count()
                );
                Ok(report)
            }
            Err(e) => {
                error!(
                    event = "core.cycle.failed",
                    cycle = cycle,
                    started_at = %started_at.to_rfc3339(),
                    error_code = e.error_code(),
                    error = %e
                );
                Err(CycleFailure {
                    cycle,
                    started_at,
                    error: e,
                })
            }
        }
    }

    async fn execute(&self, seed_id: &str) -> Result<(String, Vec<ResultRow>), CycleError> {
        let campaign = self.roster_source.resolve(seed_id).await?;
        let roster = roster::build_roster(seed_id, &campaign);
        info!(
            event = "core.cycle.roster_built",
            campaign = %campaign.name,
            member_count = roster.members().len()
        );

        let results = self.fan_out(roster).await;
        let rows = operations::collect_rows(results, self.config.failure_policy)?;

        Ok((campaign.name, rows))
    }

    /// Fetch every roster member on its own task and wait for all of them.
    ///
    /// Each task reports over a channel; exactly one result comes back per
    /// member, even if its task dies.
    async fn fan_out(&self, roster: Roster) -> Vec<FetchResult> {
        let members = roster.into_members();
        let expected = members.len();
        let (tx, mut rx) = mpsc::channel::<FetchResult>(expected.max(1));
        let limiter = self
            .config
            .max_concurrent
            .map(|limit| Arc::new(Semaphore::new(limit)));

        for member in members.iter().cloned() {
            let tx = tx.clone();
            let source = Arc::clone(&self.hp_source);
            let limiter = limiter.clone();
            let timeout = self.config.fetch_timeout;

            tokio::spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                let result = source.fetch(&member, timeout).await;
                if let Err(e) = &result {
                    warn!(
                        event = "core.cycle.fetch_failed",
                        character_id = %member.id,
                        error = %e
                    );
                }
                // The receiver outlives every sender, so this only fails if
                // the cycle itself was dropped.
                let _ = tx.send((member, result)).await;
            });
        }
        drop(tx);

        let mut results = Vec::with_capacity(expected);
        while let Some(result) = rx.recv().await {
            results.push(result);
        }

        if results.len() < expected {
            for member in members {
                if !results.iter().any(|(m, _)| m.id == member.id) {
                    let error = FetchError::TaskAborted {
                        character_id: member.id.clone(),
                    };
                    results.push((member, Err(error)));
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailurePolicy;
    use crate::cycle::types::RowStatus;
    use crate::roster::{CampaignInfo, RosterError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedRoster(CampaignInfo);

    #[async_trait]
    impl RosterSource for FixedRoster {
        async fn resolve(&self, _seed_id: &str) -> Result<CampaignInfo, RosterError> {
            Ok(self.0.clone())
        }
    }

    struct DownRoster;

    #[async_trait]
    impl RosterSource for DownRoster {
        async fn resolve(&self, seed_id: &str) -> Result<CampaignInfo, RosterError> {
            Err(RosterError::Status {
                seed_id: seed_id.to_string(),
                status: 503,
            })
        }
    }

    /// Scripted HP per character id: (delay, current, max). Missing ids time out.
    struct ScriptedHp {
        script: HashMap<String, (Duration, String, String)>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        fetched: AtomicUsize,
    }

    impl ScriptedHp {
        fn new(entries: &[(&str, u64, &str, &str)]) -> Self {
            Self {
                script: entries
                    .iter()
                    .map(|(id, delay, cur, max)| {
                        (
                            id.to_string(),
                            (Duration::from_millis(*delay), cur.to_string(), max.to_string()),
                        )
                    })
                    .collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                fetched: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl HpSource for ScriptedHp {
        async fn fetch(
            &self,
            member: &RosterMember,
            timeout: Duration,
        ) -> Result<Character, FetchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.fetched.fetch_add(1, Ordering::SeqCst);

            let result = match self.script.get(&member.id) {
                Some((delay, cur, max)) => {
                    tokio::time::sleep(*delay).await;
                    Ok(Character {
                        id: member.id.clone(),
                        name: member.name.clone(),
                        current_hp: cur.clone(),
                        max_hp: max.clone(),
                    })
                }
                None => {
                    tokio::time::sleep(timeout).await;
                    Err(FetchError::Timeout {
                        character_id: member.id.clone(),
                        timeout_secs: timeout.as_secs(),
                    })
                }
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn strahd() -> CampaignInfo {
        CampaignInfo {
            name: "Curse of Strahd".to_string(),
            seed_name: "Aldric".to_string(),
            members: vec![
                RosterMember::new("100", "Aldric"),
                RosterMember::new("200", "Mira"),
                RosterMember::new("300", "Zara"),
            ],
        }
    }

    fn coordinator(
        roster: impl RosterSource + 'static,
        hp: Arc<ScriptedHp>,
        policy: FailurePolicy,
        max_concurrent: Option<usize>,
    ) -> CycleCoordinator {
        CycleCoordinator::new(
            Arc::new(roster),
            hp,
            CycleConfig {
                fetch_timeout: Duration::from_secs(15),
                max_concurrent,
                failure_policy: policy,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_fetches_succeed() {
        let hp = Arc::new(ScriptedHp::new(&[
            ("100", 300, "10", "20"),
            ("200", 100, "5", "5"),
            ("300", 200, "7", "9"),
        ]));
        let coordinator = coordinator(FixedRoster(strahd()), hp, FailurePolicy::Strict, None);

        let report = coordinator.run_cycle(1, "100").await.unwrap();

        assert_eq!(report.cycle, 1);
        assert_eq!(report.campaign_name, "Curse of Strahd");
        assert_eq!(report.rows.len(), 3);
        let mut ids: Vec<&str> = report.rows.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["100", "200", "300"]);
        // Completion order, fastest first.
        let names: Vec<&str> = report.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Mira", "Zara", "Aldric"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_run_concurrently() {
        let hp = Arc::new(ScriptedHp::new(&[
            ("100", 1000, "10", "20"),
            ("200", 1000, "5", "5"),
            ("300", 1000, "7", "9"),
        ]));
        let coordinator =
            coordinator(FixedRoster(strahd()), Arc::clone(&hp), FailurePolicy::Strict, None);

        let started = tokio::time::Instant::now();
        coordinator.run_cycle(1, "100").await.unwrap();

        assert_eq!(started.elapsed(), Duration::from_millis(1000));
        assert_eq!(hp.peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_cap_is_respected() {
        let hp = Arc::new(ScriptedHp::new(&[
            ("100", 1000, "10", "20"),
            ("200", 1000, "5", "5"),
            ("300", 1000, "7", "9"),
        ]));
        let coordinator =
            coordinator(FixedRoster(strahd()), Arc::clone(&hp), FailurePolicy::Strict, Some(1));

        let started = tokio::time::Instant::now();
        let report = coordinator.run_cycle(1, "100").await.unwrap();

        assert_eq!(report.rows.len(), 3);
        assert_eq!(hp.peak.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_error_produces_no_rows_and_no_fetches() {
        let hp = Arc::new(ScriptedHp::new(&[("100", 10, "10", "20")]));
        let coordinator = coordinator(DownRoster, Arc::clone(&hp), FailurePolicy::Partial, None);

        let failure = coordinator.run_cycle(4, "100").await.unwrap_err();

        assert_eq!(failure.cycle, 4);
        assert!(matches!(failure.error, CycleError::Resolve { .. }));
        assert_eq!(hp.fetched.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_timeout_fails_strict_cycle() {
        // "300" is not scripted and times out.
        let hp = Arc::new(ScriptedHp::new(&[("100", 100, "10", "20"), ("200", 100, "5", "5")]));
        let coordinator = coordinator(FixedRoster(strahd()), hp, FailurePolicy::Strict, None);

        let failure = coordinator.run_cycle(1, "100").await.unwrap_err();

        match failure.error {
            CycleError::Fetch { character_id, source } => {
                assert_eq!(character_id, "300");
                assert!(matches!(source, FetchError::Timeout { .. }));
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_timeout_marks_row_in_partial_cycle() {
        let hp = Arc::new(ScriptedHp::new(&[("100", 100, "10", "20"), ("200", 100, "5", "5")]));
        let coordinator = coordinator(FixedRoster(strahd()), hp, FailurePolicy::Partial, None);

        let report = coordinator.run_cycle(1, "100").await.unwrap();

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.unavailable_count(), 1);
        let zara = report.rows.iter().find(|r| r.id == "300").unwrap();
        assert!(matches!(&zara.status, RowStatus::Unavailable { reason } if reason.contains("Timed out")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_seed_outside_campaign_is_fetched() {
        let campaign = CampaignInfo {
            name: "Curse of Strahd".to_string(),
            seed_name: "Newcomer".to_string(),
            members: vec![RosterMember::new("200", "Mira")],
        };
        let hp = Arc::new(ScriptedHp::new(&[("999", 10, "3", "8"), ("200", 10, "5", "5")]));
        let coordinator = coordinator(FixedRoster(campaign), hp, FailurePolicy::Strict, None);

        let report = coordinator.run_cycle(1, "999").await.unwrap();

        assert_eq!(report.rows.len(), 2);
        assert!(report.rows.iter().any(|r| r.name == "Newcomer" && r.current_hp == "3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_cycles_stay_independent() {
        let hp = Arc::new(ScriptedHp::new(&[
            ("100", 5000, "10", "20"),
            ("200", 100, "5", "5"),
            ("300", 2500, "7", "9"),
        ]));
        let coordinator = Arc::new(coordinator(
            FixedRoster(strahd()),
            hp,
            FailurePolicy::Strict,
            None,
        ));

        let first = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.run_cycle(1, "100").await })
        };
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let second = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.run_cycle(2, "100").await })
        };

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();

        for report in [&first, &second] {
            assert_eq!(report.rows.len(), 3);
            let mut ids: Vec<&str> = report.rows.iter().map(|r| r.id.as_str()).collect();
            ids.sort();
            assert_eq!(ids, vec!["100", "200", "300"]);
        }
        assert_eq!(first.cycle, 1);
        assert_eq!(second.cycle, 2);
    }
}
