use std::sync::Arc;

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::cache::StatusCache;
use super::checker::Checker;
use super::types::ProbeOutcome;
use crate::database::models::Target;

/// Fans one probe out per enabled target and records every outcome.
pub struct Prober {
    checker: Arc<dyn Checker>,
    cache: StatusCache,
    limiter: Arc<Semaphore>,
}

impl Prober {
    pub fn new(checker: Arc<dyn Checker>, cache: StatusCache, max_concurrent: usize) -> Self {
        Self { checker, cache, limiter: Arc::new(Semaphore::new(max_concurrent)) }
    }

    /// Probe every enabled target once, concurrently up to the permit limit,
    /// and write each result into the cache as it lands.
    ///
    /// Returns the number of targets probed, after the last probe has
    /// completed. The call is bounded by the slowest individual probe, not
    /// the sum; disabled targets are skipped and keep whatever entry they
    /// already have.
    pub async fn run_cycle(&self, targets: &[Target]) -> usize {
        let mut probes = FuturesUnordered::new();

        for target in targets.iter().filter(|target| target.enabled) {
            let checker = Arc::clone(&self.checker);
            let limiter = Arc::clone(&self.limiter);
            let id = target.id;
            let url = target.url.clone();

            probes.push(async move {
                let _permit = limiter.acquire().await.ok();
                (id, checker.check(&url).await)
            });
        }

        let mut probed = 0;

        while let Some((id, outcome)) = probes.next().await {
            match &outcome {
                ProbeOutcome::Responded { status, latency_ms } if *status >= 500 => {
                    warn!(target_id = id, status, latency_ms, "target answered with server error");
                }
                ProbeOutcome::Responded { status, latency_ms } => {
                    debug!(target_id = id, status, latency_ms, "target reachable");
                }
                ProbeOutcome::Unreachable { reason, latency_ms } => {
                    warn!(target_id = id, latency_ms, reason = %reason, "probe failed");
                }
            }

            self.cache.set(id, outcome.into_status(Utc::now())).await;
            probed += 1;
        }

        probed
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use chrono::Utc;

    use super::*;
    use crate::monitoring::checker::HttpChecker;
    use crate::monitoring::testutil::{refused_addr, spawn_stub_server};
    use crate::monitoring::types::TargetStatus;

    fn target(id: i64, url: String, enabled: bool) -> Target {
        let now = Utc::now();
        Target { id, name: format!("target-{id}"), url, enabled, created_at: now, updated_at: now }
    }

    fn prober(cache: StatusCache, timeout: Duration) -> Prober {
        let checker = Arc::new(HttpChecker::new(timeout).unwrap());
        Prober::new(checker, cache, 32)
    }

    #[tokio::test]
    async fn records_one_entry_per_enabled_target() {
        let addr = spawn_stub_server(200, Duration::ZERO).await;
        let targets = vec![
            target(1, format!("http://{addr}/"), true),
            target(2, format!("http://{addr}/"), true),
            target(3, format!("http://{addr}/"), false),
        ];

        let cache = StatusCache::new();
        let probed = prober(cache.clone(), Duration::from_secs(5)).run_cycle(&targets).await;

        let snapshot = cache.snapshot().await;
        assert_eq!(probed, 2);
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot[&1].online);
        assert!(snapshot[&2].online);
        assert!(!snapshot.contains_key(&3));
    }

    #[tokio::test]
    async fn disabled_target_keeps_its_previous_entry() {
        let previous =
            TargetStatus { online: true, latency_ms: 42, checked_at: Utc::now() };
        let cache = StatusCache::new();
        cache.set(7, previous.clone()).await;

        let targets = vec![target(7, "http://127.0.0.1:1/".into(), false)];
        prober(cache.clone(), Duration::from_secs(1)).run_cycle(&targets).await;

        assert_eq!(cache.snapshot().await[&7], previous);
    }

    #[tokio::test]
    async fn unreachable_target_is_recorded_offline() {
        let addr = refused_addr().await;
        let targets = vec![target(1, format!("http://{addr}/"), true)];

        let cache = StatusCache::new();
        prober(cache.clone(), Duration::from_secs(5)).run_cycle(&targets).await;

        assert!(!cache.snapshot().await[&1].online);
    }

    #[tokio::test]
    async fn status_code_decides_online_not_success() {
        let unavailable = spawn_stub_server(503, Duration::ZERO).await;
        let missing = spawn_stub_server(404, Duration::ZERO).await;
        let targets = vec![
            target(1, format!("http://{unavailable}/"), true),
            target(2, format!("http://{missing}/"), true),
        ];

        let cache = StatusCache::new();
        prober(cache.clone(), Duration::from_secs(5)).run_cycle(&targets).await;

        let snapshot = cache.snapshot().await;
        assert!(!snapshot[&1].online);
        assert!(snapshot[&2].online);
    }

    /// Three targets that each take ~800ms must finish together, not one
    /// after another.
    #[tokio::test]
    async fn slow_targets_are_probed_concurrently() {
        let delay = Duration::from_millis(800);
        let mut targets = Vec::new();
        for id in 1..=3 {
            let addr = spawn_stub_server(200, delay).await;
            targets.push(target(id, format!("http://{addr}/"), true));
        }
        let fast = spawn_stub_server(200, Duration::ZERO).await;
        targets.push(target(4, format!("http://{fast}/"), true));

        let cache = StatusCache::new();
        let started = Instant::now();
        let probed = prober(cache.clone(), Duration::from_secs(5)).run_cycle(&targets).await;
        let elapsed = started.elapsed();

        assert_eq!(probed, 4);
        assert_eq!(cache.snapshot().await.len(), 4);
        assert!(elapsed >= delay, "cycle finished before the slow probes: {elapsed:?}");
        assert!(
            elapsed < delay * 2,
            "cycle took {elapsed:?}, looks sequential rather than concurrent"
        );
    }
}
