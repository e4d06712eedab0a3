//! In-process TTL cache for upstream weather data.
//!
//! Every namespace is a separately locked, typed [`TtlMap`]. Expired entries
//! stay readable through [`TtlMap::get_stale`] until the periodic sweep
//! removes them, which is what lets the resolver answer from old data when
//! the upstream quota is exhausted.

use std::{
    collections::HashMap,
    sync::{Arc, Weak},
    time::Duration,
};

use tokio::{
    sync::RwLock,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::model::{Alert, CurrentConditions, DailyForecast, HourlyEntry, Location};

pub mod namespace;

pub use namespace::Namespace;

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Keyed store for a single namespace.
#[derive(Debug)]
pub struct TtlMap<V> {
    namespace: Namespace,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlMap<V> {
    pub fn new(namespace: Namespace) -> Self {
        Self { namespace, entries: RwLock::new(HashMap::new()) }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Return the value only while it is younger than the namespace TTL.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.read(key, false).await
    }

    /// Return the value regardless of age.
    pub async fn get_stale(&self, key: &str) -> Option<V> {
        self.read(key, true).await
    }

    async fn read(&self, key: &str, allow_stale: bool) -> Option<V> {
        let key = self.namespace.cache_key(key);
        let entries = self.entries.read().await;
        let entry = entries.get(&*key)?;

        if allow_stale || entry.is_fresh(self.namespace.ttl(), Instant::now()) {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Insert or replace the entry, stamping it with the current time.
    pub async fn put(&self, key: &str, value: V) {
        let key = self.namespace.cache_key(key).into_owned();
        let entry = CacheEntry { value, stored_at: Instant::now() };

        self.entries.write().await.insert(key, entry);
    }

    /// Drop expired entries and return how many were removed.
    pub async fn sweep(&self) -> usize {
        let ttl = self.namespace.ttl();
        let now = Instant::now();

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(ttl, now));

        before - entries.len()
    }

    /// Number of stored entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// The cache store: one typed sub-store per namespace.
#[derive(Debug)]
pub struct WeatherCache {
    locations: TtlMap<Location>,
    current: TtlMap<CurrentConditions>,
    forecasts: TtlMap<DailyForecast>,
    hourly: TtlMap<Vec<HourlyEntry>>,
    alerts: TtlMap<Vec<Alert>>,
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherCache {
    pub fn new() -> Self {
        Self {
            locations: TtlMap::new(Namespace::Location),
            current: TtlMap::new(Namespace::Current),
            forecasts: TtlMap::new(Namespace::Forecast),
            hourly: TtlMap::new(Namespace::Hourly),
            alerts: TtlMap::new(Namespace::Alerts),
        }
    }

    pub fn locations(&self) -> &TtlMap<Location> {
        &self.locations
    }

    pub fn current(&self) -> &TtlMap<CurrentConditions> {
        &self.current
    }

    pub fn forecasts(&self) -> &TtlMap<DailyForecast> {
        &self.forecasts
    }

    /// Keyed by `"<location key>:<hours>"`.
    pub fn hourly(&self) -> &TtlMap<Vec<HourlyEntry>> {
        &self.hourly
    }

    pub fn alerts(&self) -> &TtlMap<Vec<Alert>> {
        &self.alerts
    }

    /// One eviction pass over every namespace.
    ///
    /// Namespaces are locked one at a time, never all together.
    pub async fn sweep(&self) -> usize {
        let evicted = [
            (Namespace::Location, self.locations.sweep().await),
            (Namespace::Current, self.current.sweep().await),
            (Namespace::Forecast, self.forecasts.sweep().await),
            (Namespace::Hourly, self.hourly.sweep().await),
            (Namespace::Alerts, self.alerts.sweep().await),
        ];

        for (namespace, count) in evicted.iter().filter(|(_, count)| *count > 0) {
            debug!(%namespace, evicted = count, "evicted expired cache entries");
        }

        evicted.iter().map(|(_, count)| count).sum()
    }

    /// Start the periodic sweep on the current Tokio runtime.
    ///
    /// The task holds only a weak reference, so it also ends once the cache
    /// itself is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> SweepHandle {
        let every = every.max(Duration::from_secs(1));
        let cache = Arc::downgrade(self);

        info!(interval_secs = every.as_secs(), "starting cache sweeper");
        let task = tokio::spawn(run_sweeper(cache, every));

        SweepHandle { task }
    }
}

async fn run_sweeper(cache: Weak<WeatherCache>, every: Duration) {
    let mut ticker = time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick resolves immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let Some(cache) = cache.upgrade() else {
            debug!("cache dropped, stopping sweeper");
            break;
        };

        let evicted = cache.sweep().await;
        debug!(evicted, "cache sweep finished");
    }
}

/// Owns the background sweep task; dropping it cancels the sweep.
#[derive(Debug)]
pub struct SweepHandle {
    task: JoinHandle<()>,
}

impl SweepHandle {
    pub fn shutdown(self) {
        info!("stopping cache sweeper");
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[tokio::test(start_paused = true)]
    async fn ttl_is_respected_in_every_namespace() {
        for namespace in Namespace::ALL {
            let map = TtlMap::new(namespace);
            map.put("k", 7u32).await;

            time::advance(namespace.ttl() - SECOND).await;
            assert_eq!(map.get("k").await, Some(7), "{namespace} should still be fresh");

            time::advance(2 * SECOND).await;
            assert_eq!(map.get("k").await, None, "{namespace} should have expired");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stale_read_is_opt_in() {
        let map = TtlMap::new(Namespace::Current);
        map.put("258012", "sunny".to_string()).await;

        time::advance(Duration::from_secs(40 * 60)).await;

        assert_eq!(map.get("258012").await, None);
        assert_eq!(map.get_stale("258012").await.as_deref(), Some("sunny"));
    }

    #[tokio::test(start_paused = true)]
    async fn put_replaces_value_and_resets_age() {
        let map = TtlMap::new(Namespace::Hourly);
        map.put("a", 1u8).await;

        time::advance(Duration::from_secs(50 * 60)).await;
        map.put("a", 2u8).await;
        time::advance(Duration::from_secs(50 * 60)).await;

        assert_eq!(map.get("a").await, Some(2));
        assert_eq!(map.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reads_do_not_refresh_entries() {
        let map = TtlMap::new(Namespace::Alerts);
        map.put("a", 1u8).await;

        time::advance(Duration::from_secs(59 * 60)).await;
        assert_eq!(map.get("a").await, Some(1));
        assert_eq!(map.get_stale("a").await, Some(1));

        time::advance(2 * SECOND * 60).await;
        assert_eq!(map.get("a").await, None);
    }

    #[tokio::test]
    async fn location_namespace_normalizes_keys() {
        let map = TtlMap::new(Namespace::Location);
        map.put(" Hunza ", "261158".to_string()).await;

        assert_eq!(map.get("hunza").await.as_deref(), Some("261158"));
        assert_eq!(map.get("HUNZA").await.as_deref(), Some("261158"));
        assert_eq!(map.len().await, 1);
    }

    #[tokio::test]
    async fn other_namespaces_keep_keys_verbatim() {
        let map = TtlMap::new(Namespace::Current);
        map.put("Abc", 1u8).await;

        assert_eq!(map.get("abc").await, None);
        assert_eq!(map.get("Abc").await, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_evicts_only_expired_entries() {
        let map = TtlMap::new(Namespace::Current);
        map.put("old", 1u8).await;
        time::advance(Duration::from_secs(31 * 60)).await;
        map.put("new", 2u8).await;

        assert_eq!(map.sweep().await, 1);
        assert_eq!(map.get_stale("old").await, None);
        assert_eq!(map.get("new").await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cache_sweep_covers_all_namespaces() {
        let cache = WeatherCache::new();
        cache.hourly().put("1:12", Vec::new()).await;
        cache.alerts().put("1", Vec::new()).await;

        time::advance(Duration::from_secs(2 * 60 * 60)).await;

        assert_eq!(cache.sweep().await, 2);
        assert!(cache.hourly().is_empty().await);
        assert!(cache.alerts().is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_runs_periodically_until_shutdown() {
        let cache = Arc::new(WeatherCache::new());
        let handle = cache.spawn_sweeper(DEFAULT_SWEEP_INTERVAL);

        cache.alerts().put("1", Vec::new()).await;
        time::sleep(DEFAULT_SWEEP_INTERVAL * 2 + SECOND).await;
        assert!(cache.alerts().is_empty().await);
        assert!(handle.is_running());

        handle.shutdown();

        cache.alerts().put("2", Vec::new()).await;
        time::sleep(DEFAULT_SWEEP_INTERVAL * 3).await;
        assert_eq!(cache.alerts().len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_stops_when_cache_is_dropped() {
        let cache = Arc::new(WeatherCache::new());
        let handle = cache.spawn_sweeper(DEFAULT_SWEEP_INTERVAL);

        drop(cache);
        time::sleep(DEFAULT_SWEEP_INTERVAL * 2).await;
        tokio::task::yield_now().await;

        assert!(!handle.is_running());
    }
}
