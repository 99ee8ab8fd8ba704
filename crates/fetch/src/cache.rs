//! Single-flight TTL cache.
//!
//! Each key has at most one fetch in flight: concurrent callers for the same
//! key await one [`Shared`] future instead of issuing duplicate requests. The
//! shared future stores its own result, so it completes the cache update as
//! long as anyone is still polling it, even after the caller that started it
//! has gone away.
//!
//! A refresh always replaces the whole cached value. Failed fetches are never
//! cached.

use crate::error::{ErrorKind, Result};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::Duration;
use time::UtcDateTime;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, trace};

type SharedFetch<V> = Shared<BoxFuture<'static, std::result::Result<Arc<V>, ErrorKind>>>;

struct Entry<V> {
    value: Arc<V>,
    fetched_at: UtcDateTime,
    stored: Instant,
    generation: u64,
}

struct InFlight<V> {
    fetch: SharedFetch<V>,
    generation: u64,
}

struct Inner<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
    in_flight: Mutex<HashMap<K, InFlight<V>>>,
    generation: Mutex<u64>,
}

/// A cache of `Arc<V>` by `K`, with a time-to-live and single-flight fills.
pub struct TtlCache<K, V> {
    inner: Arc<Inner<K, V>>,
}
impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}
impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                ttl,
                entries: RwLock::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
                generation: Mutex::new(0),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// The cached value, if there is one younger than the TTL.
    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        let entries = self.inner.entries.read().await;
        entries.get(key).filter(|entry| entry.stored.elapsed() < self.inner.ttl).map(|entry| Arc::clone(&entry.value))
    }

    /// When the cached value (fresh or stale) was fetched.
    pub async fn fetched_at(&self, key: &K) -> Option<UtcDateTime> {
        self.inner.entries.read().await.get(key).map(|entry| entry.fetched_at)
    }

    pub async fn invalidate(&self, key: &K) {
        self.inner.entries.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.inner.entries.write().await.clear();
    }

    /// Number of entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of fetches currently in flight.
    pub async fn in_flight(&self) -> usize {
        self.inner.in_flight.lock().await.len()
    }

    /// Returns the cached value, fetching it when missing or stale.
    ///
    /// Concurrent calls for the same key share one fetch. With `force`, the
    /// TTL is ignored and a new fetch is started even if one is already in
    /// flight; callers that joined the earlier fetch still get its result.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, force: bool, fetch: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        if !force && let Some(value) = self.get(&key).await {
            trace!(?key, "cache hit");
            return Ok(value);
        }
        let shared = {
            let mut in_flight = self.inner.in_flight.lock().await;
            match in_flight.get(&key) {
                Some(running) if !force => {
                    trace!(?key, "joining in-flight fetch");
                    running.fetch.clone()
                },
                _ => {
                    // A fetch may have completed between the freshness check
                    // and taking the lock.
                    if !force && let Some(value) = self.get(&key).await {
                        return Ok(value);
                    }
                    let generation = self.next_generation().await;
                    debug!(?key, force, "fetching");
                    let fetch = self.shared_fetch(key.clone(), generation, fetch());
                    in_flight.insert(key, InFlight { fetch: fetch.clone(), generation });
                    fetch
                },
            }
        };
        shared.await.map_err(exn::Exn::from)
    }

    async fn next_generation(&self) -> u64 {
        let mut generation = self.inner.generation.lock().await;
        *generation += 1;
        *generation
    }

    fn shared_fetch<Fut>(&self, key: K, generation: u64, fetch: Fut) -> SharedFetch<V>
    where
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        // Weak, so that an abandoned fetch parked in `in_flight` does not
        // keep the cache alive.
        let inner: Weak<Inner<K, V>> = Arc::downgrade(&self.inner);
        async move {
            let result = fetch.await.map(Arc::new).map_err(|err| (*err).clone());
            if let Some(inner) = inner.upgrade() {
                if let Ok(value) = &result {
                    let mut entries = inner.entries.write().await;
                    // A forced refresh that finished first must not be
                    // overwritten by the fetch it superseded.
                    if entries.get(&key).is_none_or(|existing| existing.generation < generation) {
                        entries.insert(key.clone(), Entry {
                            value: Arc::clone(value),
                            fetched_at: UtcDateTime::now(),
                            stored: Instant::now(),
                            generation,
                        });
                    }
                }
                let mut in_flight = inner.in_flight.lock().await;
                if in_flight.get(&key).is_some_and(|running| running.generation == generation) {
                    in_flight.remove(&key);
                }
            }
            result
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(60);

    /// A fetch that counts its invocations and takes a while.
    fn counted(calls: &Arc<AtomicUsize>, value: &'static str) -> impl Future<Output = Result<String>> + Send + 'static {
        let calls = Arc::clone(calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(value.to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_and_expiry() {
        let cache = TtlCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));
        assert_eq!(*cache.get_or_fetch("k", false, || counted(&calls, "a")).await.unwrap(), "a");
        assert_eq!(*cache.get_or_fetch("k", false, || counted(&calls, "b")).await.unwrap(), "a");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.fetched_at(&"k").await.is_some());

        tokio::time::advance(TTL).await;
        assert!(cache.get(&"k").await.is_none());
        assert_eq!(*cache.get_or_fetch("k", false, || counted(&calls, "b")).await.unwrap(), "b");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_fetch() {
        let cache = TtlCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));
        let (a, b, c) = tokio::join!(
            cache.get_or_fetch("k", false, || counted(&calls, "a")),
            cache.get_or_fetch("k", false, || counted(&calls, "b")),
            cache.get_or_fetch("k", false, || counted(&calls, "c")),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(*c.unwrap(), "a");
        assert_eq!(cache.in_flight().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_bypasses_ttl_and_in_flight() {
        let cache = TtlCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));
        cache.get_or_fetch("k", false, || counted(&calls, "a")).await.unwrap();
        let value = cache.get_or_fetch("k", true, || counted(&calls, "b")).await.unwrap();
        assert_eq!(*value, "b");
        assert_eq!(*cache.get(&"k").await.unwrap(), "b");

        let (joined, forced) = tokio::join!(
            cache.get_or_fetch("j", false, || counted(&calls, "first")),
            cache.get_or_fetch("j", true, || counted(&calls, "second")),
        );
        assert_eq!(*joined.unwrap(), "first");
        assert_eq!(*forced.unwrap(), "second");
        assert_eq!(*cache.get(&"j").await.unwrap(), "second");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_are_shared_but_not_cached() {
        let cache: TtlCache<&str, String> = TtlCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));
        let failing = || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err::<String, _>(exn::Exn::from(ErrorKind::Network("reset".to_string())))
            }
        };
        let (a, b) = tokio::join!(cache.get_or_fetch("k", false, failing), cache.get_or_fetch("k", false, failing));
        assert_eq!(*a.unwrap_err(), ErrorKind::Network("reset".to_string()));
        assert!(b.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_empty().await);
        assert_eq!(*cache.get_or_fetch("k", false, || counted(&calls, "ok")).await.unwrap(), "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_completes_when_first_caller_is_dropped() {
        let cache = TtlCache::new(TTL);
        let calls = Arc::new(AtomicUsize::new(0));
        let first = cache.get_or_fetch("k", false, || counted(&calls, "a"));
        let second = cache.get_or_fetch("k", false, || counted(&calls, "b"));
        // Register the first caller's fetch, then abandon it.
        let mut first = Box::pin(first);
        assert!(futures::poll!(first.as_mut()).is_pending());
        drop(first);
        assert_eq!(*second.await.unwrap(), "a");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
