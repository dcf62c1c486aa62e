//! Read-through query cache with key-based invalidation
//!
//! Maps a cache key to (value, freshness, in-flight request) state.
//! Concurrent reads of the same key share one underlying fetch, and
//! mutations mark related keys stale so the next read refetches them.
//! The cache is deliberately decoupled from any UI-binding mechanism.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use crate::error::{Error, Result};

/// Completion signal shared with de-duplicated waiters
type Outcome = Option<std::result::Result<Value, Error>>;

struct Entry {
    value: Option<Value>,
    fresh: bool,
    inflight: Option<watch::Receiver<Outcome>>,
    /// Bumped by `invalidate`; a fetch only marks its result fresh when the
    /// generation it started under is still current.
    generation: u64,
}

impl Entry {
    fn empty() -> Self {
        Self {
            value: None,
            fresh: false,
            inflight: None,
            generation: 0,
        }
    }
}

enum Plan {
    Hit(Value),
    Wait(watch::Receiver<Outcome>),
    Fetch(watch::Sender<Outcome>, u64),
}

/// Query cache keyed by an application-defined key taxonomy
pub struct QueryCache<K> {
    inner: Arc<Mutex<HashMap<K, Entry>>>,
}

impl<K> Clone for QueryCache<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K> Default for QueryCache<K>
where
    K: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> QueryCache<K>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry>> {
        // The guard is never held across an await point.
        self.inner.lock().expect("cache lock poisoned")
    }

    /// Return the cached value for `key`, fetching it when missing or stale
    ///
    /// Requests for the same key that are already in flight share the one
    /// underlying call; a failed fetch keeps any stale value and hands the
    /// error to every waiter.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: K, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let plan = {
            let mut map = self.lock();
            let entry = map.entry(key.clone()).or_insert_with(Entry::empty);
            match (entry.fresh, entry.value.as_ref(), entry.inflight.as_ref()) {
                (true, Some(value), _) => Plan::Hit(value.clone()),
                (_, _, Some(rx)) => Plan::Wait(rx.clone()),
                _ => {
                    let (tx, rx) = watch::channel(None);
                    entry.inflight = Some(rx);
                    Plan::Fetch(tx, entry.generation)
                }
            }
        };

        match plan {
            Plan::Hit(value) => {
                debug!(?key, "cache hit");
                serde_json::from_value(value).map_err(Error::decode)
            }
            Plan::Wait(mut rx) => {
                debug!(?key, "awaiting in-flight fetch");
                loop {
                    let outcome = rx.borrow_and_update().clone();
                    if let Some(outcome) = outcome {
                        return outcome
                            .and_then(|value| serde_json::from_value(value).map_err(Error::decode));
                    }
                    if rx.changed().await.is_err() {
                        return Err(Error::Transport("in-flight fetch abandoned".to_string()));
                    }
                }
            }
            Plan::Fetch(tx, generation) => {
                debug!(?key, "cache miss, fetching");
                let encoded = match fetch().await {
                    Ok(value) => serde_json::to_value(&value)
                        .map(|json| (value, json))
                        .map_err(Error::decode),
                    Err(err) => Err(err),
                };

                let mut map = self.lock();
                let entry = map.entry(key).or_insert_with(Entry::empty);
                entry.inflight = None;
                match encoded {
                    Ok((value, json)) => {
                        entry.value = Some(json.clone());
                        // An invalidation issued while the fetch was in
                        // flight wins: the value is stored but stays stale.
                        entry.fresh = entry.generation == generation;
                        let _ = tx.send(Some(Ok(json)));
                        Ok(value)
                    }
                    Err(err) => {
                        entry.fresh = false;
                        let _ = tx.send(Some(Err(err.clone())));
                        Err(err)
                    }
                }
            }
        }
    }

    /// Run a mutation and, on success, invoke the invalidation callback
    /// with the result and the shared cache handle
    pub async fn mutate<T, Fut, S>(&self, mutation: Fut, on_success: S) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
        S: FnOnce(&T, &Self),
    {
        let value = mutation.await?;
        on_success(&value, self);
        Ok(value)
    }

    /// Mark the given keys stale; values are retained until the next read
    ///
    /// Also covers fetches currently in flight for these keys: their result
    /// is stored for `peek` but not marked fresh.
    pub fn invalidate(&self, keys: &[K]) {
        let mut map = self.lock();
        for key in keys {
            if let Some(entry) = map.get_mut(key) {
                entry.fresh = false;
                entry.generation += 1;
                debug!(?key, "cache entry marked stale");
            }
        }
    }

    /// Store a value directly and mark it fresh
    pub fn put<T: Serialize>(&self, key: K, value: &T) -> Result<()> {
        let json = serde_json::to_value(value).map_err(Error::decode)?;
        let mut map = self.lock();
        let entry = map.entry(key).or_insert_with(Entry::empty);
        entry.value = Some(json);
        entry.fresh = true;
        Ok(())
    }

    /// Whether a fresh value is cached for `key`
    pub fn is_fresh(&self, key: &K) -> bool {
        let map = self.lock();
        map.get(key)
            .map(|entry| entry.fresh && entry.value.is_some())
            .unwrap_or(false)
    }

    /// Cached value for `key` regardless of freshness
    pub fn peek<T: DeserializeOwned>(&self, key: &K) -> Option<T> {
        let map = self.lock();
        map.get(key)
            .and_then(|entry| entry.value.clone())
            .and_then(|value| serde_json::from_value(value).ok())
    }
}
