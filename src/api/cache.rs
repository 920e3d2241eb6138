//
//  devops-client
//  api/cache.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Single-flight memoization.
//!
//! The first caller for a key runs the initializer; callers that arrive while it is
//! in flight await the same cell instead of starting their own lookup; later callers
//! read the stored value. A failed initializer stores nothing, so the next caller
//! tries again.
//!
//! Caches are owned by one connection and never shared process-wide.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

/// Mutex-guarded map of keys to shared async once-cells.
///
/// # Example
///
/// ```rust
/// use devops_client::api::cache::SingleFlight;
///
/// # tokio_test::block_on(async {
/// let cache: SingleFlight<String, u32> = SingleFlight::new();
/// let value = cache
///     .get_or_try_init("answer".to_string(), || async { Ok::<_, ()>(42) })
///     .await;
/// assert_eq!(value, Ok(42));
/// assert_eq!(cache.get(&"answer".to_string()), Some(42));
/// # });
/// ```
pub struct SingleFlight<K, V> {
    cells: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the stored value for `key`, if initialization has completed.
    pub fn get(&self, key: &K) -> Option<V> {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Stores a value directly, unless one is already present.
    pub fn insert(&self, key: K, value: V) {
        let cell = self.cell(key);
        // An existing value wins.
        let _ = cell.set(value);
    }

    /// Returns the value for `key`, running `init` at most once across concurrent
    /// callers.
    ///
    /// # Errors
    ///
    /// Returns the initializer's error. Nothing is cached on failure.
    pub async fn get_or_try_init<F, Fut, E>(&self, key: K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = self.cell(key);
        cell.get_or_try_init(init).await.cloned()
    }

    /// Number of keys with a completed value.
    pub fn len(&self) -> usize {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.values().filter(|cell| cell.initialized()).count()
    }

    /// Returns `true` if no value has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, key: K) -> Arc<OnceCell<V>> {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cells.entry(key).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_init() {
        let cache: Arc<SingleFlight<&'static str, u32>> = Arc::new(SingleFlight::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..50 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_try_init("area", || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, String>(7)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(7));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let cache: SingleFlight<u8, u8> = SingleFlight::new();

        let first = cache
            .get_or_try_init(1, || async { Err::<u8, _>("boom") })
            .await;
        assert_eq!(first, Err("boom"));
        assert!(cache.is_empty());

        let second = cache.get_or_try_init(1, || async { Ok::<_, &str>(9) }).await;
        assert_eq!(second, Ok(9));
    }

    #[tokio::test]
    async fn test_insert_does_not_overwrite() {
        let cache: SingleFlight<u8, u8> = SingleFlight::new();
        cache.insert(1, 10);
        cache.insert(1, 20);
        assert_eq!(cache.get(&1), Some(10));
    }
}
