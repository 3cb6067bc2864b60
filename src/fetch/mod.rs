//! Remote data fetcher
//!
//! Wraps a [`Transport`] with a fixed-backoff retry loop and a memoization
//! table keyed by (URL, sorted parameters). A [`Fetcher`] lives for exactly
//! one report-generation run; failures are memoized as absent so a broken
//! endpoint is only retried once per run.

pub mod transport;

pub use transport::{FetchError, HttpTransport, Transport, REQUIRED_HEADERS};

use crate::config::RetryPolicy;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Memoization key: endpoint URL plus parameters sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    url: String,
    params: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(url: &str, params: &[(&str, String)]) -> Self {
        let mut params: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        params.sort();
        Self { url: url.to_string(), params }
    }
}

pub struct Fetcher {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    cache: RefCell<FxHashMap<CacheKey, Option<Rc<Value>>>>,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>, retry: RetryPolicy) -> Self {
        Self {
            transport,
            retry,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Drop every memoized response.
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Number of memoized (URL, parameters) entries, absent results included.
    pub fn cached_entries(&self) -> usize {
        self.cache.borrow().len()
    }

    /// GET `url` with `params`, memoized for the lifetime of this fetcher.
    ///
    /// Returns `None` once every attempt has failed.
    pub fn get_json(&self, url: &str, params: &[(&str, String)]) -> Option<Rc<Value>> {
        let key = CacheKey::new(url, params);
        if let Some(hit) = self.cache.borrow().get(&key) {
            tracing::debug!("Cache hit for {} {:?}", url, key.params);
            return hit.clone();
        }

        let result = self.fetch_with_retry(&key).map(Rc::new);
        self.cache.borrow_mut().insert(key, result.clone());
        result
    }

    fn fetch_with_retry(&self, key: &CacheKey) -> Option<Value> {
        let attempts = self.retry.attempts.max(1);
        for attempt in 1..=attempts {
            match self.transport.get_json(&key.url, &key.params) {
                Ok(value) => return Some(value),
                Err(e) if attempt == attempts => {
                    tracing::warn!("Giving up after {} attempts: {}", attempts, e);
                }
                Err(e) => {
                    tracing::debug!("Attempt {}/{} failed: {}", attempt, attempts, e);
                    if !self.retry.backoff.is_zero() {
                        std::thread::sleep(self.retry.backoff);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FlakyTransport {
        calls: AtomicUsize,
        failures_before_success: usize,
    }

    impl Transport for FlakyTransport {
        fn get_json(&self, url: &str, params: &[(String, String)]) -> Result<Value, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures_before_success {
                return Err(FetchError::Status { url: url.to_string(), status: 503 });
            }
            Ok(json!({ "url": url, "params": params.len() }))
        }
    }

    fn no_wait(attempts: u32) -> RetryPolicy {
        RetryPolicy { attempts, backoff: Duration::ZERO }
    }

    #[test]
    fn test_cache_key_sorts_params() {
        let a = CacheKey::new("u", &[("b", "2".into()), ("a", "1".into())]);
        let b = CacheKey::new("u", &[("a", "1".into()), ("b", "2".into())]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_repeated_calls_hit_cache() {
        let transport = Arc::new(FlakyTransport { calls: AtomicUsize::new(0), failures_before_success: 0 });
        let fetcher = Fetcher::new(transport.clone(), no_wait(3));

        let first = fetcher.get_json("http://x/a", &[("ano", "2024".into()), ("id", "1".into())]);
        let second = fetcher.get_json("http://x/a", &[("id", "1".into()), ("ano", "2024".into())]);

        assert_eq!(first, second);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fetcher.cached_entries(), 1);
    }

    #[test]
    fn test_retries_until_success() {
        let transport = Arc::new(FlakyTransport { calls: AtomicUsize::new(0), failures_before_success: 2 });
        let fetcher = Fetcher::new(transport.clone(), no_wait(3));

        assert!(fetcher.get_json("http://x/b", &[]).is_some());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_exhausted_retries_memoize_absent() {
        let transport = Arc::new(FlakyTransport { calls: AtomicUsize::new(0), failures_before_success: usize::MAX });
        let fetcher = Fetcher::new(transport.clone(), no_wait(3));

        assert!(fetcher.get_json("http://x/c", &[]).is_none());
        assert!(fetcher.get_json("http://x/c", &[]).is_none());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_clear_empties_cache() {
        let transport = Arc::new(FlakyTransport { calls: AtomicUsize::new(0), failures_before_success: 0 });
        let fetcher = Fetcher::new(transport.clone(), no_wait(1));

        fetcher.get_json("http://x/d", &[]);
        fetcher.clear();
        assert_eq!(fetcher.cached_entries(), 0);
        fetcher.get_json("http://x/d", &[]);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }
}
