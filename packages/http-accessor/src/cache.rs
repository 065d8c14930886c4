//! Time-based caching decorator for getters.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::provider::Getter;

/// Serves the last successful value of `inner` until it is `ttl` old.
///
/// Errors pass through and are never cached. Concurrent callers that find
/// the value stale wait for a single refresh instead of each issuing a
/// request.
pub struct CachedGetter<G> {
    inner: G,
    ttl: Duration,
    last: Mutex<Option<(Instant, String)>>,
}

impl<G: Getter> CachedGetter<G> {
    /// Wrap `inner`; a zero `ttl` disables caching.
    pub fn new(inner: G, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            last: Mutex::new(None),
        }
    }

    /// Drop the cached value so the next call refreshes.
    pub fn reset(&self) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl<G: Getter> Getter for CachedGetter<G> {
    fn get(&self) -> Result<String> {
        if self.ttl.is_zero() {
            return self.inner.get();
        }

        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((fetched, value)) = last.as_ref() {
            if fetched.elapsed() < self.ttl {
                return Ok(value.clone());
            }
        }

        let value = self.inner.get()?;
        *last = Some((Instant::now(), value.clone()));
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(calls: Arc<AtomicUsize>) -> impl Getter {
        move || -> Result<String> {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok(n.to_string())
        }
    }

    #[test]
    fn serves_cached_value_within_ttl() {
        let calls = Arc::new(AtomicUsize::new(0));
        let getter = CachedGetter::new(counting(calls.clone()), Duration::from_secs(60));

        assert_eq!(getter.get().unwrap(), "0");
        assert_eq!(getter.get().unwrap(), "0");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        getter.reset();
        assert_eq!(getter.get().unwrap(), "1");
    }

    #[test]
    fn zero_ttl_passes_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let getter = CachedGetter::new(counting(calls.clone()), Duration::ZERO);

        assert_eq!(getter.get().unwrap(), "0");
        assert_eq!(getter.get().unwrap(), "1");
    }

    #[test]
    fn refreshes_after_expiry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let getter = CachedGetter::new(counting(calls.clone()), Duration::from_millis(20));

        assert_eq!(getter.get().unwrap(), "0");
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(getter.get().unwrap(), "1");
    }

    #[test]
    fn errors_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let flaky = move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::status(503, "busy"))
            } else {
                Ok("ready".to_string())
            }
        };
        let getter = CachedGetter::new(flaky, Duration::from_secs(60));

        assert!(getter.get().is_err());
        assert_eq!(getter.get().unwrap(), "ready");
        assert_eq!(getter.get().unwrap(), "ready");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
