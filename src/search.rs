//! Fixed-delay debounce for search boxes.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

/// Lets through only the last call made within `delay`.
///
/// Every call to [`Debouncer::settle`] bumps a generation counter and
/// sleeps; after waking, the call proceeds only if no newer call arrived
/// in the meantime. Clones share the counter.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the delay. `true` if this call is still the latest one.
    pub async fn settle(&self) -> bool {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        let latest = self.generation.load(Ordering::SeqCst);
        if latest != ticket {
            trace!(ticket, latest, "debounced call superseded");
        }
        latest == ticket
    }

    /// Run `f` after the delay unless superseded; `None` when skipped.
    pub async fn run<F, Fut, T>(&self, f: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if self.settle().await {
            Some(f().await)
        } else {
            None
        }
    }
}

/// Trimmed search term, or `None` when there is nothing to search for.
pub fn search_term(input: &str) -> Option<String> {
    let term = input.split_whitespace().collect::<Vec<_>>().join(" ");
    (!term.is_empty()).then_some(term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn only_last_call_within_window_proceeds() {
        let debouncer = Debouncer::new(Duration::from_millis(400));
        let first = {
            let d = debouncer.clone();
            tokio::spawn(async move { d.run(|| async { "piz" }).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = {
            let d = debouncer.clone();
            tokio::spawn(async move { d.run(|| async { "pizza" }).await })
        };

        assert_eq!(first.await.unwrap(), None);
        assert_eq!(second.await.unwrap(), Some("pizza"));
    }

    #[tokio::test(start_paused = true)]
    async fn calls_spaced_beyond_delay_all_proceed() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        assert!(debouncer.settle().await);
        assert!(debouncer.settle().await);
    }

    #[test]
    fn search_term_collapses_whitespace() {
        assert_eq!(search_term("  paneer   tikka "), Some("paneer tikka".into()));
        assert_eq!(search_term("   "), None);
    }
}
