use async_trait::async_trait;
use tracing::{debug, warn};

use chatthread_types::RawMessageRecord;

use crate::error::{Result, StoreError};
use crate::retry::RetryPolicy;

/// The host page, seen only as a list of comment records.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Records in chronological order, oldest first.
    ///
    /// `Ok(None)` means the comment list is not rendered yet. That is an
    /// expected transient state, not an error.
    async fn fetch_records(&self) -> anyhow::Result<Option<Vec<RawMessageRecord>>>;
}

/// Looks up the short name the current user posts under.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn lookup_self_name(&self) -> anyhow::Result<String>;
}

/// Fetch from `source` until the comment list shows up or `policy` runs out.
pub async fn poll_records<S>(source: &S, policy: &RetryPolicy) -> Result<Vec<RawMessageRecord>>
where
    S: PageSource + ?Sized,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;

        if let Some(records) = source.fetch_records().await.map_err(StoreError::Source)? {
            debug!(attempt, count = records.len(), "Comment list found");
            return Ok(records);
        }

        match policy.delay_after(attempt) {
            Some(delay) => {
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Comment list not rendered, retrying");
                tokio::time::sleep(delay).await;
            }
            None => {
                warn!(attempts = attempt, "Comment list never appeared");
                return Err(StoreError::SourceUnavailable { attempts: attempt });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Renders nothing until `ready_on` fetches have been made.
    struct SlowPage {
        ready_on: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl PageSource for SlowPage {
        async fn fetch_records(&self) -> anyhow::Result<Option<Vec<RawMessageRecord>>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call >= self.ready_on {
                Ok(Some(vec![RawMessageRecord::new("ana", false, "hi", "2024-01-01T00:00:00Z")]))
            } else {
                Ok(None)
            }
        }
    }

    struct BrokenPage;

    #[async_trait]
    impl PageSource for BrokenPage {
        async fn fetch_records(&self) -> anyhow::Result<Option<Vec<RawMessageRecord>>> {
            Err(anyhow::anyhow!("disk on fire"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ready_on_third_attempt_waits_twice() {
        let page = SlowPage { ready_on: 3, calls: AtomicU32::new(0) };
        let start = tokio::time::Instant::now();

        let records = poll_records(&page, &RetryPolicy::default()).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(page.calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(250 + 500));
    }

    #[tokio::test(start_paused = true)]
    async fn never_ready_exhausts_budget() {
        let page = SlowPage { ready_on: u32::MAX, calls: AtomicU32::new(0) };
        let policy = RetryPolicy::default();
        let start = tokio::time::Instant::now();

        let err = poll_records(&page, &policy).await.unwrap_err();

        assert!(matches!(err, StoreError::SourceUnavailable { attempts: 11 }));
        assert_eq!(page.calls.load(Ordering::SeqCst), 11);
        assert_eq!(start.elapsed(), policy.total_wait());
    }

    #[tokio::test]
    async fn source_errors_are_not_retried() {
        let err = poll_records(&BrokenPage, &RetryPolicy::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Source(_)));
    }
}
