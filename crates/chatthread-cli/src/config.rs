use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use chatthread_store::RetryPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub page_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub retry: RetryPolicy,
    /// Session endpoint; "my messages" are only reported when set.
    pub session_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = RetryPolicy::default();

        let page_path = var("CHATTHREAD_PAGE_PATH").unwrap_or_else(|| "comment-list.json".into());
        let snapshot_path =
            var("CHATTHREAD_SNAPSHOT_PATH").unwrap_or_else(|| "chatthread-snapshot.json".into());

        let max_attempts = match var("CHATTHREAD_MAX_ATTEMPTS") {
            Some(v) => v.parse().with_context(|| format!("CHATTHREAD_MAX_ATTEMPTS={v:?}"))?,
            None => defaults.max_attempts,
        };
        let base_delay = millis(&var, "CHATTHREAD_BASE_DELAY_MS")?.unwrap_or(defaults.base_delay);
        let final_delay = millis(&var, "CHATTHREAD_FINAL_DELAY_MS")?.unwrap_or(defaults.final_delay);

        let session_url = var("CHATTHREAD_SESSION_URL").filter(|url| !url.trim().is_empty());

        Ok(Self {
            page_path: page_path.into(),
            snapshot_path: snapshot_path.into(),
            retry: RetryPolicy {
                max_attempts,
                base_delay,
                final_delay,
            },
            session_url,
        })
    }
}

fn millis(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>> {
    var(key)
        .map(|v| {
            v.parse::<u64>()
                .map(Duration::from_millis)
                .with_context(|| format!("{key}={v:?}"))
        })
        .transpose()
}
