mod config;
mod report;

use std::io::ErrorKind;

use anyhow::Context;
use tracing::{info, warn};

use chatthread_source::{FileSource, SessionIdentity};
use chatthread_store::{MessageStore, SnapshotInput};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatthread=debug,chatthread_store=debug,chatthread_source=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        page = %config.page_path.display(),
        snapshot = %config.snapshot_path.display(),
        "Starting"
    );

    let input = match tokio::fs::read_to_string(&config.snapshot_path).await {
        Ok(text) => SnapshotInput::Text(text),
        Err(e) if e.kind() == ErrorKind::NotFound => SnapshotInput::None,
        Err(e) => {
            return Err(e).with_context(|| format!("reading {}", config.snapshot_path.display()));
        }
    };

    // No cancellation inside the poll: on Ctrl+C the half-built store is
    // dropped and nothing is written.
    let source = FileSource::new(&config.page_path);
    let session = MessageStore::new()
        .with_retry_policy(config.retry)
        .restore(input, &source);
    let mut store = tokio::select! {
        store = session => store?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, abandoning session");
            return Ok(());
        }
    };

    let mine = match &config.session_url {
        Some(url) => {
            let identity = SessionIdentity::new(url.as_str())?;
            match store.my_messages(&identity).await {
                Ok(messages) => Some(messages.into_iter().cloned().collect::<Vec<_>>()),
                Err(e) => {
                    warn!(error = %e, "Could not resolve own author name");
                    None
                }
            }
        }
        None => None,
    };
    let mine_refs: Option<Vec<_>> = mine.as_ref().map(|m| m.iter().collect());

    print!("{}", report::render(&store, mine_refs.as_deref(), &chrono::Local));

    let json = store.to_json_pretty()?;
    let staging = config.snapshot_path.with_extension("json.tmp");
    tokio::fs::write(&staging, json)
        .await
        .with_context(|| format!("writing {}", staging.display()))?;
    tokio::fs::rename(&staging, &config.snapshot_path).await?;
    info!(
        path = %config.snapshot_path.display(),
        messages = store.total_count(),
        "Snapshot written"
    );

    Ok(())
}
