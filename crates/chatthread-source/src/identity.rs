use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use chatthread_store::IdentityProvider;

/// The fields we use from the session endpoint's JSON body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    shortened_name: String,
}

/// Reads the current user's short name from the site's session endpoint.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    client: reqwest::Client,
    url: String,
}

impl SessionIdentity {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("building HTTP client")?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentity {
    async fn lookup_self_name(&self) -> Result<String> {
        debug!(url = %self.url, "Looking up session");
        let session: SessionResponse = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("requesting {}", self.url))?
            .error_for_status()?
            .json()
            .await
            .context("decoding session response")?;

        anyhow::ensure!(!session.shortened_name.is_empty(), "session has an empty shortenedName");
        Ok(session.shortened_name)
    }
}
