use std::time::{Duration, Instant};

use async_trait::async_trait;
use url::Url;

use super::types::ProbeOutcome;

/// A single bounded reachability check against one URL.
#[async_trait]
pub trait Checker: Send + Sync {
    /// Never fails: transport errors are part of the outcome, not an error
    /// path, so one bad target cannot abort a cycle.
    async fn check(&self, url: &str) -> ProbeOutcome;
}

/// HTTP checker backed by a shared reqwest client.
///
/// The timeout is set on the client and covers the whole exchange, so no
/// probe can outlive it.
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Checker for HttpChecker {
    async fn check(&self, url: &str) -> ProbeOutcome {
        // A URL that does not parse gets the same treatment as a transport
        // failure, without spending a network round trip on it.
        if let Err(error) = Url::parse(url) {
            return ProbeOutcome::Unreachable {
                latency_ms: 0,
                reason: format!("invalid url: {error}"),
            };
        }

        let start = Instant::now();

        match self.client.get(url).send().await {
            Ok(response) => ProbeOutcome::Responded {
                latency_ms: start.elapsed().as_millis() as u64,
                status: response.status().as_u16(),
            },
            Err(error) => ProbeOutcome::Unreachable {
                latency_ms: start.elapsed().as_millis() as u64,
                reason: error.to_string(),
            },
        }
    }
}
