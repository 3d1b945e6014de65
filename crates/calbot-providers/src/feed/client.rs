//! HTTP feed fetcher.

use reqwest::{Client, Response};
use tracing::{debug, trace, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::publisher::BoxFuture;
use crate::raw_event::RawEvent;

use super::FeedFetcher;
use super::config::FeedConfig;
use super::ics::parse_feed;

const PROVIDER: &str = "ics";

/// Fetches iCalendar feeds over HTTP(S).
pub struct HttpFeedFetcher {
    client: Client,
    config: FeedConfig,
}

impl HttpFeedFetcher {
    pub fn new(config: FeedConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_provider(PROVIDER)
            })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    async fn get(&self, url: &str) -> ProviderResult<String> {
        let parsed = url::Url::parse(url)
            .map_err(|e| ProviderError::bad_request(format!("invalid calendar URL {}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProviderError::bad_request(format!(
                "unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        trace!(url = %url, "fetching calendar");
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("request failed: {}", e)).with_source(e))?;

        handle_response(response).await
    }
}

async fn handle_response(response: Response) -> ProviderResult<String> {
    let status = response.status();
    trace!(status = %status, "received response");

    if status.is_success() {
        return response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)));
    }

    let body = response.text().await.unwrap_or_default();
    if !status.is_server_error() {
        warn!(status = %status, "unexpected response status");
    }
    Err(ProviderError::status(
        status.as_u16(),
        format!("calendar request returned {}: {}", status, truncate(&body, 200)),
    ))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

impl FeedFetcher for HttpFeedFetcher {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        Box::pin(async move {
            let body = self
                .get(url)
                .await
                .map_err(|e| e.with_provider(PROVIDER))?;
            let events = parse_feed(&body).map_err(|e| e.with_provider(PROVIDER))?;
            debug!(url = %url, count = events.len(), "fetched calendar");
            Ok(events)
        })
    }
}
