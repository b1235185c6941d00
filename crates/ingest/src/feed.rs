//! HTTP client for the player statistics feed.

use lake_core::config::FeedConfig;
use lake_core::PlayerRecord;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::FetchError;

/// Header carrying the feed subscription key.
pub const API_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

pub struct FeedClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl FeedClient {
    pub fn new(config: &FeedConfig) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// GET the feed and decode its JSON array into records.
    ///
    /// Every failure comes back as a [`FetchError`]; whether an empty batch
    /// aborts the run is left to the caller.
    pub async fn fetch(&self) -> Result<Vec<PlayerRecord>, FetchError> {
        debug!(endpoint = %self.endpoint, "fetching feed");

        let response = self
            .client
            .get(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .inspect_err(|e| warn!(error = %e, "feed request failed"))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status = status.as_u16(), "feed rejected credentials");
            return Err(FetchError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "feed returned an error status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let records = decode_records(&body)?;
        info!(records = records.len(), "feed fetched");
        Ok(records)
    }
}

/// Decode a JSON array body. A record that does not fit [`PlayerRecord`]
/// fails the whole batch; there is no partial ingestion.
pub fn decode_records(body: &[u8]) -> Result<Vec<PlayerRecord>, FetchError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| FetchError::Malformed {
        index: None,
        reason: e.to_string(),
    })?;

    let Value::Array(items) = value else {
        return Err(FetchError::Malformed {
            index: None,
            reason: "expected a JSON array of records".into(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<PlayerRecord>(item).map_err(|e| FetchError::Malformed {
                index: Some(i),
                reason: e.to_string(),
            })
        })
        .collect()
}
