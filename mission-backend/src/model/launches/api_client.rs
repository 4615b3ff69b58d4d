///! SpaceX API client for the bulk launch query
use std::time::Duration;

use reqwest::Client;
use serde_json::json;

use super::types::{SpacexLaunchDoc, SpacexQueryResponse};
use crate::error::{LaunchError, Result};

pub const SPACEX_API_URL: &str = "https://api.spacexdata.com/v4/launches/query";

pub struct SpacexApiClient {
    client: Client,
    api_url: String,
}

impl SpacexApiClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mission-backend/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LaunchError::UpstreamFetchFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Fetch every launch in one unpaginated query, with the rocket name
    /// and payload customers populated
    pub async fn fetch_all_launches(&self) -> Result<Vec<SpacexLaunchDoc>> {
        let body = json!({
            "query": {},
            "options": {
                "pagination": false,
                "populate": [
                    { "path": "rocket", "select": { "name": 1 } },
                    { "path": "payloads", "select": { "customers": 1 } }
                ]
            }
        });

        let response = self
            .client
            .post(&self.api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LaunchError::UpstreamFetchFailed(format!("Failed to send launch query: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Problem downloading launch data: HTTP {}", status);
            return Err(LaunchError::UpstreamFetchFailed(format!("HTTP error {}", status)));
        }

        let data: SpacexQueryResponse = response
            .json()
            .await
            .map_err(|e| LaunchError::UpstreamFetchFailed(format!("Failed to parse launch data: {}", e)))?;

        tracing::debug!("Fetched {} launch documents", data.docs.len());
        Ok(data.docs)
    }
}
