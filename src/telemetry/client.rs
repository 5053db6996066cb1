//! HTTP access to the game's local telemetry API

use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use super::RawTelemetry;
use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8111";

/// Per-request timeout for the local API.
const LOCAL_TIMEOUT: Duration = Duration::from_millis(1500);

/// Produces one telemetry snapshot per call
pub trait TelemetrySource: Send + Sync {
    fn poll(&self) -> impl Future<Output = RawTelemetry> + Send;
}

pub struct HttpTelemetry {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTelemetry {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(LOCAL_TIMEOUT)
            .no_proxy()
            .build()
            .map_err(Error::HttpClient)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_json(&self, path: &str) -> Option<Value> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.get(&url).send().await.ok()?;
        let response = response.error_for_status().ok()?;
        match response.json().await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Malformed response from {}: {}", url, e);
                None
            }
        }
    }

    async fn fetch_map_image(&self) -> Option<Vec<u8>> {
        let url = format!("{}/map.img", self.base_url);
        let response = self.client.get(&url).send().await.ok()?;
        let response = response.error_for_status().ok()?;
        response.bytes().await.ok().map(|b| b.to_vec())
    }
}

impl TelemetrySource for HttpTelemetry {
    async fn poll(&self) -> RawTelemetry {
        let (state, indicators, mission, map_image) = tokio::join!(
            self.fetch_json("state"),
            self.fetch_json("indicators"),
            self.fetch_json("mission.json"),
            self.fetch_map_image(),
        );

        if state.is_none() {
            tracing::debug!("Telemetry state unavailable at {}", self.base_url);
        }

        RawTelemetry::from_parts(
            state.as_ref(),
            indicators.as_ref(),
            mission.as_ref(),
            map_image.as_deref(),
        )
    }
}
