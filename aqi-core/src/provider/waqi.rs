use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::model::{AqiValue, Station, StationReading};

use super::{AqiError, AqiProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.waqi.info/search/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the World Air Quality Index search endpoint.
#[derive(Debug, Clone)]
pub struct WaqiProvider {
    token: String,
    base_url: String,
    http: Client,
}

impl WaqiProvider {
    pub fn new(token: String) -> Result<Self> {
        Ok(Self {
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: build_client(REQUEST_TIMEOUT)?,
        })
    }

    /// Point the client at another server, e.g. a local stub.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Replace the default 10 second request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = build_client(timeout)?;
        Ok(self)
    }

    async fn fetch(&self, keyword: &str) -> Result<Vec<StationReading>, AqiError> {
        debug!(keyword, url = %self.base_url, "searching stations");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[("keyword", keyword), ("token", self.token.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            // WAQI sometimes explains itself even on error statuses.
            if let Ok(WaqiEnvelope::Error(message)) = serde_json::from_str(&body) {
                return Err(AqiError::Api(message));
            }

            return Err(AqiError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let readings = parse_search_body(&body)?;
        debug!(keyword, stations = readings.len(), "search finished");
        Ok(readings)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
enum WaqiEnvelope {
    Ok(Option<Vec<WaqiEntry>>),
    Error(String),
}

#[derive(Debug, Deserialize)]
struct WaqiStation {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WaqiTime {
    vtime: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaqiEntry {
    uid: i64,
    #[serde(default)]
    aqi: AqiValue,
    time: Option<WaqiTime>,
    station: WaqiStation,
}

impl From<WaqiEntry> for StationReading {
    fn from(entry: WaqiEntry) -> Self {
        let observed_at = entry
            .time
            .and_then(|t| t.vtime)
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));

        StationReading {
            station: Station {
                uid: entry.uid,
                name: entry.station.name,
            },
            aqi: entry.aqi,
            observed_at,
        }
    }
}

/// Decode a search response body, surfacing `status: "error"` as [`AqiError::Api`].
pub fn parse_search_body(body: &str) -> Result<Vec<StationReading>, AqiError> {
    let envelope: WaqiEnvelope = serde_json::from_str(body).map_err(AqiError::Decode)?;

    match envelope {
        WaqiEnvelope::Ok(entries) => Ok(entries
            .unwrap_or_default()
            .into_iter()
            .map(StationReading::from)
            .collect()),
        WaqiEnvelope::Error(message) => Err(AqiError::Api(message)),
    }
}

#[async_trait]
impl AqiProvider for WaqiProvider {
    async fn search(&self, keyword: &str) -> Result<Vec<StationReading>> {
        Ok(self.fetch(keyword).await?)
    }
}

fn build_client(timeout: Duration) -> Result<Client, AqiError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
