use crate::{Config, StationReading, provider::waqi::WaqiProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod waqi;

/// Errors from talking to the AQI API.
#[derive(Debug, thiserror::Error)]
pub enum AqiError {
    #[error("No connection: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("Network connection timeout")]
    Timeout,

    #[error("AQI request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The API answered with `{"status": "error", "data": "<message>"}`.
    #[error("Error: {0}")]
    Api(String),

    #[error("Failed to parse AQI response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),
}

impl From<reqwest::Error> for AqiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AqiError::Timeout
        } else if err.is_connect() {
            AqiError::Connection(err)
        } else {
            AqiError::Http(err)
        }
    }
}

#[async_trait]
pub trait AqiProvider: Send + Sync + Debug {
    /// Search stations by city, country or station name.
    async fn search(&self, keyword: &str) -> anyhow::Result<Vec<StationReading>>;
}

/// Construct the WAQI provider using the token from `env_token` or the config file.
pub fn provider_from_config(
    config: &Config,
    env_token: Option<String>,
) -> anyhow::Result<Box<dyn AqiProvider>> {
    let token = config.resolve_token(env_token)?;
    Ok(Box::new(WaqiProvider::new(token)?))
}
