use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{fmt::Debug, time::Duration};
use tracing::debug;

use crate::{config::Config, error::UpstreamError};

/// Everything the fetchers need from the network.
///
/// `get_json` targets the NASA API host and carries the API key;
/// `get_external` is for feeds hosted elsewhere and sends no key.
#[async_trait]
pub trait NasaApi: Send + Sync + Debug {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, UpstreamError>;

    async fn get_external(&self, url: &str) -> Result<Value, UpstreamError>;

    /// Cheap reachability probe used by the health endpoint.
    async fn ping(&self) -> Result<(), UpstreamError>;
}

#[derive(Debug, Clone)]
pub struct NasaClient {
    base_url: String,
    api_key: String,
    http: Client,
    external: Client,
    health_timeout: Duration,
}

impl NasaClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("nasa-explorer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let external = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http,
            external,
            health_timeout: config.health_timeout(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn read_json(url: &str, res: reqwest::Response) -> Result<Value, UpstreamError> {
        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| UpstreamError::from_reqwest(url, e))?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                url: url.to_string(),
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| UpstreamError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl NasaApi for NasaClient {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, UpstreamError> {
        let url = self.url_for(path);
        debug!(%url, "NASA API request");

        let res = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(&url, e))?;

        Self::read_json(&url, res).await
    }

    async fn get_external(&self, url: &str) -> Result<Value, UpstreamError> {
        debug!(%url, "external feed request");

        let res = self
            .external
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(url, e))?;

        Self::read_json(url, res).await
    }

    async fn ping(&self) -> Result<(), UpstreamError> {
        let url = self.url_for("planetary/apod");
        let res = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(&url, e))?;

        let status = res.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(UpstreamError::Status {
                url,
                status,
                body: String::new(),
            })
        }
    }
}

/// Typed view of an upstream payload; shape mismatches become `Decode` errors.
pub(crate) fn decode<T: DeserializeOwned>(url: &str, value: Value) -> Result<T, UpstreamError> {
    serde_json::from_value(value).map_err(|e| UpstreamError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
