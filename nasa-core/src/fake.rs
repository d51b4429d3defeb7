//! In-memory [`NasaApi`] used by tests.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;

use crate::{client::NasaApi, error::UpstreamError};

#[derive(Debug, Clone)]
enum Canned {
    Json(Value),
    Status(StatusCode),
}

/// Serves canned JSON per path (NASA host) or URL (external feeds).
/// Anything unregistered fails with a transport error.
#[derive(Debug, Clone, Default)]
pub struct StubApi {
    nasa: HashMap<String, Canned>,
    external: HashMap<String, Canned>,
    reachable: bool,
}

impl StubApi {
    /// Every call fails, including the health ping.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, path: &str, value: Value) -> Self {
        self.nasa.insert(normalize(path), Canned::Json(value));
        self.reachable = true;
        self
    }

    pub fn with_status(mut self, path: &str, status: StatusCode) -> Self {
        self.nasa.insert(normalize(path), Canned::Status(status));
        self
    }

    pub fn with_external(mut self, url: &str, value: Value) -> Self {
        self.external.insert(url.to_string(), Canned::Json(value));
        self
    }

    pub fn reachable(mut self) -> Self {
        self.reachable = true;
        self
    }

    fn answer(url: &str, canned: Option<&Canned>) -> Result<Value, UpstreamError> {
        match canned {
            Some(Canned::Json(value)) => Ok(value.clone()),
            Some(Canned::Status(status)) => Err(UpstreamError::Status {
                url: url.to_string(),
                status: *status,
                body: String::new(),
            }),
            None => Err(UpstreamError::Transport {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}

fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

#[async_trait]
impl NasaApi for StubApi {
    async fn get_json(&self, path: &str, _query: &[(&str, String)]) -> Result<Value, UpstreamError> {
        let key = normalize(path);
        Self::answer(&key, self.nasa.get(&key))
    }

    async fn get_external(&self, url: &str) -> Result<Value, UpstreamError> {
        Self::answer(url, self.external.get(url))
    }

    async fn ping(&self) -> Result<(), UpstreamError> {
        if self.reachable {
            Ok(())
        } else {
            Err(UpstreamError::Timeout { url: "stub".to_string() })
        }
    }
}
