//! Astronomy Picture of the Day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    client::{NasaApi, decode},
    error::UpstreamError,
};

pub const PATH: &str = "planetary/apod";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Apod {
    pub date: String,
    pub title: String,
    pub explanation: String,
    pub url: String,
    #[serde(default)]
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdurl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApodResponse {
    #[serde(flatten)]
    pub apod: Apod,
    pub retrieved_at: DateTime<Utc>,
}

/// APOD for `date`, or today's when `None`. Errors propagate to the caller.
pub async fn fetch_apod(api: &dyn NasaApi, date: Option<NaiveDate>) -> Result<ApodResponse, UpstreamError> {
    let mut query = vec![("thumbs", "true".to_string())];
    if let Some(date) = date {
        query.push(("date", date.format("%Y-%m-%d").to_string()));
    }

    let value = api.get_json(PATH, &query).await?;
    let mut apod: Apod = decode(PATH, value)?;
    if let Some(copyright) = apod.copyright.as_mut() {
        *copyright = copyright.trim().to_string();
    }

    Ok(ApodResponse {
        apod,
        retrieved_at: Utc::now(),
    })
}
