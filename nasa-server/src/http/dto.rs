//! Query strings and response bodies owned by the HTTP layer.

use chrono::{DateTime, Utc};
use nasa_core::{Rover, techport::Category};
use serde::{Deserialize, Serialize};

/// Parameters arrive as raw strings so validation messages stay ours.
#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SolQuery {
    pub sol: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub trl: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub nasa_api: &'static str,
    pub endpoints: &'static [&'static str],
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MostActiveRoverResponse {
    pub most_active_rover: Rover,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sol: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct NotFoundResponse {
    pub error: &'static str,
    pub path: String,
    pub available_endpoints: &'static [&'static str],
    pub timestamp: DateTime<Utc>,
}

pub const ENDPOINTS: &[&str] = &[
    "GET /api/",
    "GET /api/apod?date=YYYY-MM-DD",
    "GET /api/mars-photos?sol=N",
    "GET /api/mars-photos/{rover}?sol=N",
    "GET /api/rover-manifest/{rover}",
    "GET /api/most-active-rover",
    "GET /api/latest-rover-photos?sol=N",
    "GET /api/perseverance-weather",
    "GET /api/mars-weather",
    "GET /api/mars-weather/history",
    "GET /api/multi-planetary-dashboard",
    "GET /api/techport/projects?category=&status=&trl=&limit=",
    "GET /api/techport/projects/{id}",
    "GET /api/techport/categories",
    "GET /api/techport/analytics?limit=",
];
