//! One handler per endpoint: validate, delegate to `nasa_core`, shape JSON.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use chrono::Utc;
use nasa_core::{
    Rover, ValidationError, WeatherHistory, WeatherReading,
    apod::{ApodResponse, fetch_apod},
    dashboard::{Dashboard, dashboard},
    rover::{self, PhotoManifest, PhotosResponse},
    techport::{self, ProjectAnalytics, ProjectFilter, ProjectList, ProjectSummary},
    validate,
};
use std::ops::RangeInclusive;
use tracing::debug;

use super::{
    dto::{
        CategoriesResponse, DateQuery, ENDPOINTS, HealthResponse, LimitQuery, MostActiveRoverResponse,
        NotFoundResponse, ProjectQuery, SolQuery,
    },
    error::AppError,
    extract::{ApiPath, ApiQuery},
    state::AppState,
};

pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// GET /api/
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let nasa_api = match state.api.ping().await {
        Ok(()) => "reachable",
        Err(e) => {
            debug!(error = %e, "NASA API ping failed");
            "unreachable"
        }
    };

    Json(HealthResponse {
        status: "ok",
        service: "nasa-explorer",
        version: env!("CARGO_PKG_VERSION"),
        nasa_api,
        endpoints: ENDPOINTS,
        timestamp: Utc::now(),
    })
}

/// GET /api/apod?date=YYYY-MM-DD
pub async fn apod(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<DateQuery>,
) -> HandlerResult<ApodResponse> {
    let date = q.date.as_deref().map(validate::parse_date).transpose()?;
    Ok(Json(fetch_apod(state.api.as_ref(), date).await?))
}

fn sol_param(q: &SolQuery) -> Result<Option<u32>, ValidationError> {
    q.sol.as_deref().map(validate::parse_sol).transpose()
}

/// GET /api/mars-photos?sol=N
pub async fn mars_photos(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<SolQuery>,
) -> HandlerResult<PhotosResponse> {
    let sol = sol_param(&q)?.unwrap_or(rover::DEFAULT_SOL);
    Ok(Json(rover::fetch_photos(state.api.as_ref(), Rover::default(), sol).await))
}

/// GET /api/mars-photos/{rover}?sol=N
pub async fn rover_photos(
    State(state): State<AppState>,
    ApiPath(rover_name): ApiPath<String>,
    ApiQuery(q): ApiQuery<SolQuery>,
) -> HandlerResult<PhotosResponse> {
    let rover = Rover::try_from(validate::require_non_empty("rover", Some(rover_name.as_str()))?)?;
    let sol = sol_param(&q)?.unwrap_or(rover::DEFAULT_SOL);
    Ok(Json(rover::fetch_photos(state.api.as_ref(), rover, sol).await))
}

/// GET /api/rover-manifest/{rover}
pub async fn rover_manifest(
    State(state): State<AppState>,
    ApiPath(rover_name): ApiPath<String>,
) -> HandlerResult<PhotoManifest> {
    let rover = Rover::try_from(validate::require_non_empty("rover", Some(rover_name.as_str()))?)?;
    Ok(Json(rover::fetch_manifest(state.api.as_ref(), rover).await?))
}

/// GET /api/most-active-rover
pub async fn most_active_rover(State(state): State<AppState>) -> Json<MostActiveRoverResponse> {
    let active = rover::most_active_rover(state.api.as_ref()).await;
    Json(MostActiveRoverResponse {
        most_active_rover: active.rover,
        max_sol: active.max_sol,
        max_date: active.max_date,
        timestamp: Utc::now(),
    })
}

/// GET /api/latest-rover-photos?sol=N
///
/// Without `sol`, uses the selected rover's latest sol.
pub async fn latest_rover_photos(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<SolQuery>,
) -> HandlerResult<PhotosResponse> {
    let requested = sol_param(&q)?;
    let active = rover::most_active_rover(state.api.as_ref()).await;
    let sol = requested.or(active.max_sol).unwrap_or(rover::DEFAULT_SOL);
    Ok(Json(rover::fetch_photos(state.api.as_ref(), active.rover, sol).await))
}

/// GET /api/perseverance-weather and GET /api/mars-weather
pub async fn mars_weather(State(state): State<AppState>) -> Json<WeatherReading> {
    Json(state.weather.latest(state.api.as_ref()).await)
}

/// GET /api/mars-weather/history
pub async fn mars_weather_history(State(state): State<AppState>) -> Json<WeatherHistory> {
    Json(state.weather.history(state.api.as_ref()).await)
}

/// GET /api/multi-planetary-dashboard
pub async fn multi_planetary_dashboard(State(state): State<AppState>) -> Json<Dashboard> {
    Json(dashboard(state.api.as_ref()).await)
}

fn bounded(field: &'static str, raw: Option<&str>, range: RangeInclusive<u32>) -> Result<Option<u32>, ValidationError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let out_of_range = || {
        ValidationError::new(
            field,
            format!("{field} must be an integer between {} and {}", range.start(), range.end()),
        )
    };
    let value = validate::parse_sol(raw.trim()).map_err(|_| out_of_range())?;
    if range.contains(&value) { Ok(Some(value)) } else { Err(out_of_range()) }
}

fn optional_text(field: &'static str, raw: Option<&str>) -> Result<Option<String>, ValidationError> {
    raw.map(|v| validate::require_non_empty(field, Some(v)).map(str::to_string))
        .transpose()
}

fn limit_param(raw: Option<&str>) -> Result<usize, ValidationError> {
    Ok(bounded("limit", raw, 1..=techport::MAX_LIMIT as u32)?
        .map_or(techport::DEFAULT_LIMIT, |l| l as usize))
}

/// GET /api/techport/projects?category=&status=&trl=&limit=
pub async fn techport_projects(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<ProjectQuery>,
) -> HandlerResult<ProjectList> {
    let filter = ProjectFilter {
        category: optional_text("category", q.category.as_deref())?,
        status: optional_text("status", q.status.as_deref())?,
        trl: bounded("trl", q.trl.as_deref(), 1..=9)?.map(|t| t as u8),
        limit: limit_param(q.limit.as_deref())?,
    };
    Ok(Json(techport::list_projects(state.api.as_ref(), filter).await?))
}

/// GET /api/techport/projects/{id}
pub async fn techport_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> HandlerResult<ProjectSummary> {
    let id: u64 = validate::is_valid_sol(&id)
        .then(|| id.parse().ok())
        .flatten()
        .filter(|id| *id > 0)
        .ok_or_else(|| ValidationError::new("id", "project id must be a positive integer"))?;
    Ok(Json(techport::project_detail(state.api.as_ref(), id).await?))
}

/// GET /api/techport/categories
pub async fn techport_categories() -> Json<CategoriesResponse> {
    let categories = techport::categories();
    Json(CategoriesResponse {
        total: categories.len(),
        categories,
    })
}

/// GET /api/techport/analytics?limit=
pub async fn techport_analytics(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<LimitQuery>,
) -> HandlerResult<ProjectAnalytics> {
    let limit = limit_param(q.limit.as_deref())?;
    Ok(Json(techport::analytics(state.api.as_ref(), limit).await?))
}

/// Fallback for unmatched paths.
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Endpoint not found",
            path: uri.path().to_string(),
            available_endpoints: ENDPOINTS,
            timestamp: Utc::now(),
        }),
    )
}
