//! Route table and middleware (CORS, tracing, panic capture).

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use std::{any::Any, time::Duration};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use super::{error::AppError, handlers, state::AppState};

/// Create the application router with all routes and middleware.
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/api", get(handlers::health))
        .route("/api/", get(handlers::health))
        .route("/api/apod", get(handlers::apod))
        .route("/api/mars-photos", get(handlers::mars_photos))
        .route("/api/mars-photos/{rover}", get(handlers::rover_photos))
        .route("/api/rover-manifest/{rover}", get(handlers::rover_manifest))
        .route("/api/most-active-rover", get(handlers::most_active_rover))
        .route("/api/latest-rover-photos", get(handlers::latest_rover_photos))
        .route("/api/perseverance-weather", get(handlers::mars_weather))
        .route("/api/mars-weather", get(handlers::mars_weather))
        .route("/api/mars-weather/history", get(handlers::mars_weather_history))
        .route("/api/multi-planetary-dashboard", get(handlers::multi_planetary_dashboard))
        .route("/api/techport/projects", get(handlers::techport_projects))
        .route("/api/techport/projects/{id}", get(handlers::techport_project))
        .route("/api/techport/categories", get(handlers::techport_categories))
        .route("/api/techport/analytics", get(handlers::techport_analytics))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors(allowed_origins))
        .with_state(state)
}

fn cors(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin:?}: {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let msg = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    AppError::Internal(format!("handler panicked: {msg}")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header::ORIGIN},
    };
    use nasa_core::{
        NasaApi, apod,
        fake::StubApi,
        rover::{Rover, manifest_path},
        techport::PROJECTS_PATH,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(api: impl NasaApi + 'static) -> Router {
        create_router(
            AppState::new(Arc::new(api)),
            &["http://localhost:3000".to_string()],
        )
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
        let res = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn router_builds_with_bad_origin() {
        let _router = create_router(
            AppState::new(Arc::new(StubApi::failing())),
            &["not a header\n".to_string()],
        );
    }

    #[tokio::test]
    async fn health_reports_reachability() {
        let (status, body) = get(app(StubApi::failing()), "/api/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["nasa_api"], "unreachable");

        let (status, body) = get(app(StubApi::default().reachable()), "/api").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nasa_api"], "reachable");
    }

    #[tokio::test]
    async fn negative_sol_is_rejected() {
        let (status, body) = get(app(StubApi::failing()), "/api/mars-photos?sol=-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("non-negative integer"));
        assert!(body["timestamp"].is_string());

        let (status, _) = get(app(StubApi::failing()), "/api/mars-photos/curiosity?sol=1.5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(app(StubApi::failing()), "/api/latest-rover-photos?sol=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_apod_date_is_rejected() {
        let (status, body) = get(app(StubApi::failing()), "/api/apod?date=2023-13-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("date"));
    }

    #[tokio::test]
    async fn apod_upstream_failure_is_500() {
        let (status, body) = get(app(StubApi::failing()), "/api/apod?date=2024-02-29").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch data from NASA API");
    }

    #[tokio::test]
    async fn apod_passes_through() {
        let api = StubApi::default().with_json(
            apod::PATH,
            json!({"date": "2024-02-29", "title": "Leap", "explanation": "e", "url": "u", "media_type": "image"}),
        );
        let (status, body) = get(app(api), "/api/apod?date=2024-02-29").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Leap");
        assert!(body["retrieved_at"].is_string());
    }

    #[tokio::test]
    async fn unknown_rover_manifest_is_rejected() {
        let (status, body) = get(app(StubApi::failing()), "/api/rover-manifest/not-a-rover").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("rover"));
    }

    #[tokio::test]
    async fn manifest_upstream_status_is_forwarded() {
        let api = StubApi::default().with_status(&manifest_path(Rover::Spirit), StatusCode::TOO_MANY_REQUESTS);
        let (status, _) = get(app(api), "/api/rover-manifest/Spirit").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn weather_survives_total_outage() {
        for path in ["/api/perseverance-weather", "/api/mars-weather"] {
            let (status, body) = get(app(StubApi::failing()), path).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body["sol_data"]["temperature"]["air"]["average"].is_number());
            assert!(body["sol_data"]["wind"]["direction"]["degrees"].is_number());
            assert_eq!(body["source"], "simulated");
        }
    }

    #[tokio::test]
    async fn weather_history_survives_total_outage() {
        let (status, body) = get(app(StubApi::failing()), "/api/mars-weather/history").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["temperature_data"].as_array().map(Vec::len), Some(791));
    }

    #[tokio::test]
    async fn photos_degrade_to_empty() {
        let (status, body) = get(app(StubApi::failing()), "/api/mars-photos?sol=7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_photos"], 0);
        assert_eq!(body["rover"], "curiosity");
        assert_eq!(body["sol"], 7);
    }

    #[tokio::test]
    async fn most_active_rover_falls_back() {
        let (status, body) = get(app(StubApi::failing()), "/api/most-active-rover").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["most_active_rover"], "perseverance");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn latest_photos_use_active_rover_max_sol() {
        let api = StubApi::default()
            .with_json(
                &manifest_path(Rover::Curiosity),
                json!({"photo_manifest": {"name": "Curiosity", "status": "active", "max_sol": 4100, "max_date": "2024-02-19"}}),
            )
            .with_json(
                "mars-photos/api/v1/rovers/curiosity/photos",
                json!({"photos": [{"id": 1, "sol": 4100, "img_src": "http://x/1.jpg"}]}),
            );

        let (status, body) = get(app(api), "/api/latest-rover-photos").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rover"], "curiosity");
        assert_eq!(body["sol"], 4100);
        assert_eq!(body["total_photos"], 1);
    }

    #[tokio::test]
    async fn dashboard_is_served() {
        let (status, body) = get(app(StubApi::failing()), "/api/multi-planetary-dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bodies"].as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn techport_routes() {
        let (status, body) = get(app(StubApi::failing()), "/api/techport/categories").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 17);

        let (status, _) = get(app(StubApi::failing()), "/api/techport/projects/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get(app(StubApi::failing()), "/api/techport/projects?trl=12").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("trl"));

        let (status, _) = get(app(StubApi::failing()), "/api/techport/projects").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn techport_filters_apply() {
        let api = StubApi::default()
            .with_json(PROJECTS_PATH, json!({"projects": [{"projectId": 1}, {"projectId": 2}]}))
            .with_json(
                "techport/api/projects/1",
                json!({"project": {"projectId": 1, "title": "A", "status": "Active", "currentTrl": 3}}),
            )
            .with_json(
                "techport/api/projects/2",
                json!({"project": {"projectId": 2, "title": "B", "status": "Completed", "currentTrl": 9}}),
            );

        let (status, body) = get(app(api), "/api/techport/projects?status=completed").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["projects"][0]["title"], "B");
    }

    #[tokio::test]
    async fn unmatched_path_is_404() {
        let (status, body) = get(app(StubApi::failing()), "/api/does-not-exist").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Endpoint not found");
        assert_eq!(body["path"], "/api/does-not-exist");
        assert!(body["available_endpoints"].as_array().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let res = app(StubApi::failing())
            .oneshot(
                Request::builder()
                    .uri("/api/techport/categories")
                    .header(ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            res.headers().get("access-control-allow-origin").and_then(|v| v.to_str().ok()),
            Some("http://localhost:3000")
        );
    }

    #[tokio::test]
    async fn query_rejections_are_json() {
        let (status, body) = get(app(StubApi::failing()), "/api/mars-photos?sol=1&sol=2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid query"));
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn wrong_method_gets_json_404() {
        let res = app(StubApi::failing())
            .oneshot(Request::builder().method("POST").uri("/api/apod").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Endpoint not found");
        assert_eq!(body["path"], "/api/apod");
    }
}
