use nasa_core::{NasaApi, WeatherPipeline};
use std::sync::Arc;

/// Shared application state passed to all handlers. Holds no per-request data.
#[derive(Debug, Clone)]
pub struct AppState {
    pub api: Arc<dyn NasaApi>,
    pub weather: Arc<WeatherPipeline>,
}

impl AppState {
    pub fn new(api: Arc<dyn NasaApi>) -> Self {
        Self {
            api,
            weather: Arc::new(WeatherPipeline::default()),
        }
    }
}
