//! Core library for the NASA explorer backend.
//!
//! This crate defines:
//! - Configuration handling
//! - Request parameter validation
//! - The upstream client abstraction over NASA's public APIs
//! - The Mars weather fallback pipeline
//! - Rover, APOD and TechPort fetchers
//!
//! It is used by `nasa-server`, but has no dependency on any HTTP framework.

pub mod apod;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod rover;
mod serde_util;
pub mod techport;
pub mod validate;
pub mod weather;

#[cfg(any(test, feature = "test-util"))]
pub mod fake;

pub use client::{NasaApi, NasaClient};
pub use config::Config;
pub use error::{UpstreamError, ValidationError};
pub use model::WeatherReading;
pub use rover::Rover;
pub use weather::{WeatherHistory, WeatherPipeline, WeatherSourceId};
