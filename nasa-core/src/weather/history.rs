//! Per-sol time series for charting.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{info, warn};

use super::{calendar, compass, defaults, insight, round1, simulate, WeatherSourceId};
use crate::{client::NasaApi, model::Location};

/// First and last sol of the synthetic series.
pub const SYNTHETIC_SOLS: std::ops::RangeInclusive<u32> = 10..=800;

/// AT, PRE and HWS each contribute av/mn/mx; WD contributes its most common bearing.
const EXPECTED_FIELDS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherHistory {
    pub temperature_data: Vec<TemperaturePoint>,
    pub pressure_data: Vec<PressurePoint>,
    pub wind_data: Vec<WindPoint>,
    pub atmospheric_conditions: Vec<AtmosphericPoint>,
    pub location: Location,
    pub source: WeatherSourceId,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperaturePoint {
    pub sol: u32,
    pub earth_date: NaiveDate,
    pub average: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub season: String,
    pub sample_count: u32,
    pub data_quality: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressurePoint {
    pub sol: u32,
    pub earth_date: NaiveDate,
    pub average: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub season: String,
    pub sample_count: u32,
    pub data_quality: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindPoint {
    pub sol: u32,
    pub earth_date: NaiveDate,
    pub average_speed: f64,
    pub minimum_speed: f64,
    pub maximum_speed: f64,
    pub compass_point: String,
    pub degrees: f64,
    pub season: String,
    pub sample_count: u32,
    pub data_quality: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosphericPoint {
    pub sol: u32,
    pub earth_date: NaiveDate,
    pub opacity: String,
    pub uv_index: String,
    pub season: String,
    pub data_quality: u8,
}

/// One sol before layout into the four series.
#[derive(Debug, Clone)]
struct SolSample {
    sol: u32,
    earth_date: NaiveDate,
    season: String,
    air: insight::InsightStat,
    pressure: insight::InsightStat,
    wind: insight::InsightStat,
    wind_point: Option<String>,
    wind_degrees: Option<f64>,
    opacity: String,
}

impl SolSample {
    fn data_quality(&self) -> u8 {
        let present = self.air.present_fields()
            + self.pressure.present_fields()
            + self.wind.present_fields()
            + usize::from(self.wind_point.is_some() || self.wind_degrees.is_some());
        ((present as f64 / EXPECTED_FIELDS as f64) * 100.0).round() as u8
    }
}

pub async fn history_at(api: &dyn NasaApi, now: DateTime<Utc>) -> WeatherHistory {
    match insight::fetch_feed(api).await {
        Ok(feed) => {
            let samples = archive_samples(&feed, now);
            if !samples.is_empty() {
                info!(sols = samples.len(), "serving InSight weather history");
                return layout(
                    samples,
                    WeatherSourceId::Insight,
                    Location {
                        name: insight::LOCATION_NAME.to_string(),
                        coordinates: insight::ELYSIUM_PLANITIA,
                    },
                    now,
                );
            }
            warn!("InSight archive has no sols, synthesizing history");
        }
        Err(e) => warn!(error = %format!("{e:#}"), "InSight archive unavailable, synthesizing history"),
    }

    synthetic_history(now, &mut rand::rng())
}

fn archive_samples(feed: &insight::InsightFeed, now: DateTime<Utc>) -> Vec<SolSample> {
    feed.sols()
        .into_iter()
        .map(|(sol, record)| {
            let wind = record.most_common_wind();
            SolSample {
                sol,
                earth_date: record
                    .first_utc
                    .as_deref()
                    .and_then(calendar::parse_leading_date)
                    .or_else(|| record.observed_on())
                    .unwrap_or_else(|| now.date_naive()),
                season: record
                    .season
                    .clone()
                    .unwrap_or_else(|| defaults::SEASON.to_string()),
                air: record.air_temperature.unwrap_or_default(),
                pressure: record.pressure.unwrap_or_default(),
                wind: record.wind_speed.unwrap_or_default(),
                wind_point: wind.and_then(|w| w.compass_point.clone()),
                wind_degrees: wind.and_then(|w| w.compass_degrees),
                opacity: defaults::OPACITY.to_string(),
            }
        })
        .collect()
}

/// Sinusoidal seasonal shape with noise and the occasional sensor gap.
pub fn synthetic_history<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> WeatherHistory {
    let samples = SYNTHETIC_SOLS
        .map(|sol| {
            let phase = 2.0 * PI * f64::from(sol) / calendar::SOLS_PER_MARS_YEAR;
            let earth_date = calendar::earth_date_for_sol(calendar::PERSEVERANCE_LANDING, sol);
            let day = calendar::day_of_year(earth_date);

            let air_avg = -63.0 + 15.0 * phase.sin() + rng.random_range(-3.0..3.0);
            let pre_avg = 650.0 + 150.0 * phase.cos() + rng.random_range(-15.0..15.0);
            let wind_avg: f64 = rng.random_range(2.0..12.0);

            let mut stat = |avg: f64, spread: f64| insight::InsightStat {
                av: gap(rng).then_some(round1(avg)),
                mn: gap(rng).then_some(round1(avg - spread)),
                mx: gap(rng).then_some(round1(avg + spread)),
                ct: Some(rng.random_range(50_000..180_000)),
            };
            let air = stat(air_avg, 20.0);
            let pressure = stat(pre_avg, 15.0);
            let wind = stat(wind_avg, wind_avg * 0.6);

            let point = compass::COMPASS_POINTS[rng.random_range(0..compass::COMPASS_POINTS.len())];
            SolSample {
                sol,
                earth_date,
                season: calendar::season_for_sol(sol).to_string(),
                air,
                pressure,
                wind,
                wind_point: gap(rng).then(|| point.to_string()),
                wind_degrees: None,
                opacity: simulate::opacity(day, rng).to_string(),
            }
        })
        .collect();

    layout(
        samples,
        WeatherSourceId::Simulated,
        Location {
            name: simulate::LOCATION_NAME.to_string(),
            coordinates: super::meda::JEZERO,
        },
        now,
    )
}

/// `true` when a synthetic field is present (95% of the time).
fn gap<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.random_bool(0.95)
}

fn layout(
    samples: Vec<SolSample>,
    source: WeatherSourceId,
    location: Location,
    now: DateTime<Utc>,
) -> WeatherHistory {
    let mut history = WeatherHistory {
        temperature_data: Vec::with_capacity(samples.len()),
        pressure_data: Vec::with_capacity(samples.len()),
        wind_data: Vec::with_capacity(samples.len()),
        atmospheric_conditions: Vec::with_capacity(samples.len()),
        location,
        source,
        timestamp: now,
    };

    for sample in samples {
        let quality = sample.data_quality();
        let air = sample.air.to_stat(defaults::AIR_TEMPERATURE);
        let pressure = sample.pressure.to_stat(defaults::PRESSURE);
        let wind = sample.wind.to_stat(defaults::WIND_SPEED);
        let direction = compass::direction(sample.wind_point.as_deref(), sample.wind_degrees);

        history.temperature_data.push(TemperaturePoint {
            sol: sample.sol,
            earth_date: sample.earth_date,
            average: air.average,
            minimum: air.minimum,
            maximum: air.maximum,
            season: sample.season.clone(),
            sample_count: air.count,
            data_quality: quality,
        });
        history.pressure_data.push(PressurePoint {
            sol: sample.sol,
            earth_date: sample.earth_date,
            average: pressure.average,
            minimum: pressure.minimum,
            maximum: pressure.maximum,
            season: sample.season.clone(),
            sample_count: pressure.count,
            data_quality: quality,
        });
        history.wind_data.push(WindPoint {
            sol: sample.sol,
            earth_date: sample.earth_date,
            average_speed: wind.average,
            minimum_speed: wind.minimum,
            maximum_speed: wind.maximum,
            compass_point: direction.compass_point,
            degrees: direction.degrees,
            season: sample.season.clone(),
            sample_count: wind.count,
            data_quality: quality,
        });
        history.atmospheric_conditions.push(AtmosphericPoint {
            sol: sample.sol,
            earth_date: sample.earth_date,
            uv_index: simulate::uv_index(&sample.opacity).to_string(),
            opacity: sample.opacity,
            season: sample.season,
            data_quality: quality,
        });
    }

    history
}
