//! Curiosity REMS mission weather service. Pressure is reported in hPa.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::{calendar, compass, defaults, hpa_to_pa, stat_from_parts, WeatherSourceId};
use crate::{
    client::NasaApi,
    model::{Coordinates, Location, SolData, Temperature, WeatherReading, Wind},
    serde_util::{lenient_f64, lenient_text, lenient_u32},
};

pub const FEED_URL: &str = "https://api.maas2.apollorion.com/";

pub const LOCATION_NAME: &str = "Gale Crater, Mars (Curiosity REMS)";
pub const GALE_CRATER: Coordinates = Coordinates { latitude: -4.5895, longitude: 137.4417 };

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemsReport {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub sol: Option<u32>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub terrestrial_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub season: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub min_temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub max_temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub min_gts_temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub max_gts_temp: Option<f64>,
    /// Hectopascals.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pressure: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub abs_humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub wind_speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub wind_direction: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub atmo_opacity: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub sunrise: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub sunset: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub local_uv_irradiance_index: Option<String>,
}

pub async fn fetch(api: &dyn NasaApi) -> Result<RemsReport> {
    let value = api
        .get_external(FEED_URL)
        .await
        .context("REMS weather service request failed")?;

    serde_json::from_value(value).context("REMS weather report has an unexpected shape")
}

impl RemsReport {
    pub fn observed_on(&self) -> Option<NaiveDate> {
        self.terrestrial_date.as_deref().and_then(calendar::parse_leading_date)
    }

    pub fn into_reading(self, now: DateTime<Utc>) -> WeatherReading {
        let sol = self
            .sol
            .unwrap_or_else(|| calendar::sols_since(calendar::CURIOSITY_LANDING, now.date_naive()));
        let terrestrial_date = self.observed_on().unwrap_or_else(|| now.date_naive());

        let air = stat_from_parts(self.min_temp, None, self.max_temp, None, defaults::AIR_TEMPERATURE);
        let ground = stat_from_parts(
            self.min_gts_temp,
            None,
            self.max_gts_temp,
            None,
            defaults::GROUND_TEMPERATURE,
        );
        let pressure = stat_from_parts(None, self.pressure.map(hpa_to_pa), None, None, defaults::PRESSURE);
        let speed = stat_from_parts(None, self.wind_speed, None, None, defaults::WIND_SPEED);
        let humidity = stat_from_parts(None, self.abs_humidity, None, None, defaults::HUMIDITY);

        WeatherReading {
            latest_sol: sol,
            sol_data: SolData {
                sol,
                terrestrial_date,
                temperature: Temperature { air, ground },
                pressure,
                wind: Wind {
                    speed,
                    direction: compass::direction(self.wind_direction.as_deref(), None),
                },
                humidity,
                season: self.season.unwrap_or_else(|| defaults::SEASON.to_string()),
                sunrise: self.sunrise.unwrap_or_else(|| defaults::SUNRISE.to_string()),
                sunset: self.sunset.unwrap_or_else(|| defaults::SUNSET.to_string()),
                local_uv_irradiance_index: self
                    .local_uv_irradiance_index
                    .unwrap_or_else(|| defaults::UV_INDEX.to_string()),
                atmosphere_opacity: self
                    .atmo_opacity
                    .unwrap_or_else(|| defaults::OPACITY.to_string()),
            },
            location: Location {
                name: LOCATION_NAME.to_string(),
                coordinates: GALE_CRATER,
            },
            timestamp: now,
            source: WeatherSourceId::Rems,
        }
    }
}
