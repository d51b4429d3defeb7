//! Perseverance MEDA feed published on mars.nasa.gov.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::{calendar, compass, defaults, stat_from_parts, WeatherSourceId};
use crate::{
    client::NasaApi,
    model::{Coordinates, Location, SolData, Temperature, WeatherReading, Wind},
    serde_util::{lenient_f64, lenient_text, lenient_u32},
};

pub const FEED_URL: &str =
    "https://mars.nasa.gov/rss/api/?feed=weather&category=mars2020&feedtype=json";

pub const LOCATION_NAME: &str = "Jezero Crater, Mars (Perseverance MEDA)";
pub const JEZERO: Coordinates = Coordinates { latitude: 18.4447, longitude: 77.4508 };

#[derive(Debug, Deserialize)]
struct MedaFeed {
    #[serde(default)]
    sols: Vec<MedaSol>,
}

/// One sol of MEDA data. Every column may be a number, a numeric string or `"--"`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedaSol {
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
    /// Pascals.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pressure: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub wind_speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub wind_direction: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub sunrise: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub sunset: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub local_uv_irradiance_index: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub atmo_opacity: Option<String>,
}

/// Fetches the feed and keeps its highest sol.
pub async fn fetch(api: &dyn NasaApi) -> Result<MedaSol> {
    let value = api
        .get_external(FEED_URL)
        .await
        .context("MEDA feed request failed")?;

    let feed: MedaFeed =
        serde_json::from_value(value).context("MEDA feed has an unexpected shape")?;

    feed.sols
        .into_iter()
        .max_by_key(|s| s.sol.unwrap_or(0))
        .ok_or_else(|| anyhow!("MEDA feed contained no sols"))
}

impl MedaSol {
    pub fn observed_on(&self) -> Option<NaiveDate> {
        self.terrestrial_date.as_deref().and_then(calendar::parse_leading_date)
    }

    pub fn into_reading(self, now: DateTime<Utc>) -> WeatherReading {
        let sol = self
            .sol
            .unwrap_or_else(|| calendar::sols_since(calendar::PERSEVERANCE_LANDING, now.date_naive()));
        let terrestrial_date = self.observed_on().unwrap_or_else(|| now.date_naive());

        let air = stat_from_parts(self.min_temp, None, self.max_temp, None, defaults::AIR_TEMPERATURE);
        let ground = stat_from_parts(
            self.min_gts_temp,
            None,
            self.max_gts_temp,
            None,
            defaults::GROUND_TEMPERATURE,
        );
        let pressure = stat_from_parts(None, self.pressure, None, None, defaults::PRESSURE);
        let speed = stat_from_parts(None, self.wind_speed, None, None, defaults::WIND_SPEED);

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
                humidity: defaults::HUMIDITY,
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
                coordinates: JEZERO,
            },
            timestamp: now,
            source: WeatherSourceId::Meda,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fake::StubApi, weather::tests::now};
    use serde_json::json;

    #[tokio::test]
    async fn fetch_keeps_highest_sol() {
        let api = StubApi::default().with_external(FEED_URL, json!({"sols": [
            {"sol": "1198", "terrestrial_date": "2024-06-08"},
            {"sol": "1200", "terrestrial_date": "2024-06-10"},
            {"sol": "1199", "terrestrial_date": "2024-06-09"}
        ]}));

        let sol = fetch(&api).await.unwrap();
        assert_eq!(sol.sol, Some(1200));
        assert_eq!(sol.observed_on(), NaiveDate::from_ymd_opt(2024, 6, 10));
    }

    #[tokio::test]
    async fn empty_feed_is_an_error() {
        let api = StubApi::default().with_external(FEED_URL, json!({"sols": []}));
        let err = fetch(&api).await.unwrap_err();
        assert!(err.to_string().contains("no sols"));
    }

    #[test]
    fn placeholders_take_defaults() {
        let sol: MedaSol = serde_json::from_value(json!({
            "sol": "1200",
            "terrestrial_date": "2024-06-10",
            "min_temp": "-83", "max_temp": "-18",
            "pressure": "--", "wind_speed": "--", "wind_direction": "--",
            "atmo_opacity": "Sunny"
        }))
        .unwrap();

        let reading = sol.into_reading(now());
        let data = &reading.sol_data;
        assert_eq!(data.temperature.air.minimum, -83.0);
        assert_eq!(data.temperature.air.maximum, -18.0);
        assert_eq!(data.temperature.air.average, -50.5);
        assert_eq!(data.temperature.ground, defaults::GROUND_TEMPERATURE);
        assert_eq!(data.pressure.average, 700.0);
        assert_eq!(data.wind.speed.average, 5.0);
        assert_eq!(data.wind.direction.compass_point, "SW");
        assert_eq!(data.wind.direction.degrees, 225.0);
        assert_eq!(reading.location.name, LOCATION_NAME);
        assert_eq!(reading.timestamp, now());
    }
}
