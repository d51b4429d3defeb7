//! InSight lander archive (`/insight_weather/`), keyed by sol.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::{calendar, compass, defaults, stat_from_parts, WeatherSourceId};
use crate::{
    client::NasaApi,
    model::{Coordinates, Location, SolData, Stat, Temperature, WeatherReading, Wind},
    serde_util::{lenient_f64, lenient_u32},
};

pub const PATH: &str = "insight_weather/";

pub const LOCATION_NAME: &str = "Elysium Planitia, Mars (InSight lander archive)";
pub const ELYSIUM_PLANITIA: Coordinates = Coordinates { latitude: 4.5024, longitude: 135.6234 };

/// The whole feed: `sol_keys` plus one object per sol key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightFeed {
    #[serde(default)]
    pub sol_keys: Vec<String>,
    #[serde(flatten)]
    pub entries: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightSol {
    #[serde(rename = "AT")]
    pub air_temperature: Option<InsightStat>,
    #[serde(rename = "HWS")]
    pub wind_speed: Option<InsightStat>,
    #[serde(rename = "PRE")]
    pub pressure: Option<InsightStat>,
    #[serde(rename = "WD")]
    pub wind_direction: Option<InsightWind>,
    #[serde(rename = "Season")]
    pub season: Option<String>,
    #[serde(rename = "First_UTC")]
    pub first_utc: Option<String>,
    #[serde(rename = "Last_UTC")]
    pub last_utc: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct InsightStat {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub av: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub mn: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub mx: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub ct: Option<u32>,
}

impl InsightStat {
    pub fn to_stat(self, fallback: Stat) -> Stat {
        stat_from_parts(self.mn, self.av, self.mx, self.ct, fallback)
    }

    pub(crate) fn present_fields(&self) -> usize {
        [self.av, self.mn, self.mx].iter().filter(|v| v.is_some()).count()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightWind {
    pub most_common: Option<InsightCompass>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightCompass {
    pub compass_point: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub compass_degrees: Option<f64>,
}

impl InsightSol {
    /// Prefers the end of the sol's observation window.
    pub fn observed_on(&self) -> Option<NaiveDate> {
        self.last_utc
            .as_deref()
            .and_then(calendar::parse_leading_date)
            .or_else(|| self.first_utc.as_deref().and_then(calendar::parse_leading_date))
    }

    pub fn most_common_wind(&self) -> Option<&InsightCompass> {
        self.wind_direction.as_ref().and_then(|wd| wd.most_common.as_ref())
    }
}

impl InsightFeed {
    /// Parsed sols in ascending order. Unparseable keys or records are skipped.
    pub fn sols(&self) -> Vec<(u32, InsightSol)> {
        let keys: Vec<&String> = if self.sol_keys.is_empty() {
            self.entries.keys().collect()
        } else {
            self.sol_keys.iter().collect()
        };

        let mut sols: Vec<(u32, InsightSol)> = keys
            .into_iter()
            .filter_map(|key| {
                let sol = key.trim().parse::<u32>().ok()?;
                let record = self.entries.get(key.as_str())?;
                let parsed = serde_json::from_value(record.clone()).ok()?;
                Some((sol, parsed))
            })
            .collect();

        sols.sort_by_key(|(sol, _)| *sol);
        sols.dedup_by_key(|(sol, _)| *sol);
        sols
    }

    pub fn latest(&self) -> Option<(u32, InsightSol)> {
        self.sols().pop()
    }
}

/// Most recent sol of the archive.
#[derive(Debug, Clone)]
pub struct InsightLatest {
    pub sol: u32,
    pub record: InsightSol,
}

pub async fn fetch_feed(api: &dyn NasaApi) -> Result<InsightFeed> {
    let value = api
        .get_json(PATH, &[("feedtype", "json".to_string()), ("ver", "1.0".to_string())])
        .await
        .context("InSight weather request failed")?;

    serde_json::from_value(value).context("InSight weather feed has an unexpected shape")
}

pub async fn fetch_latest(api: &dyn NasaApi) -> Result<InsightLatest> {
    let feed = fetch_feed(api).await?;
    let (sol, record) = feed
        .latest()
        .ok_or_else(|| anyhow!("InSight weather feed contained no sols"))?;
    Ok(InsightLatest { sol, record })
}

impl InsightLatest {
    pub fn observed_on(&self) -> Option<NaiveDate> {
        self.record.observed_on()
    }

    pub fn into_reading(self, now: DateTime<Utc>) -> WeatherReading {
        let record = self.record;
        let terrestrial_date = record
            .first_utc
            .as_deref()
            .and_then(calendar::parse_leading_date)
            .or_else(|| record.observed_on())
            .unwrap_or_else(|| now.date_naive());

        let wind = record.most_common_wind();
        let direction = compass::direction(
            wind.and_then(|w| w.compass_point.as_deref()),
            wind.and_then(|w| w.compass_degrees),
        );

        let air = record
            .air_temperature
            .map_or(defaults::AIR_TEMPERATURE, |s| s.to_stat(defaults::AIR_TEMPERATURE));
        let pressure = record
            .pressure
            .map_or(defaults::PRESSURE, |s| s.to_stat(defaults::PRESSURE));
        let speed = record
            .wind_speed
            .map_or(defaults::WIND_SPEED, |s| s.to_stat(defaults::WIND_SPEED));

        WeatherReading {
            latest_sol: self.sol,
            sol_data: SolData {
                sol: self.sol,
                terrestrial_date,
                temperature: Temperature {
                    air,
                    ground: defaults::GROUND_TEMPERATURE,
                },
                pressure,
                wind: Wind { speed, direction },
                humidity: defaults::HUMIDITY,
                season: record
                    .season
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| defaults::SEASON.to_string()),
                sunrise: defaults::SUNRISE.to_string(),
                sunset: defaults::SUNSET.to_string(),
                local_uv_irradiance_index: defaults::UV_INDEX.to_string(),
                atmosphere_opacity: defaults::OPACITY.to_string(),
            },
            location: Location {
                name: LOCATION_NAME.to_string(),
                coordinates: ELYSIUM_PLANITIA,
            },
            timestamp: now,
            source: WeatherSourceId::Insight,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::weather::tests::now;
    use serde_json::json;

    pub(crate) fn sample_feed() -> Value {
        json!({
            "sol_keys": ["674", "675"],
            "674": {
                "AT": {"av": -61.0, "mn": -95.0, "mx": -14.0, "ct": 170000},
                "PRE": {"av": 749.2, "mn": 720.1, "mx": 770.4, "ct": 170000},
                "Season": "fall",
                "First_UTC": "2020-10-18T17:52:45Z",
                "Last_UTC": "2020-10-19T18:32:20Z"
            },
            "675": {
                "AT": {"av": -62.3, "mn": -96.8, "mx": -15.9, "ct": 177556},
                "HWS": {"av": 7.2, "mn": 0.4, "mx": 22.5, "ct": 88628},
                "PRE": {"av": 750.6, "mn": 722.0, "mx": 768.8, "ct": 177556},
                "WD": {"most_common": {"compass_degrees": 202.5, "compass_point": "SSW", "ct": 28}},
                "Season": "fall",
                "First_UTC": "2020-10-19T18:32:20Z",
                "Last_UTC": "2020-10-20T19:11:55Z"
            },
            "validity_checks": {"sol_hours_required": 18}
        })
    }

    #[test]
    fn sols_are_sorted_and_skip_junk_keys() {
        let feed: InsightFeed = serde_json::from_value(sample_feed()).unwrap();
        let sols = feed.sols();
        assert_eq!(sols.iter().map(|(s, _)| *s).collect::<Vec<_>>(), vec![674, 675]);

        let (sol, record) = feed.latest().unwrap();
        assert_eq!(sol, 675);
        assert_eq!(record.observed_on(), NaiveDate::from_ymd_opt(2020, 10, 20));
    }

    #[test]
    fn missing_sol_keys_uses_numeric_entries() {
        let feed: InsightFeed = serde_json::from_value(json!({
            "12": {"First_UTC": "2019-01-01T00:00:00Z"},
            "validity_checks": {}
        }))
        .unwrap();
        assert_eq!(feed.latest().map(|(s, _)| s), Some(12));
    }

    #[test]
    fn converts_latest_sol() {
        let feed: InsightFeed = serde_json::from_value(sample_feed()).unwrap();
        let (sol, record) = feed.latest().unwrap();
        let reading = InsightLatest { sol, record }.into_reading(now());

        let data = &reading.sol_data;
        assert_eq!(reading.latest_sol, 675);
        assert_eq!(data.terrestrial_date, NaiveDate::from_ymd_opt(2020, 10, 19).unwrap());
        assert_eq!(data.temperature.air.average, -62.3);
        assert_eq!(data.temperature.air.count, 177556);
        assert_eq!(data.pressure.average, 750.6);
        assert_eq!(data.wind.speed.maximum, 22.5);
        assert_eq!(data.wind.direction.compass_point, "SSW");
        assert_eq!(data.wind.direction.degrees, 202.5);
        assert_eq!(data.season, "fall");
        assert_eq!(reading.location.name, LOCATION_NAME);
    }
}
