//! Mars weather with a guaranteed answer.
//!
//! Live sources are tried in order; the first one that answers with data
//! from the past year wins. When none qualifies the reading is simulated,
//! so callers always receive a fully populated [`WeatherReading`].

use anyhow::bail;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::{client::NasaApi, model::{Stat, WeatherReading}};

pub mod calendar;
pub mod compass;
pub mod history;
pub mod insight;
pub mod meda;
pub mod rems;
pub mod simulate;

pub use history::WeatherHistory;

/// Which branch of the pipeline produced a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSourceId {
    Meda,
    Insight,
    Rems,
    Simulated,
}

impl WeatherSourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherSourceId::Meda => "meda",
            WeatherSourceId::Insight => "insight",
            WeatherSourceId::Rems => "rems",
            WeatherSourceId::Simulated => "simulated",
        }
    }

    /// Live sources in default attempt order.
    pub const fn live() -> &'static [WeatherSourceId] {
        &[WeatherSourceId::Meda, WeatherSourceId::Insight, WeatherSourceId::Rems]
    }
}

impl fmt::Display for WeatherSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payload from one live source, before normalization.
#[derive(Debug, Clone)]
pub enum Observation {
    Meda(meda::MedaSol),
    Insight(insight::InsightLatest),
    Rems(rems::RemsReport),
}

impl Observation {
    /// Earth date the payload describes; `None` means it cannot be trusted as recent.
    pub fn observed_on(&self) -> Option<NaiveDate> {
        match self {
            Observation::Meda(sol) => sol.observed_on(),
            Observation::Insight(latest) => latest.observed_on(),
            Observation::Rems(report) => report.observed_on(),
        }
    }

    pub fn into_reading(self, now: DateTime<Utc>) -> WeatherReading {
        match self {
            Observation::Meda(sol) => sol.into_reading(now),
            Observation::Insight(latest) => latest.into_reading(now),
            Observation::Rems(report) => report.into_reading(now),
        }
    }
}

async fn fetch_observation(api: &dyn NasaApi, source: WeatherSourceId) -> anyhow::Result<Observation> {
    let observation = match source {
        WeatherSourceId::Meda => Observation::Meda(meda::fetch(api).await?),
        WeatherSourceId::Insight => Observation::Insight(insight::fetch_latest(api).await?),
        WeatherSourceId::Rems => Observation::Rems(rems::fetch(api).await?),
        WeatherSourceId::Simulated => bail!("simulated weather has no upstream"),
    };
    Ok(observation)
}

/// Ordered list of live sources, always terminated by simulation.
#[derive(Debug, Clone)]
pub struct WeatherPipeline {
    sources: Vec<WeatherSourceId>,
}

impl Default for WeatherPipeline {
    fn default() -> Self {
        Self::with_sources(WeatherSourceId::live().to_vec())
    }
}

impl WeatherPipeline {
    pub fn with_sources(sources: Vec<WeatherSourceId>) -> Self {
        Self { sources }
    }

    pub async fn latest(&self, api: &dyn NasaApi) -> WeatherReading {
        self.reading_at(api, Utc::now()).await
    }

    /// Never fails: every source error or stale payload falls through.
    pub async fn reading_at(&self, api: &dyn NasaApi, now: DateTime<Utc>) -> WeatherReading {
        for &source in &self.sources {
            debug!(%source, "trying weather source");

            let observation = match fetch_observation(api, source).await {
                Ok(observation) => observation,
                Err(e) => {
                    warn!(%source, error = %format!("{e:#}"), "weather source unavailable");
                    continue;
                }
            };

            match observation.observed_on() {
                Some(date) if calendar::is_recent(date, now) => {
                    info!(%source, %date, "serving live weather");
                    return observation.into_reading(now);
                }
                Some(date) => warn!(%source, %date, "weather data is stale, trying next source"),
                None => warn!(%source, "weather payload carries no usable date"),
            }
        }

        warn!("no live weather source qualified, serving simulated reading");
        simulate::reading(now, &mut rand::rng())
    }

    /// Chart series: the InSight archive when reachable, synthetic otherwise.
    pub async fn history(&self, api: &dyn NasaApi) -> WeatherHistory {
        history::history_at(api, Utc::now()).await
    }
}

/// Statistic defaults for fields a feed leaves out.
pub mod defaults {
    use crate::model::Stat;

    pub const AIR_TEMPERATURE: Stat = Stat { average: -60.0, minimum: -80.0, maximum: -20.0, count: 0 };
    pub const GROUND_TEMPERATURE: Stat = Stat { average: -55.0, minimum: -75.0, maximum: -10.0, count: 0 };
    pub const PRESSURE: Stat = Stat { average: 700.0, minimum: 690.0, maximum: 710.0, count: 0 };
    pub const WIND_SPEED: Stat = Stat { average: 5.0, minimum: 0.0, maximum: 10.0, count: 0 };
    pub const HUMIDITY: Stat = Stat { average: 0.0, minimum: 0.0, maximum: 0.0, count: 0 };

    pub const SEASON: &str = "Unknown";
    pub const SUNRISE: &str = "05:30";
    pub const SUNSET: &str = "17:45";
    pub const UV_INDEX: &str = "Moderate";
    pub const OPACITY: &str = "Sunny";
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn hpa_to_pa(hpa: f64) -> f64 {
    hpa * 100.0
}

/// Assembles a statistic from whichever parts a feed supplied.
pub(crate) fn stat_from_parts(
    minimum: Option<f64>,
    average: Option<f64>,
    maximum: Option<f64>,
    count: Option<u32>,
    fallback: Stat,
) -> Stat {
    let average = match (minimum, average, maximum) {
        (None, None, None) => return fallback,
        (_, Some(avg), _) => avg,
        (Some(lo), None, Some(hi)) => (lo + hi) / 2.0,
        (Some(v), None, None) | (None, None, Some(v)) => v,
    };
    Stat::ordered(
        round1(minimum.unwrap_or(average)),
        round1(average),
        round1(maximum.unwrap_or(average)),
        count.unwrap_or(1),
    )
}
