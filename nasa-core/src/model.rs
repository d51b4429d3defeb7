//! The canonical weather reading every weather source is normalized into.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::weather::WeatherSourceId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub latest_sol: u32,
    pub sol_data: SolData,
    pub location: Location,
    /// When this reading was produced by us, never the upstream time.
    pub timestamp: DateTime<Utc>,
    pub source: WeatherSourceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolData {
    pub sol: u32,
    pub terrestrial_date: NaiveDate,
    pub temperature: Temperature,
    pub pressure: Stat,
    pub wind: Wind,
    pub humidity: Stat,
    pub season: String,
    pub sunrise: String,
    pub sunset: String,
    pub local_uv_irradiance_index: String,
    pub atmosphere_opacity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub air: Stat,
    pub ground: Stat,
}

/// Summary statistics for one measured quantity over a sol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub average: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub count: u32,
}

impl Stat {
    /// Builds a stat whose values always satisfy `minimum <= average <= maximum`.
    pub fn ordered(minimum: f64, average: f64, maximum: f64, count: u32) -> Self {
        let mut v = [minimum, average, maximum];
        v.sort_by(f64::total_cmp);
        Self {
            minimum: v[0],
            average: v[1],
            maximum: v[2],
            count,
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.minimum <= self.average && self.average <= self.maximum
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: Stat,
    pub direction: WindDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindDirection {
    pub compass_point: String,
    /// Always within `[0, 360)`.
    pub degrees: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_sorts_inverted_input() {
        let s = Stat::ordered(-10.0, -60.0, -80.0, 3);
        assert_eq!((s.minimum, s.average, s.maximum), (-80.0, -60.0, -10.0));
        assert!(s.is_ordered());
        assert_eq!(s.count, 3);
    }
}
