//! Physically plausible synthetic readings for when every live source fails.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::f64::consts::PI;

use super::{calendar, compass, round1, WeatherSourceId};
use crate::model::{Location, SolData, Stat, Temperature, WeatherReading, Wind, WindDirection};

pub const LOCATION_NAME: &str = "Jezero Crater, Mars (simulated)";

/// Dust storms cluster in this day-of-year window.
pub const STORM_SEASON: std::ops::RangeInclusive<u32> = 60..=150;

const BASE_AIR_TEMPERATURE: f64 = -63.0;
const TEMPERATURE_AMPLITUDE: f64 = 15.0;
const BASE_PRESSURE: f64 = 650.0;
const PRESSURE_AMPLITUDE: f64 = 150.0;

fn seasonal_phase(day_of_year: u32) -> f64 {
    2.0 * PI * f64::from(day_of_year) / 365.25
}

pub fn air_temperature<R: Rng + ?Sized>(day_of_year: u32, rng: &mut R) -> Stat {
    let average = BASE_AIR_TEMPERATURE
        + TEMPERATURE_AMPLITUDE * seasonal_phase(day_of_year).sin()
        + rng.random_range(-2.0..2.0);
    let minimum = average - rng.random_range(15.0..25.0);
    let maximum = average + rng.random_range(15.0..25.0);
    Stat::ordered(round1(minimum), round1(average), round1(maximum), rng.random_range(100_000..180_000))
}

pub fn pressure<R: Rng + ?Sized>(day_of_year: u32, rng: &mut R) -> Stat {
    let average = BASE_PRESSURE
        + PRESSURE_AMPLITUDE * seasonal_phase(day_of_year).cos()
        + rng.random_range(-10.0..10.0);
    let minimum = average - rng.random_range(5.0..25.0);
    let maximum = average + rng.random_range(5.0..25.0);
    Stat::ordered(round1(minimum), round1(average), round1(maximum), rng.random_range(100_000..180_000))
}

pub fn wind_speed<R: Rng + ?Sized>(rng: &mut R) -> Stat {
    let average: f64 = rng.random_range(2.0..12.0);
    let minimum = average * rng.random_range(0.1..0.6);
    let maximum = average * rng.random_range(1.4..2.4);
    Stat::ordered(round1(minimum), round1(average), round1(maximum), rng.random_range(50_000..90_000))
}

pub fn wind_direction<R: Rng + ?Sized>(rng: &mut R) -> WindDirection {
    let point = compass::COMPASS_POINTS[rng.random_range(0..compass::COMPASS_POINTS.len())];
    compass::direction(Some(point), None)
}

/// Dust opacity label, skewed dustier during storm season.
pub fn opacity<R: Rng + ?Sized>(day_of_year: u32, rng: &mut R) -> &'static str {
    let roll: f64 = rng.random();
    if STORM_SEASON.contains(&day_of_year) {
        match roll {
            r if r < 0.15 => "Sunny",
            r if r < 0.45 => "Hazy",
            r if r < 0.80 => "Dusty",
            _ => "Very Dusty",
        }
    } else {
        match roll {
            r if r < 0.70 => "Sunny",
            r if r < 0.90 => "Hazy",
            _ => "Dusty",
        }
    }
}

pub fn uv_index(opacity: &str) -> &'static str {
    match opacity {
        "Sunny" => "High",
        "Hazy" => "Moderate",
        _ => "Low",
    }
}

fn clock<R: Rng + ?Sized>(hour: u32, rng: &mut R) -> String {
    format!("{hour:02}:{:02}", rng.random_range(0..60))
}

/// Synthetic reading for `now`. Infallible.
pub fn reading<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> WeatherReading {
    let today = now.date_naive();
    let day = calendar::day_of_year(today);
    let sol = calendar::sols_since(calendar::PERSEVERANCE_LANDING, today);

    let air = air_temperature(day, rng);
    let ground = Stat::ordered(
        round1(air.minimum - rng.random_range(2.0..8.0)),
        round1(air.average + rng.random_range(3.0..8.0)),
        round1(air.maximum + rng.random_range(5.0..15.0)),
        air.count,
    );
    let humidity_avg: f64 = rng.random_range(0.0..4.0);
    let humidity = Stat::ordered(
        0.0,
        round1(humidity_avg),
        round1(humidity_avg * 2.0),
        rng.random_range(1_000..5_000),
    );
    let opacity = opacity(day, rng);

    WeatherReading {
        latest_sol: sol,
        sol_data: SolData {
            sol,
            terrestrial_date: today,
            temperature: Temperature { air, ground },
            pressure: pressure(day, rng),
            wind: Wind {
                speed: wind_speed(rng),
                direction: wind_direction(rng),
            },
            humidity,
            season: calendar::season_for_sol(sol).to_string(),
            sunrise: clock(5, rng),
            sunset: clock(17, rng),
            local_uv_irradiance_index: uv_index(opacity).to_string(),
            atmosphere_opacity: opacity.to_string(),
        },
        location: Location {
            name: LOCATION_NAME.to_string(),
            coordinates: super::meda::JEZERO,
        },
        timestamp: now,
        source: WeatherSourceId::Simulated,
    }
}
