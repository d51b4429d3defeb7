//! Earth/Mars date arithmetic.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

/// Length of one sol in Earth days.
pub const EARTH_DAYS_PER_SOL: f64 = 1.027;

pub const SOLS_PER_MARS_YEAR: f64 = 668.6;

pub const PERSEVERANCE_LANDING: NaiveDate = match NaiveDate::from_ymd_opt(2021, 2, 18) {
    Some(d) => d,
    None => panic!("invalid landing date"),
};

pub const CURIOSITY_LANDING: NaiveDate = match NaiveDate::from_ymd_opt(2012, 8, 6) {
    Some(d) => d,
    None => panic!("invalid landing date"),
};

const SEASONS: [&str; 8] = [
    "Early Spring",
    "Late Spring",
    "Early Summer",
    "Late Summer",
    "Early Autumn",
    "Late Autumn",
    "Early Winter",
    "Late Winter",
];

/// 1-based ordinal day within the year.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Whole sols elapsed between a landing date and `today`, `0` before landing.
pub fn sols_since(landing: NaiveDate, today: NaiveDate) -> u32 {
    let days = (today - landing).num_days();
    if days <= 0 {
        return 0;
    }
    (days as f64 / EARTH_DAYS_PER_SOL).floor() as u32
}

pub fn earth_date_for_sol(landing: NaiveDate, sol: u32) -> NaiveDate {
    let days = (f64::from(sol) * EARTH_DAYS_PER_SOL).round() as i64;
    landing + Duration::days(days)
}

/// Season label from slicing the Mars year into eight equal parts.
pub fn season_for_sol(sol: u32) -> &'static str {
    let into_year = f64::from(sol) % SOLS_PER_MARS_YEAR;
    let slice = (into_year / (SOLS_PER_MARS_YEAR / SEASONS.len() as f64)) as usize;
    SEASONS[slice.min(SEASONS.len() - 1)]
}

/// Reads the `YYYY-MM-DD` prefix of a date or RFC 3339 timestamp.
pub fn parse_leading_date(s: &str) -> Option<NaiveDate> {
    s.trim()
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// `true` when `date` falls within the year before `now`.
pub fn is_recent(date: NaiveDate, now: DateTime<Utc>) -> bool {
    let today = now.date_naive();
    let cutoff = today
        .checked_sub_months(Months::new(12))
        .unwrap_or(today - Duration::days(365));
    date > cutoff
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_of_year_counts_leap_days() {
        assert_eq!(day_of_year(ymd(2023, 1, 1)), 1);
        assert_eq!(day_of_year(ymd(2020, 3, 1)), 61);
        assert_eq!(day_of_year(ymd(2023, 3, 1)), 60);
        assert_eq!(day_of_year(ymd(2020, 12, 31)), 366);
    }

    #[test]
    fn sols_scale_by_day_ratio() {
        assert_eq!(sols_since(PERSEVERANCE_LANDING, PERSEVERANCE_LANDING), 0);
        assert_eq!(sols_since(PERSEVERANCE_LANDING, ymd(2020, 1, 1)), 0);
        // 1027 Earth days is exactly 1000 sols.
        let later = PERSEVERANCE_LANDING + Duration::days(1027);
        assert_eq!(sols_since(PERSEVERANCE_LANDING, later), 1000);
        assert_eq!(earth_date_for_sol(PERSEVERANCE_LANDING, 1000), later);
    }

    #[test]
    fn seasons_cycle_every_mars_year() {
        assert_eq!(season_for_sol(0), "Early Spring");
        assert_eq!(season_for_sol(90), "Late Spring");
        assert_eq!(season_for_sol(668), "Late Winter");
        assert_eq!(season_for_sol(669), "Early Spring");
    }

    #[test]
    fn leading_date_accepts_timestamps() {
        assert_eq!(parse_leading_date("2020-10-19T18:32:20Z"), Some(ymd(2020, 10, 19)));
        assert_eq!(parse_leading_date("2024-05-01"), Some(ymd(2024, 5, 1)));
        assert_eq!(parse_leading_date("May 1"), None);
    }

    #[test]
    fn recency_window_is_one_year() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert!(is_recent(ymd(2024, 6, 1), now));
        assert!(is_recent(ymd(2023, 6, 16), now));
        assert!(!is_recent(ymd(2023, 6, 15), now));
        assert!(!is_recent(ymd(2020, 10, 19), now));
    }
}
