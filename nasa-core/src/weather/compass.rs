//! 16-point compass rose.

use crate::model::WindDirection;

pub const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const STEP: f64 = 360.0 / 16.0;

/// Used whenever a feed reports no usable direction.
pub const DEFAULT_POINT: &str = "SW";
pub const DEFAULT_DEGREES: f64 = 225.0;

fn index_of(point: &str) -> Option<usize> {
    let point = point.trim();
    COMPASS_POINTS.iter().position(|p| p.eq_ignore_ascii_case(point))
}

/// Degrees for a compass point, `225` (SW) when the point is unknown.
pub fn wind_degrees(point: &str) -> f64 {
    index_of(point).map_or(DEFAULT_DEGREES, |i| i as f64 * STEP)
}

/// Nearest compass point for a bearing.
pub fn compass_point(degrees: f64) -> &'static str {
    let i = (normalize_degrees(degrees) / STEP).round() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[i]
}

/// Folds any finite bearing into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return DEFAULT_DEGREES;
    }
    let d = degrees.rem_euclid(360.0);
    if d >= 360.0 { 0.0 } else { d }
}

/// Builds a direction from whatever a feed provided.
pub fn direction(point: Option<&str>, degrees: Option<f64>) -> WindDirection {
    let known = point.and_then(index_of).map(|i| COMPASS_POINTS[i]);
    match (known, degrees) {
        (Some(point), Some(d)) => WindDirection {
            compass_point: point.to_string(),
            degrees: normalize_degrees(d),
        },
        (Some(point), None) => WindDirection {
            compass_point: point.to_string(),
            degrees: wind_degrees(point),
        },
        (None, Some(d)) => WindDirection {
            compass_point: compass_point(d).to_string(),
            degrees: normalize_degrees(d),
        },
        (None, None) => default_direction(),
    }
}

pub fn default_direction() -> WindDirection {
    WindDirection {
        compass_point: DEFAULT_POINT.to_string(),
        degrees: DEFAULT_DEGREES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookup() {
        assert_eq!(wind_degrees("N"), 0.0);
        assert_eq!(wind_degrees("NNE"), 22.5);
        assert_eq!(wind_degrees("NE"), 45.0);
        assert_eq!(wind_degrees("ne"), 45.0);
        assert_eq!(wind_degrees("NNW"), 337.5);
        assert_eq!(wind_degrees("unknown"), 225.0);
        assert_eq!(wind_degrees(""), 225.0);
    }

    #[test]
    fn nearest_point_wraps_north() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(359.0), "N");
        assert_eq!(compass_point(-45.0), "NW");
        assert_eq!(compass_point(202.5), "SSW");
        assert_eq!(compass_point(720.0 + 90.0), "E");
    }

    #[test]
    fn normalized_bearing_stays_in_range() {
        for d in [-720.0, -0.000_000_1, 0.0, 359.999, 360.0, 1e9] {
            let n = normalize_degrees(d);
            assert!((0.0..360.0).contains(&n), "{d} -> {n}");
        }
    }

    #[test]
    fn direction_falls_back_to_southwest() {
        let d = direction(None, None);
        assert_eq!(d.compass_point, "SW");
        assert_eq!(d.degrees, 225.0);

        let d = direction(Some("sideways"), None);
        assert_eq!(d.compass_point, "SW");

        let d = direction(Some("--"), Some(90.0));
        assert_eq!(d.compass_point, "E");
        assert_eq!(d.degrees, 90.0);

        let d = direction(Some("WNW"), None);
        assert_eq!(d.degrees, 292.5);
    }

    #[test]
    fn point_only_direction_uses_table() {
        for point in COMPASS_POINTS {
            let d = direction(Some(&point.to_lowercase()), None);
            assert_eq!(d.compass_point, point);
            assert_eq!(d.degrees, wind_degrees(point));
        }
    }
}
