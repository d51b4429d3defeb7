//! Lenient field readers for upstream feeds that mix numbers, numeric
//! strings and placeholders such as `"--"` in the same column.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

pub fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_as_f64)
        .filter(|f| *f >= 0.0 && *f <= f64::from(u32::MAX))
        .map(|f| f as u32))
}

/// Non-empty text, treating `"--"` and blank strings as absent.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let s = s.trim();
            (!s.is_empty() && s != "--").then(|| s.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "lenient_f64")]
        temp: Option<f64>,
        #[serde(default, deserialize_with = "lenient_u32")]
        sol: Option<u32>,
        #[serde(default, deserialize_with = "lenient_text")]
        opacity: Option<String>,
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let row: Row = serde_json::from_value(json!({"temp": "-81.5", "sol": "1140", "opacity": "Sunny"})).unwrap();
        assert_eq!(row.temp, Some(-81.5));
        assert_eq!(row.sol, Some(1140));
        assert_eq!(row.opacity.as_deref(), Some("Sunny"));

        let row: Row = serde_json::from_value(json!({"temp": -20, "sol": 12})).unwrap();
        assert_eq!(row.temp, Some(-20.0));
        assert_eq!(row.sol, Some(12));
    }

    #[test]
    fn placeholders_become_none() {
        let row: Row = serde_json::from_value(json!({"temp": "--", "sol": -4, "opacity": "--"})).unwrap();
        assert_eq!(row.temp, None);
        assert_eq!(row.sol, None);
        assert_eq!(row.opacity, None);

        let row: Row = serde_json::from_value(json!({"temp": null})).unwrap();
        assert_eq!(row.temp, None);
    }
}
