//! `GET /api/oee`: headline OEE ratios, reported as percent strings.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A leading decimal number, optionally followed by `%`.
static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*%?\s*$").expect("percent regex must compile")
});

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OeeData {
    #[serde(default, deserialize_with = "lenient_percent")]
    pub availability: f64,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub performance: f64,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub quality: f64,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub oee: f64,
}

/// Parse `"85.2%"`, `"85.2 %"` or `"85.2"` into `85.2`. Anything else is `None`.
pub fn parse_percent(raw: &str) -> Option<f64> {
    PERCENT_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn lenient_percent<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_percent(&s),
        _ => None,
    };
    Ok(parsed.filter(|n| n.is_finite()).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_percent_variants() {
        assert_eq!(parse_percent("85.2%"), Some(85.2));
        assert_eq!(parse_percent(" 85.2 % "), Some(85.2));
        assert_eq!(parse_percent("100"), Some(100.0));
        assert_eq!(parse_percent("abc%"), None);
        assert_eq!(parse_percent(""), None);
    }

    #[test]
    fn oee_data_deserializes_strings_and_numbers() {
        let data: OeeData = serde_json::from_str(
            r#"{"availability": "91.5%", "performance": 88, "quality": "bad", "oee": "71.2%"}"#,
        )
        .unwrap();
        assert_eq!(data.availability, 91.5);
        assert_eq!(data.performance, 88.0);
        assert_eq!(data.quality, 0.0);
        assert_eq!(data.oee, 71.2);
    }
}
