use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit and separator tokens stripped before numeric parsing: thousands
/// separator, won, percent, hundred-million.
const STRIPPED_TOKENS: &[&str] = &[",", "원", "%", "억"];

/// Typed value of a single metric cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Integer(value) => write!(f, "{value}"),
            MetricValue::Float(value) => write!(f, "{value}"),
            MetricValue::Text(value) => f.write_str(value),
        }
    }
}

/// Converts raw cell text into a typed value. Unparseable input is passed
/// through untouched as `Text`.
pub fn coerce(raw: &str) -> MetricValue {
    let mut cleaned = raw.to_string();
    for token in STRIPPED_TOKENS {
        cleaned = cleaned.replace(token, "");
    }
    let cleaned = cleaned.trim();

    if cleaned.contains('.') {
        if let Some(value) = cleaned.parse::<f64>().ok().filter(|value| value.is_finite()) {
            return integral(value)
                .map(MetricValue::Integer)
                .unwrap_or(MetricValue::Float(value));
        }
    } else if let Ok(value) = cleaned.parse::<i64>() {
        return MetricValue::Integer(value);
    }

    MetricValue::Text(raw.to_string())
}

fn integral(value: f64) -> Option<i64> {
    if value.fract() != 0.0 || value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}
