use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// A monitoring station as identified by the WAQI API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Station {
    pub uid: i64,
    pub name: String,
}

/// AQI as reported by a station. The API sends `"-"` when a station has no current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAqi")]
pub enum AqiValue {
    Reported(u32),
    #[default]
    Missing,
}

impl AqiValue {
    pub fn value(self) -> Option<u32> {
        match self {
            AqiValue::Reported(v) => Some(v),
            AqiValue::Missing => None,
        }
    }
}

impl fmt::Display for AqiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AqiValue::Reported(v) => write!(f, "{v}"),
            AqiValue::Missing => f.write_str("-"),
        }
    }
}

/// The API is inconsistent about whether `aqi` is a string or a number.
/// Anything unrecognised lands in `Other` so one odd entry never fails a response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAqi {
    Number(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

fn rounded(f: f64) -> Option<u32> {
    (0.0..=f64::from(u32::MAX)).contains(&f).then(|| f.round() as u32)
}

impl From<RawAqi> for AqiValue {
    fn from(raw: RawAqi) -> Self {
        let parsed = match raw {
            RawAqi::Number(n) => u32::try_from(n).ok(),
            RawAqi::Float(f) => rounded(f),
            RawAqi::Text(s) => {
                let s = s.trim();
                s.parse::<u32>().ok().or_else(|| s.parse::<f64>().ok().and_then(rounded))
            }
            RawAqi::Other(_) => None,
        };

        parsed.map_or(AqiValue::Missing, AqiValue::Reported)
    }
}

/// One station entry of a search response.
#[derive(Debug, Clone, PartialEq)]
pub struct StationReading {
    pub station: Station,
    pub aqi: AqiValue,
    pub observed_at: Option<DateTime<Utc>>,
}
