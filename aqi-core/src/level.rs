//! Static lookup of AQI values into the US EPA severity scale.

use std::fmt;

use crate::model::AqiValue;

/// Severity band of an AQI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AqiLevel {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

/// Human-readable description attached to a severity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub level: &'static str,
    pub implications: &'static str,
    pub cautionary: &'static str,
}

/// Shown for stations that reported no value.
pub const NO_DATA: LevelInfo = LevelInfo {
    level: "No data received from the station.",
    implications: "-",
    cautionary: "-",
};

impl AqiLevel {
    /// Bands are inclusive on both ends; anything above 300 is hazardous.
    pub fn from_aqi(aqi: u32) -> Self {
        match aqi {
            0..=50 => AqiLevel::Good,
            51..=100 => AqiLevel::Moderate,
            101..=150 => AqiLevel::UnhealthyForSensitiveGroups,
            151..=200 => AqiLevel::Unhealthy,
            201..=300 => AqiLevel::VeryUnhealthy,
            _ => AqiLevel::Hazardous,
        }
    }

    pub fn from_value(value: AqiValue) -> Option<Self> {
        value.value().map(Self::from_aqi)
    }

    pub fn info(self) -> LevelInfo {
        match self {
            AqiLevel::Good => LevelInfo {
                level: "Good",
                implications: "Air quality is considered satisfactory, and air pollution poses little or no risk",
                cautionary: "-",
            },
            AqiLevel::Moderate => LevelInfo {
                level: "Moderate",
                implications: "Air quality is acceptable; however, for some pollutants there may be a moderate health concern for a very small number of people who are unusually sensitive to air pollution.",
                cautionary: "Active children and adults, and people with respiratory disease, such as asthma, should limit prolonged outdoor exertion.",
            },
            AqiLevel::UnhealthyForSensitiveGroups => LevelInfo {
                level: "Unhealthy for Sensitive Groups",
                implications: "Members of sensitive groups may experience health effects. The general public is not likely to be affected",
                cautionary: "Active children and adults, and people with respiratory disease, such as asthma, should limit prolonged outdoor exertion.",
            },
            AqiLevel::Unhealthy => LevelInfo {
                level: "Unhealthy",
                implications: "Everyone may begin to experience health effects; members of sensitive groups may experience more serious health effects",
                cautionary: "Active children and adults, and people with respiratory disease, such as asthma, should avoid prolonged outdoor exertion; everyone else, especially children, should limit prolonged outdoor exertion",
            },
            AqiLevel::VeryUnhealthy => LevelInfo {
                level: "Very Unhealthy",
                implications: "Health warnings of emergency conditions. The entire population is more likely to be affected.",
                cautionary: "Active children and adults, and people with respiratory disease, such as asthma, should avoid all outdoor exertion; everyone else, especially children, should limit outdoor exertion.",
            },
            AqiLevel::Hazardous => LevelInfo {
                level: "Hazardous",
                implications: "Health alert: everyone may experience more serious health effects",
                cautionary: "Everyone should avoid all outdoor exertion",
            },
        }
    }
}

impl fmt::Display for AqiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().level)
    }
}

/// Severity tuple for a value, falling back to [`NO_DATA`] for missing readings.
pub fn describe(value: AqiValue) -> LevelInfo {
    AqiLevel::from_value(value).map_or(NO_DATA, AqiLevel::info)
}
