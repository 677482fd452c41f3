use chrono::{DateTime, Utc};

use crate::{
    level::{self, AqiLevel, LevelInfo},
    model::{AqiValue, StationReading},
};

pub const TABLE_TITLE: &str = "Air Quality Index";
pub const TABLE_HEADERS: [&str; 5] = ["Location", "AQI", "Level", "Implications", "Cautionary"];

/// One table row: a station's reading next to its severity description.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub location: String,
    pub aqi: AqiValue,
    pub severity: Option<AqiLevel>,
    pub info: LevelInfo,
    pub observed_at: Option<DateTime<Utc>>,
}

impl ReportRow {
    pub fn cells(&self) -> [String; 5] {
        [
            self.location.clone(),
            self.aqi.to_string(),
            self.info.level.to_string(),
            self.info.implications.to_string(),
            self.info.cautionary.to_string(),
        ]
    }
}

impl From<&StationReading> for ReportRow {
    fn from(reading: &StationReading) -> Self {
        ReportRow {
            location: reading.station.name.clone(),
            aqi: reading.aqi,
            severity: AqiLevel::from_value(reading.aqi),
            info: level::describe(reading.aqi),
            observed_at: reading.observed_at,
        }
    }
}

pub fn build_rows(readings: &[StationReading]) -> Vec<ReportRow> {
    readings.iter().map(ReportRow::from).collect()
}
