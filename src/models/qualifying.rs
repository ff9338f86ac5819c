use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::event::Event;
use crate::utils::iso8601;

/// One driver record from the provider's driver table. Upstream rows are
/// sparse for older sessions, so everything but the number is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverInfo {
    pub driver_number: i64,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub broadcast_name: Option<String>,
    #[serde(default)]
    pub name_acronym: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_colour: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub headshot_url: Option<String>,
}

impl DriverInfo {
    /// Placeholder for drivers present in the classification but missing
    /// from the driver table.
    pub fn unknown(driver_number: i64) -> Self {
        DriverInfo {
            driver_number,
            full_name: None,
            broadcast_name: None,
            name_acronym: None,
            team_name: None,
            team_colour: None,
            country_code: None,
            headshot_url: None,
        }
    }
}

/// One row of the session lap table, with timing and speed-trap summary.
/// Durations serialize as ISO-8601 strings.
#[derive(Debug, Clone, Serialize)]
pub struct Lap {
    pub driver_number: i64,
    pub lap_number: i64,
    #[serde(serialize_with = "iso8601::serialize_option_duration")]
    pub lap_duration: Option<Duration>,
    #[serde(serialize_with = "iso8601::serialize_option_duration")]
    pub duration_sector_1: Option<Duration>,
    #[serde(serialize_with = "iso8601::serialize_option_duration")]
    pub duration_sector_2: Option<Duration>,
    #[serde(serialize_with = "iso8601::serialize_option_duration")]
    pub duration_sector_3: Option<Duration>,
    pub i1_speed: Option<f64>,
    pub i2_speed: Option<f64>,
    pub st_speed: Option<f64>,
    pub is_pit_out_lap: bool,
    pub date_start: Option<DateTime<Utc>>,
}

/// Per-driver qualifying classification row: finishing position and the
/// best lap duration set in each knockout segment. A null segment means
/// the driver was eliminated before it.
#[derive(Debug, Clone)]
pub struct SegmentTimes {
    pub driver_number: i64,
    pub position: Option<i64>,
    pub q1: Option<Duration>,
    pub q2: Option<Duration>,
    pub q3: Option<Duration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualiResult {
    pub driver: DriverInfo,
    pub q1: Option<Lap>,
    pub q2: Option<Lap>,
    pub q3: Option<Lap>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualifyingResponse {
    pub event: Event,
    pub results: Vec<QualiResult>,
}
