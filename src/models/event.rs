use chrono::{DateTime, NaiveDate, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::error::ApiError;

/// First season covered by the modern F1 timing API. Earlier events would
/// need a fallback source, which this service does not wire up.
pub const FIRST_SUPPORTED_SEASON: i32 = 2018;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub season: i32,
    pub round: u32,
    pub event_name: String,
    pub circuit_name: String,
    pub locality: Option<String>,
    pub country: Option<String>,
    pub date: NaiveDate,
    pub start_time: Option<DateTime<Utc>>,
    pub f1_api_support: bool,
}

impl Event {
    /// Builds event metadata from one race entry of the jolpica schedule
    /// payload (`MRData.RaceTable.Races[0]`).
    pub fn from_schedule(race: &Value, season: i32) -> Result<Self, ApiError> {
        let malformed =
            || ApiError::new(StatusCode::BAD_GATEWAY, "unexpected schedule payload from jolpica");

        let round = race["round"]
            .as_str()
            .and_then(|r| r.parse().ok())
            .ok_or_else(malformed)?;
        let event_name = race["raceName"].as_str().ok_or_else(malformed)?.to_string();
        let circuit = &race["Circuit"];
        let circuit_name = circuit["circuitName"]
            .as_str()
            .ok_or_else(malformed)?
            .to_string();
        let locality = circuit["Location"]["locality"].as_str().map(str::to_string);
        let country = circuit["Location"]["country"].as_str().map(str::to_string);

        // Older seasons carry no per-session schedule; fall back to the race date.
        let qualifying = &race["Qualifying"];
        let date_str = qualifying["date"]
            .as_str()
            .or_else(|| race["date"].as_str())
            .ok_or_else(malformed)?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| malformed())?;
        let start_time = qualifying["time"]
            .as_str()
            .or_else(|| race["time"].as_str())
            .and_then(|t| DateTime::parse_from_rfc3339(&format!("{date_str}T{t}")).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(Event {
            season,
            round,
            event_name,
            circuit_name,
            locality,
            country,
            date,
            start_time,
            f1_api_support: season >= FIRST_SUPPORTED_SEASON,
        })
    }
}
