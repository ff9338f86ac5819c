use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::models::error::ApiError;
use crate::models::event::Event;
use crate::models::qualifying::{DriverInfo, Lap, SegmentTimes};

use super::Provider;

/// A qualifying session handle. Obtained from [`Provider::get_session`]
/// with event metadata only; `load` fills the driver, lap and
/// classification tables. Request-scoped and read-only once loaded.
pub struct QualiSession {
    provider: Provider,
    event: Event,
    session_key: i64,
    drivers: Vec<DriverInfo>,
    laps: Vec<Lap>,
    classification: Vec<SegmentTimes>,
    car_data: Vec<Value>,
}

impl QualiSession {
    pub(crate) fn new(provider: Provider, event: Event, session_key: i64) -> Self {
        QualiSession {
            provider,
            event,
            session_key,
            drivers: Vec::new(),
            laps: Vec::new(),
            classification: Vec::new(),
            car_data: Vec::new(),
        }
    }

    /// Fetches the session tables. Car telemetry is large and only loaded
    /// when asked for; the qualifying endpoint never needs it.
    pub async fn load(&mut self, telemetry: bool) -> Result<(), ApiError> {
        let base = &self.provider.openf1_base;

        let url = format!("{base}/v1/drivers?session_key={}", self.session_key);
        self.drivers = serde_json::from_value(self.provider.fetch_json(&url).await?)?;

        let url = format!("{base}/v1/laps?session_key={}", self.session_key);
        let raw: Vec<RawLap> = serde_json::from_value(self.provider.fetch_json(&url).await?)?;
        self.laps = raw.into_iter().map(Lap::from).collect();

        let url = format!("{base}/v1/session_result?session_key={}", self.session_key);
        let raw: Vec<RawClassification> =
            serde_json::from_value(self.provider.fetch_json(&url).await?)?;
        let mut classification: Vec<SegmentTimes> =
            raw.into_iter().map(SegmentTimes::from).collect();
        classification.sort_by_key(|row| row.position.unwrap_or(i64::MAX));
        self.classification = classification;

        if telemetry {
            let url = format!("{base}/v1/car_data?session_key={}", self.session_key);
            self.car_data = serde_json::from_value(self.provider.fetch_json(&url).await?)?;
        }

        Ok(())
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn session_key(&self) -> i64 {
        self.session_key
    }

    /// Driver numbers in classification order.
    pub fn drivers(&self) -> Vec<i64> {
        self.classification.iter().map(|r| r.driver_number).collect()
    }

    pub fn classification(&self) -> &[SegmentTimes] {
        &self.classification
    }

    pub fn driver_info(&self, driver_number: i64) -> Option<&DriverInfo> {
        self.drivers.iter().find(|d| d.driver_number == driver_number)
    }

    pub fn laps_for(&self, driver_number: i64) -> impl Iterator<Item = &Lap> + '_ {
        self.laps
            .iter()
            .filter(move |lap| lap.driver_number == driver_number)
    }

    /// First lap of the driver whose duration exactly equals `duration`.
    /// Null duration or no match yields `None`.
    pub fn find_lap(&self, driver_number: i64, duration: Option<Duration>) -> Option<&Lap> {
        let duration = duration?;
        self.laps_for(driver_number)
            .find(|lap| lap.lap_duration == Some(duration))
    }

    pub fn car_data(&self) -> &[Value] {
        &self.car_data
    }

    #[cfg(test)]
    pub fn for_tests(
        event: Event,
        drivers: Vec<DriverInfo>,
        laps: Vec<Lap>,
        mut classification: Vec<SegmentTimes>,
    ) -> Self {
        use super::cache::DiskCache;
        use crate::utils::config::Config;

        let cache_dir =
            std::env::temp_dir().join(format!("quali-api-session-test-{}", std::process::id()));
        let config = Config {
            cache_dir: cache_dir.to_string_lossy().into_owned(),
            jolpica_base_url: "http://127.0.0.1:9".to_string(),
            openf1_base_url: "http://127.0.0.1:9".to_string(),
        };
        let provider = Provider::new(
            reqwest::Client::new(),
            DiskCache::new(&config.cache_dir).unwrap(),
            &config,
        );
        classification.sort_by_key(|row| row.position.unwrap_or(i64::MAX));
        QualiSession {
            provider,
            event,
            session_key: 0,
            drivers,
            laps,
            classification,
            car_data: Vec::new(),
        }
    }
}

/// Wire shape of one OpenF1 lap row. Durations arrive as fractional
/// seconds and are normalized to millisecond precision.
#[derive(Debug, Deserialize)]
struct RawLap {
    driver_number: i64,
    lap_number: i64,
    lap_duration: Option<f64>,
    duration_sector_1: Option<f64>,
    duration_sector_2: Option<f64>,
    duration_sector_3: Option<f64>,
    i1_speed: Option<f64>,
    i2_speed: Option<f64>,
    st_speed: Option<f64>,
    #[serde(default)]
    is_pit_out_lap: bool,
    date_start: Option<DateTime<Utc>>,
}

impl From<RawLap> for Lap {
    fn from(raw: RawLap) -> Self {
        Lap {
            driver_number: raw.driver_number,
            lap_number: raw.lap_number,
            lap_duration: raw.lap_duration.map(duration_from_secs),
            duration_sector_1: raw.duration_sector_1.map(duration_from_secs),
            duration_sector_2: raw.duration_sector_2.map(duration_from_secs),
            duration_sector_3: raw.duration_sector_3.map(duration_from_secs),
            i1_speed: raw.i1_speed,
            i2_speed: raw.i2_speed,
            st_speed: raw.st_speed,
            is_pit_out_lap: raw.is_pit_out_lap,
            date_start: raw.date_start,
        }
    }
}

/// Wire shape of one OpenF1 session_result row. For qualifying the
/// `duration` field is a three-element array of nullable segment times.
#[derive(Debug, Deserialize)]
struct RawClassification {
    driver_number: i64,
    position: Option<i64>,
    duration: Option<Value>,
}

impl RawClassification {
    fn segment(&self, idx: usize) -> Option<Duration> {
        match self.duration.as_ref()? {
            Value::Array(items) => items.get(idx).and_then(Value::as_f64).map(duration_from_secs),
            Value::Number(n) if idx == 0 => n.as_f64().map(duration_from_secs),
            _ => None,
        }
    }
}

impl From<RawClassification> for SegmentTimes {
    fn from(raw: RawClassification) -> Self {
        SegmentTimes {
            driver_number: raw.driver_number,
            position: raw.position,
            q1: raw.segment(0),
            q2: raw.segment(1),
            q3: raw.segment(2),
        }
    }
}

pub(crate) fn duration_from_secs(secs: f64) -> Duration {
    Duration::milliseconds((secs * 1000.0).round() as i64)
}
