pub mod cache;
pub mod session;

use chrono::DateTime;
use http::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::models::error::ApiError;
use crate::models::event::Event;
use crate::utils::config::Config;
use cache::DiskCache;
pub use session::QualiSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionType {
    Qualifying,
}

impl SessionType {
    pub fn session_name(&self) -> &'static str {
        match self {
            SessionType::Qualifying => "Qualifying",
        }
    }
}

/// Client for the upstream timing APIs: the jolpica schedule API for event
/// metadata and the OpenF1 API for drivers, laps and classification. Every
/// response body goes through the disk cache.
#[derive(Clone)]
pub struct Provider {
    client: reqwest::Client,
    cache: DiskCache,
    jolpica_base: String,
    openf1_base: String,
}

impl Provider {
    pub fn new(client: reqwest::Client, cache: DiskCache, config: &Config) -> Self {
        Provider {
            client,
            cache,
            jolpica_base: config.jolpica_base_url.clone(),
            openf1_base: config.openf1_base_url.clone(),
        }
    }

    /// Resolves a session handle for (year, round, type). The handle carries
    /// event metadata; tables are empty until [`QualiSession::load`] runs.
    pub async fn get_session(
        &self,
        year: i32,
        round: u32,
        session_type: SessionType,
    ) -> Result<QualiSession, ApiError> {
        let url = format!("{}/ergast/f1/{year}/{round}.json", self.jolpica_base);
        let schedule = self.fetch_json(&url).await?;

        let races = &schedule["MRData"]["RaceTable"]["Races"];
        let Some(race) = races.as_array().and_then(|r| r.first()) else {
            return Err(ApiError::new(
                StatusCode::NOT_FOUND,
                &format!("no event found for season {year} round {round}"),
            ));
        };
        let event = Event::from_schedule(race, year)?;

        let session_key = self.resolve_session_key(year, &event, session_type).await?;
        Ok(QualiSession::new(self.clone(), event, session_key))
    }

    /// Finds the OpenF1 session key for the event: meetings are matched by
    /// date (the meetings list also carries testing, so round order alone is
    /// not reliable), then sessions filtered by name.
    async fn resolve_session_key(
        &self,
        year: i32,
        event: &Event,
        session_type: SessionType,
    ) -> Result<i64, ApiError> {
        let url = format!("{}/v1/meetings?year={year}", self.openf1_base);
        let meetings = self.fetch_json(&url).await?;

        let meeting_key = meetings
            .as_array()
            .into_iter()
            .flatten()
            .find(|m| {
                m["date_start"]
                    .as_str()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|d| (d.date_naive() - event.date).num_days().abs() <= 4)
                    .unwrap_or(false)
            })
            .and_then(|m| m["meeting_key"].as_i64())
            .ok_or_else(|| {
                ApiError::new(
                    StatusCode::NOT_FOUND,
                    &format!("no timing data available for {}", event.event_name),
                )
            })?;

        let url = format!(
            "{}/v1/sessions?meeting_key={meeting_key}&session_name={}",
            self.openf1_base,
            session_type.session_name()
        );
        let sessions = self.fetch_json(&url).await?;
        sessions
            .as_array()
            .and_then(|s| s.first())
            .and_then(|s| s["session_key"].as_i64())
            .ok_or_else(|| {
                ApiError::new(
                    StatusCode::NOT_FOUND,
                    &format!(
                        "no {} session found for {}",
                        session_type.session_name(),
                        event.event_name
                    ),
                )
            })
    }

    pub(crate) async fn fetch_json(&self, url: &str) -> Result<Value, ApiError> {
        if let Some(body) = self.cache.get(url) {
            return Ok(serde_json::from_str(&body)?);
        }
        debug!("fetching {url}");
        let res = self.client.get(url).send().await?.error_for_status()?;
        let body = res.text().await?;
        self.cache.put(url, &body);
        Ok(serde_json::from_str(&body)?)
    }
}
