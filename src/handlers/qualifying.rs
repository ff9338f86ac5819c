use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use http::StatusCode;
use serde::Deserialize;

use crate::models::error::ApiError;
use crate::models::event::FIRST_SUPPORTED_SEASON;
use crate::models::qualifying::{DriverInfo, QualiResult, QualifyingResponse};
use crate::provider::{QualiSession, SessionType};
use crate::utils::state::AppState;

#[derive(Deserialize)]
pub struct QualiQuery {
    pub y: Option<i32>,
    pub r: Option<u32>,
}

pub async fn get_qualifying(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QualiQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let year = params.y.unwrap_or(2022);
    let round = params.r.unwrap_or(1);

    if year < FIRST_SUPPORTED_SEASON {
        return Err(ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            &format!("season {year} predates the F1 timing API and has no data source here"),
        ));
    }

    let mut session = state
        .provider
        .get_session(year, round, SessionType::Qualifying)
        .await?;
    session.load(false).await?;

    let response = QualifyingResponse {
        event: session.event().clone(),
        results: build_results(&session),
    };
    Ok((StatusCode::OK, Json(response)))
}

/// One output row per classified driver, in classification order. Each
/// segment field holds the lap matching that segment's best time, or null
/// when the driver never set one (knocked out earlier) or no lap matches.
pub(crate) fn build_results(session: &QualiSession) -> Vec<QualiResult> {
    session
        .classification()
        .iter()
        .map(|row| {
            let driver = session
                .driver_info(row.driver_number)
                .cloned()
                .unwrap_or_else(|| DriverInfo::unknown(row.driver_number));
            QualiResult {
                driver,
                q1: session.find_lap(row.driver_number, row.q1).cloned(),
                q2: session.find_lap(row.driver_number, row.q2).cloned(),
                q3: session.find_lap(row.driver_number, row.q3).cloned(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    use crate::models::event::Event;
    use crate::models::qualifying::{Lap, SegmentTimes};

    fn event() -> Event {
        Event {
            season: 2023,
            round: 1,
            event_name: "Bahrain Grand Prix".to_string(),
            circuit_name: "Bahrain International Circuit".to_string(),
            locality: Some("Sakhir".to_string()),
            country: Some("Bahrain".to_string()),
            date: NaiveDate::from_ymd_opt(2023, 3, 4).unwrap(),
            start_time: None,
            f1_api_support: true,
        }
    }

    fn driver(number: i64, acronym: &str) -> DriverInfo {
        DriverInfo {
            name_acronym: Some(acronym.to_string()),
            ..DriverInfo::unknown(number)
        }
    }

    fn lap(driver_number: i64, lap_number: i64, duration_ms: Option<i64>) -> Lap {
        Lap {
            driver_number,
            lap_number,
            lap_duration: duration_ms.map(Duration::milliseconds),
            duration_sector_1: None,
            duration_sector_2: None,
            duration_sector_3: None,
            i1_speed: None,
            i2_speed: None,
            st_speed: None,
            is_pit_out_lap: false,
            date_start: None,
        }
    }

    fn segments(
        driver_number: i64,
        position: i64,
        q1: Option<i64>,
        q2: Option<i64>,
        q3: Option<i64>,
    ) -> SegmentTimes {
        SegmentTimes {
            driver_number,
            position: Some(position),
            q1: q1.map(Duration::milliseconds),
            q2: q2.map(Duration::milliseconds),
            q3: q3.map(Duration::milliseconds),
        }
    }

    #[test]
    fn one_result_per_classified_driver_in_order() {
        let session = QualiSession::for_tests(
            event(),
            vec![driver(1, "VER"), driver(16, "LEC")],
            vec![lap(1, 5, Some(90_000)), lap(16, 4, Some(90_500))],
            vec![
                segments(16, 2, Some(90_500), None, None),
                segments(1, 1, Some(90_000), None, None),
            ],
        );
        let results = build_results(&session);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].driver.driver_number, 1);
        assert_eq!(results[1].driver.driver_number, 16);
    }

    #[test]
    fn null_segment_time_gives_null_lap() {
        let session = QualiSession::for_tests(
            event(),
            vec![driver(2, "SAR")],
            vec![lap(2, 8, Some(91_200))],
            vec![segments(2, 16, Some(91_200), None, None)],
        );
        let results = build_results(&session);
        assert!(results[0].q1.is_some());
        assert!(results[0].q2.is_none());
        assert!(results[0].q3.is_none());
    }

    #[test]
    fn unmatched_segment_time_gives_null_lap() {
        // Classification says 89.9s but no lap in the table has it.
        let session = QualiSession::for_tests(
            event(),
            vec![driver(1, "VER")],
            vec![lap(1, 3, Some(90_000))],
            vec![segments(1, 1, Some(89_900), None, None)],
        );
        let results = build_results(&session);
        assert!(results[0].q1.is_none());
    }

    #[test]
    fn first_matching_lap_wins_on_duplicates() {
        let session = QualiSession::for_tests(
            event(),
            vec![driver(1, "VER")],
            vec![lap(1, 3, Some(90_000)), lap(1, 9, Some(90_000))],
            vec![segments(1, 1, Some(90_000), None, None)],
        );
        let results = build_results(&session);
        assert_eq!(results[0].q1.as_ref().unwrap().lap_number, 3);
    }

    #[test]
    fn driver_missing_from_driver_table_gets_placeholder_info() {
        let session = QualiSession::for_tests(
            event(),
            vec![],
            vec![],
            vec![segments(44, 7, None, None, None)],
        );
        let results = build_results(&session);
        assert_eq!(results[0].driver.driver_number, 44);
        assert!(results[0].driver.full_name.is_none());
    }

    #[test]
    fn segment_laps_only_match_the_drivers_own_laps() {
        // Two drivers with identical lap times; each must get their own lap.
        let session = QualiSession::for_tests(
            event(),
            vec![driver(1, "VER"), driver(11, "PER")],
            vec![lap(11, 6, Some(90_000)), lap(1, 5, Some(90_000))],
            vec![
                segments(1, 1, Some(90_000), None, None),
                segments(11, 2, Some(90_000), None, None),
            ],
        );
        let results = build_results(&session);
        assert_eq!(results[0].q1.as_ref().unwrap().driver_number, 1);
        assert_eq!(results[1].q1.as_ref().unwrap().driver_number, 11);
    }
}
