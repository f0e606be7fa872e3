//! Season response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Level, SeasonReport, SeasonSettings, SeasonState, SeasonWinner};

/// Season state response
#[derive(Debug, Serialize)]
pub struct SeasonResponse {
    pub current_season: String,
    pub season_start_date: DateTime<Utc>,
    pub season_end_date: DateTime<Utc>,
    pub state: SeasonState,
    pub accepts_submissions: bool,
}

impl From<SeasonSettings> for SeasonResponse {
    fn from(settings: SeasonSettings) -> Self {
        Self {
            state: settings.state(),
            accepts_submissions: settings.accepts_submissions(),
            current_season: settings.current_season,
            season_start_date: settings.season_start_date,
            season_end_date: settings.season_end_date,
        }
    }
}

/// One podium row in the season report
#[derive(Debug, Serialize)]
pub struct WinnerResponse {
    pub rank: usize,
    pub user_id: Uuid,
    pub full_name: String,
    pub total_points: i64,
    pub level: Level,
}

impl From<SeasonWinner> for WinnerResponse {
    fn from(winner: SeasonWinner) -> Self {
        Self {
            rank: winner.rank,
            user_id: winner.user_id,
            full_name: winner.full_name,
            total_points: winner.total_points,
            level: winner.level,
        }
    }
}

/// Season report response
#[derive(Debug, Serialize)]
pub struct SeasonReportResponse {
    pub season: String,
    pub finished_at: DateTime<Utc>,
    pub participant_count: i64,
    pub problem_count: i64,
    pub total_points: i64,
    pub winners: Vec<WinnerResponse>,
}

impl From<SeasonReport> for SeasonReportResponse {
    fn from(report: SeasonReport) -> Self {
        Self {
            season: report.season,
            finished_at: report.finished_at,
            participant_count: report.participant_count,
            problem_count: report.problem_count,
            total_points: report.total_points,
            winners: report.winners.into_iter().map(WinnerResponse::from).collect(),
        }
    }
}
