//! Season settings, state machine, and report models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{Level, User};

/// Season settings singleton (one record per deployment)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SeasonSettings {
    pub current_season: String,
    pub season_start_date: DateTime<Utc>,
    pub season_end_date: DateTime<Utc>,
    pub is_active: bool,
    pub is_finished: bool,
}

impl SeasonSettings {
    /// Current state in the Inactive/Active/Finished machine.
    ///
    /// Invariant: `is_finished` implies `is_active == false`, so Finished
    /// wins whenever both flags would disagree.
    pub fn state(&self) -> SeasonState {
        if self.is_finished {
            SeasonState::Finished
        } else if self.is_active {
            SeasonState::Active
        } else {
            SeasonState::Inactive
        }
    }

    /// Whether new submissions are accepted right now
    pub fn accepts_submissions(&self) -> bool {
        self.state() == SeasonState::Active
    }
}

/// Season lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonState {
    Inactive,
    Active,
    Finished,
}

impl std::fmt::Display for SeasonState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inactive => write!(f, "inactive"),
            Self::Active => write!(f, "active"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Aggregate season counters used by the finish report
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SeasonTotals {
    /// Users with points on the board (administrator excluded)
    pub participant_count: i64,
    pub problem_count: i64,
    pub total_points: i64,
}

/// Report produced when a season is finished
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonReport {
    pub season: String,
    pub finished_at: DateTime<Utc>,
    pub participant_count: i64,
    pub problem_count: i64,
    pub total_points: i64,
    pub winners: Vec<SeasonWinner>,
}

/// A ranked season winner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonWinner {
    pub rank: usize,
    pub user_id: Uuid,
    pub full_name: String,
    pub total_points: i64,
    pub total_problems: i64,
    pub level: Level,
}

impl SeasonWinner {
    /// Build a ranked winner entry from a leaderboard row
    pub fn from_user(rank: usize, user: &User) -> Self {
        Self {
            rank,
            user_id: user.id,
            full_name: user.full_name.clone(),
            total_points: user.total_points,
            total_problems: user.total_problems,
            level: user.level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(is_active: bool, is_finished: bool) -> SeasonSettings {
        SeasonSettings {
            current_season: "Season 1".to_string(),
            season_start_date: Utc::now(),
            season_end_date: Utc::now() + chrono::Duration::days(30),
            is_active,
            is_finished,
        }
    }

    #[test]
    fn test_state_machine_flags() {
        assert_eq!(settings(true, false).state(), SeasonState::Active);
        assert_eq!(settings(false, false).state(), SeasonState::Inactive);
        assert_eq!(settings(false, true).state(), SeasonState::Finished);
        // Finished wins even if flags disagree
        assert_eq!(settings(true, true).state(), SeasonState::Finished);
    }

    #[test]
    fn test_only_active_accepts_submissions() {
        assert!(settings(true, false).accepts_submissions());
        assert!(!settings(false, false).accepts_submissions());
        assert!(!settings(false, true).accepts_submissions());
    }
}
