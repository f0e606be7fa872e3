//! User model and leveling policy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::constants::{FIGHTER_THRESHOLD, MASTER_THRESHOLD};

/// User database model
///
/// `total_points` and `level` are a materialized view over the points ledger;
/// the ledger remains the source of truth and `recompute` repairs any drift.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub total_points: i64,
    pub total_problems: i64,
    pub level: Level,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Check if user holds the administrator role
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// User level tiers, a pure function of accumulated points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_level", rename_all = "lowercase")]
pub enum Level {
    Novice,
    Fighter,
    Master,
}

impl Level {
    /// Leveling policy: map accumulated points to a level tier.
    ///
    /// Total over all non-negative inputs; reapplied on every total change.
    pub fn for_points(points: i64) -> Self {
        if points >= MASTER_THRESHOLD {
            Self::Master
        } else if points >= FIGHTER_THRESHOLD {
            Self::Fighter
        } else {
            Self::Novice
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Novice => write!(f, "novice"),
            Self::Fighter => write!(f, "fighter"),
            Self::Master => write!(f, "master"),
        }
    }
}

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Member => write!(f, "member"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(Level::for_points(0), Level::Novice);
        assert_eq!(Level::for_points(4), Level::Novice);
        assert_eq!(Level::for_points(5), Level::Fighter);
        assert_eq!(Level::for_points(9), Level::Fighter);
        assert_eq!(Level::for_points(10), Level::Master);
        assert_eq!(Level::for_points(1000), Level::Master);
    }
}
