//! User response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{LedgerSource, Level, PointsLedgerEntry, Role, User};

/// User profile response
#[derive(Debug, Serialize)]
pub struct UserResponse {
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

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            total_points: user.total_points,
            total_problems: user.total_problems,
            level: user.level,
            role: user.role,
            joined_at: user.joined_at,
            last_active: user.last_active,
        }
    }
}

/// User list response
#[derive(Debug, Serialize)]
pub struct UsersListResponse {
    pub users: Vec<UserResponse>,
    pub total: usize,
}

/// One leaderboard row
#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: Uuid,
    pub full_name: String,
    pub total_points: i64,
    pub total_problems: i64,
    pub level: Level,
}

impl LeaderboardEntry {
    pub fn from_user(rank: usize, user: User) -> Self {
        Self {
            rank,
            user_id: user.id,
            full_name: user.full_name,
            total_points: user.total_points,
            total_problems: user.total_problems,
            level: user.level,
        }
    }
}

/// Leaderboard response
#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
}

/// One ledger row
#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    pub id: Uuid,
    pub points: i64,
    pub reason: String,
    pub source: LedgerSource,
    pub problem_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<PointsLedgerEntry> for LedgerEntryResponse {
    fn from(entry: PointsLedgerEntry) -> Self {
        Self {
            id: entry.id,
            points: entry.points,
            reason: entry.reason,
            source: entry.source,
            problem_id: entry.problem_id,
            created_at: entry.created_at,
        }
    }
}

/// Ledger history response
#[derive(Debug, Serialize)]
pub struct LedgerResponse {
    pub entries: Vec<LedgerEntryResponse>,
    pub total_points: i64,
}
