//! Points ledger model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single point-granting event.
///
/// Entries are append-only: never mutated or deleted individually, bulk-cleared
/// only on season reset. The sum of a user's entries equals that user's
/// `total_points` at all times.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PointsLedgerEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub problem_id: Option<Uuid>,
    pub points: i64,
    pub reason: String,
    pub source: LedgerSource,
    pub admin_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Origin of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "ledger_source", rename_all = "snake_case")]
pub enum LedgerSource {
    Submission,
    AdminBonus,
}

impl std::fmt::Display for LedgerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submission => write!(f, "submission"),
            Self::AdminBonus => write!(f, "admin_bonus"),
        }
    }
}
