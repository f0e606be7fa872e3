//! Problem model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Problem database model
///
/// `points` starts at the submission base and only ever grows through
/// additive admin bonuses. `reviewed` is an admin "seen" marker independent
/// of `status`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Problem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub images: Vec<String>,
    pub author_id: Uuid,
    pub points: i64,
    pub status: ProblemStatus,
    pub reviewed: bool,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Problem categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "problem_category", rename_all = "lowercase")]
pub enum Category {
    Safety,
    Facility,
    Cleanliness,
    Equipment,
    Other,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safety => write!(f, "safety"),
            Self::Facility => write!(f, "facility"),
            Self::Cleanliness => write!(f, "cleanliness"),
            Self::Equipment => write!(f, "equipment"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Problem moderation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "problem_status", rename_all = "lowercase")]
pub enum ProblemStatus {
    Pending,
    Resolved,
}

impl std::fmt::Display for ProblemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}
