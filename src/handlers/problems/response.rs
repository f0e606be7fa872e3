//! Problem response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Category, Problem, ProblemStatus};

/// Problem response
#[derive(Debug, Serialize)]
pub struct ProblemResponse {
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
    pub created_at: DateTime<Utc>,
}

impl From<Problem> for ProblemResponse {
    fn from(problem: Problem) -> Self {
        Self {
            id: problem.id,
            title: problem.title,
            description: problem.description,
            category: problem.category,
            images: problem.images,
            author_id: problem.author_id,
            points: problem.points,
            status: problem.status,
            reviewed: problem.reviewed,
            reviewed_at: problem.reviewed_at,
            created_at: problem.created_at,
        }
    }
}

/// Problem list response
#[derive(Debug, Serialize)]
pub struct ProblemsListResponse {
    pub problems: Vec<ProblemResponse>,
    pub total: usize,
}
