//! Problem request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::{MAX_PROBLEM_DESCRIPTION_LENGTH, MAX_PROBLEM_TITLE_LENGTH};
use crate::models::{Category, ProblemStatus};

/// Create problem request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProblemRequest {
    #[validate(length(min = 1, max = MAX_PROBLEM_TITLE_LENGTH))]
    pub title: String,

    #[validate(length(min = 1, max = MAX_PROBLEM_DESCRIPTION_LENGTH))]
    pub description: String,

    pub category: Category,

    /// Attached image references
    pub images: Option<Vec<String>>,
}

/// Bonus points request
#[derive(Debug, Deserialize)]
pub struct AddBonusRequest {
    pub bonus_points: i64,
}

/// Moderation status change request
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: ProblemStatus,
}
