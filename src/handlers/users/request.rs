//! User request DTOs

use serde::Deserialize;
use validator::Validate;

/// Direct point grant request
#[derive(Debug, Deserialize, Validate)]
pub struct GrantPointsRequest {
    pub points: i64,

    #[validate(length(min = 1))]
    pub reason: String,
}

/// Leaderboard query parameters
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}
