//! Season request DTOs

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

/// Season configuration request
#[derive(Debug, Deserialize, Validate)]
pub struct ConfigureSeasonRequest {
    #[validate(length(min = 1))]
    pub season_name: String,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    /// Whether the season should accept submissions right away
    pub is_active: Option<bool>,
}
