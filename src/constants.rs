//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// POINTS & LEVELS
// =============================================================================

/// Points granted to the author for every accepted submission
pub const BASE_SUBMISSION_POINTS: i64 = 1;

/// Minimum admin bonus per grant
pub const MIN_BONUS_POINTS: i64 = 1;

/// Maximum admin bonus per grant
pub const MAX_BONUS_POINTS: i64 = 10;

/// Points required for the fighter level
pub const FIGHTER_THRESHOLD: i64 = 5;

/// Points required for the master level
pub const MASTER_THRESHOLD: i64 = 10;

/// Ledger reason strings
pub mod reasons {
    /// Base point for a new problem submission
    pub const SUBMISSION: &str = "problem_submission";

    /// Admin-granted bonus on a problem
    pub const ADMIN_BONUS: &str = "admin_bonus";
}

// =============================================================================
// SEASON DEFAULTS
// =============================================================================

/// Season name used when no settings record exists yet
pub const DEFAULT_SEASON_NAME: &str = "Season 1";

/// Default season length in days
pub const DEFAULT_SEASON_LENGTH_DAYS: i64 = 90;

/// Number of ranked winners in a season report
pub const SEASON_WINNER_COUNT: usize = 3;

/// Default number of entries returned by the leaderboard
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Maximum number of entries the leaderboard will return
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

// =============================================================================
// SUBMISSION LIMITS
// =============================================================================

/// Maximum problem title length
pub const MAX_PROBLEM_TITLE_LENGTH: u64 = 256;

/// Maximum problem description length
pub const MAX_PROBLEM_DESCRIPTION_LENGTH: u64 = 65535;

/// Maximum number of image references per submission
pub const MAX_PROBLEM_IMAGES: usize = 5;

// =============================================================================
// AUTHENTICATION DEFAULTS
// =============================================================================

/// Default identity token leeway in seconds
pub const DEFAULT_TOKEN_LEEWAY_SECONDS: u64 = 30;

// =============================================================================
// MIRROR SYNC
// =============================================================================

/// Seconds between replay attempts for queued mirror events
pub const MIRROR_REPLAY_INTERVAL_SECONDS: u64 = 30;

// =============================================================================
// API VERSIONING
// =============================================================================

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";
