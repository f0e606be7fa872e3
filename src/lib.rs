//! Snagboard - Gamified Issue Reporting Platform
//!
//! This library provides the core functionality for Snagboard, a season-based
//! issue-reporting platform where submitted problems earn points, levels
//! reward consistent reporters, and each season ends with a ranked report.
//!
//! # Features
//!
//! - Problem submissions with automatic base-point awards
//! - Append-only points ledger with admin bonuses and repair
//! - Novice/Fighter/Master leveling derived from total points
//! - Season lifecycle: activate, pause, finish with report, reset
//! - Interchangeable in-memory and Postgres persistence backends
//! - Best-effort spreadsheet mirror with local replay
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Business logic
//! - **Store**: Persistence behind the `DataStore` trait
//! - **Models**: Domain models and DTOs

pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod mirror;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
