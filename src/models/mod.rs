//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod ledger;
pub mod problem;
pub mod season;
pub mod user;

pub use ledger::*;
pub use problem::*;
pub use season::*;
pub use user::*;
