//! Business logic services

pub mod admin_gate;
pub mod points_service;
pub mod problem_service;
pub mod season_service;
pub mod sync_service;
pub mod user_service;

pub use admin_gate::AdminGate;
pub use points_service::PointsService;
pub use problem_service::ProblemService;
pub use season_service::SeasonService;
pub use sync_service::SyncService;
pub use user_service::UserService;
