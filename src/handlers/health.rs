//! Liveness endpoint
//!
//! Reports the package version and which persistence backend is serving the
//! deployment, so an operator can tell a memory-backed instance from a
//! Postgres-backed one at a glance.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::{config::StoreBackend, state::AppState};

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store_backend: &'static str,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_backend = match state.config().store.backend {
        StoreBackend::Memory => "memory",
        StoreBackend::Postgres => "postgres",
    };

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        store_backend,
    })
}

/// Health routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::{
        AdminConfig, AuthConfig, Config, MirrorConfig, SeasonConfig, ServerConfig, StoreConfig,
    };
    use crate::constants::{
        DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_SEASON_LENGTH_DAYS, DEFAULT_SEASON_NAME,
        DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_TOKEN_LEEWAY_SECONDS,
    };
    use crate::mirror::MirrorHandle;
    use crate::store::{MemoryStore, SeasonDefaults};

    fn memory_state() -> AppState {
        let config = Config {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                rust_log: "info".to_string(),
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                database_url: None,
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            },
            auth: AuthConfig {
                jwt_secret: "secret".to_string(),
                leeway_seconds: DEFAULT_TOKEN_LEEWAY_SECONDS,
            },
            admin: AdminConfig {
                email: "admin@example.com".to_string(),
            },
            season: SeasonConfig {
                default_name: DEFAULT_SEASON_NAME.to_string(),
                default_length_days: DEFAULT_SEASON_LENGTH_DAYS,
                default_active: true,
            },
            mirror: MirrorConfig { url: None },
        };
        let defaults = SeasonDefaults::from_config(&config.season);
        AppState::new(
            Arc::new(MemoryStore::new(defaults)),
            MirrorHandle::disabled(),
            config,
        )
    }

    #[tokio::test]
    async fn test_health_reports_backend_and_version() {
        let Json(body) = health_check(State(memory_state())).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.store_backend, "memory");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }
}
