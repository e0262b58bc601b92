pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use config::Config;
pub use error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_state_clones_share_connection() {
        let state = AppState {
            db: Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection()),
            config: Config {
                database_url: "postgres://unused".to_string(),
                jwt_secret: "secret".to_string(),
                jwt_expiration_hours: 1,
                server_host: "127.0.0.1".to_string(),
                server_port: 0,
                cors_allowed_origins: Vec::new(),
                admin_email: "admin@taxirank.local".to_string(),
                admin_password: "admin123".to_string(),
            },
        };

        let copy = state.clone();
        assert!(Arc::ptr_eq(&state.db, &copy.db));
    }
}
