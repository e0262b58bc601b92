//! Thin axum adapters: pull the state, claims and payload out of the request,
//! call the matching service, wrap the result in `Json`.

pub mod auth;
pub mod dashboard;
pub mod messages;
pub mod profiles;
pub mod rentals;
pub mod roadside;
pub mod routes;
pub mod schedules;
pub mod taxi_ranks;
pub mod tenants;
pub mod tenders;
pub mod tracking_devices;
pub mod trips;
pub mod users;
pub mod vehicles;

use axum::{extract::State, Json};
use sea_orm::ConnectionTrait;
use serde_json::{json, Value};

use crate::AppState;

/// Liveness plus a database ping
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = match state.db.execute_unprepared("SELECT 1").await {
        Ok(_) => "up",
        Err(e) => {
            tracing::error!("Health check database ping failed: {:?}", e);
            "down"
        }
    };

    Json(json!({
        "status": "ok",
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(crate) fn deleted(what: &str) -> Json<Value> {
    Json(json!({ "message": format!("{} deleted", what) }))
}
