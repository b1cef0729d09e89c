use axum::{extract::State, http::StatusCode, Json};
use diesel::prelude::*;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::db::DbPool;

/// Handler for the health check endpoint
///
/// This function handles GET requests to `/health`. It probes the database
/// with a trivial query and reports 200 when reachable, 503 otherwise.
#[instrument(skip(pool))]
pub async fn health_handler(State(pool): State<Arc<DbPool>>) -> (StatusCode, Json<serde_json::Value>) {
    debug!("Health check");

    let probe = pool
        .get()
        .map_err(anyhow::Error::from)
        .and_then(|mut conn| {
            diesel::sql_query("SELECT 1")
                .execute(&mut conn)
                .map_err(anyhow::Error::from)
        });

    match probe {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "healthy",
                "database": "connected",
                "version": env!("CARGO_PKG_VERSION"),
            })),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "unhealthy",
                "database": "disconnected",
                "error": err.to_string(),
            })),
        ),
    }
}
