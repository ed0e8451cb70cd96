/*
 *  Tromo - Discord bot for tracking per-day help counts reported by staff.
 *  Copyright (C) 2026  Tromo contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use crate::errors::{AppResult, ErrorEntry, ErrorLog};
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/**
 * Shared state of the observability HTTP server.
 */
#[derive(Clone)]
pub struct HttpState {
    pub errors: Arc<ErrorLog>,
    pub started: Instant,
}

async fn root() -> &'static str {
    "Tromo đang chạy. ✅"
}

async fn health(State(state): State<HttpState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started.elapsed().as_secs(),
        "errors": state.errors.len(),
    }))
}

async fn recent_errors(State(state): State<HttpState>) -> Json<Vec<ErrorEntry>> {
    Json(state.errors.recent(crate::errors::DEFAULT_ERROR_CAPACITY))
}

/**
 * Builds the router: liveness, health, recent errors, and static serving of
 * the export/backup directories.
 */
pub fn build_router(state: HttpState, export_dir: PathBuf, backup_dir: PathBuf) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/errors", get(recent_errors))
        .nest_service("/exports", ServeDir::new(export_dir))
        .nest_service("/backups", ServeDir::new(backup_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/**
 * Binds the server and runs it until the process exits.
 */
pub async fn serve(
    port: u16,
    state: HttpState,
    export_dir: PathBuf,
    backup_dir: PathBuf,
) -> AppResult<()> {
    let app = build_router(state, export_dir, backup_dir);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "HTTP server listening.");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> HttpState {
        HttpState {
            errors: Arc::new(ErrorLog::default()),
            started: Instant::now(),
        }
    }

    #[tokio::test]
    async fn health_reports_status_and_error_count() {
        let state = test_state();
        state.errors.push("test", "boom");

        let Json(body) = health(State(state)).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["errors"], 1);
        assert!(body["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn errors_endpoint_returns_recent_entries() {
        let state = test_state();
        state.errors.push("job", "failed hard");

        let Json(entries) = recent_errors(State(state)).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].context, "job");
    }
}
