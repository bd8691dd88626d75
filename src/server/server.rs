use anyhow::{Context, Result};
use std::time::{Duration, Instant, SystemTime};

use tower_http::services::ServeDir;
use tracing::info;

use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::recordings::{
    download_recording, file_info, format_timestamp, get_recording, list_recordings,
};
use super::{log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

#[derive(Serialize)]
struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    })
}

async fn health() -> impl IntoResponse {
    Json(HealthStatus {
        status: "ok",
        timestamp: format_timestamp(SystemTime::now()),
    })
}

pub fn make_app(config: ServerConfig, catalogue: GuardedCatalogueQuery, hash: String) -> Router {
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        catalogue,
        hash,
    };

    let recording_routes: Router = Router::new()
        .route("/health", get(health))
        .route("/recordings", get(list_recordings))
        .route("/recordings/{id}", get(get_recording))
        .route("/download/{id}", get(download_recording))
        .route("/file-info/{id}", get(file_info))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    home_router
        .merge(recording_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(
    config: ServerConfig,
    catalogue: GuardedCatalogueQuery,
    hash: String,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, catalogue, hash);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("HTTP server listening on port {}", port);

    Ok(axum::serve(listener, app).await?)
}
