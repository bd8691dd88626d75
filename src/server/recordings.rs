//! Read-only recording routes: listing, lookup, artifact download and
//! artifact metadata.

use std::path::Path as FsPath;
use std::time::SystemTime;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::io::BufReader;
use tokio_util::io::ReaderStream;
use tracing::{error, warn};

use crate::recording::Recording;

use super::state::GuardedCatalogueQuery;

const STREAM_BUFFER_SIZE: usize = 4096 * 16;

#[derive(Deserialize, Debug, Default)]
pub struct RecordingsQuery {
    pub query: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct FileInfo {
    pub size: u64,
    /// Not every filesystem records a creation time
    pub created: Option<String>,
    pub modified: Option<String>,
    pub path: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub(super) fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn lookup(catalogue: &GuardedCatalogueQuery, raw_id: &str) -> Result<Recording, Response> {
    let id: i64 = raw_id
        .parse()
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Invalid recording ID"))?;
    match catalogue.get(id) {
        Ok(Some(recording)) => Ok(recording),
        Ok(None) => Err(error_response(StatusCode::NOT_FOUND, "Recording not found")),
        Err(err) => {
            error!("Failed to load recording {}: {}", id, err);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch recording",
            ))
        }
    }
}

/// Maps the artifact extension to the type browsers expect.
pub fn content_type_for(path: &FsPath) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("mov") => "video/quicktime",
        Some("wmv") => "video/x-ms-wmv",
        Some("flv") => "video/x-flv",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

fn content_disposition(path: &FsPath) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "recording".to_string());
    let ascii_name: String = name
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_name,
        urlencoding::encode(&name)
    )
}

pub async fn list_recordings(
    State(catalogue): State<GuardedCatalogueQuery>,
    Query(params): Query<RecordingsQuery>,
) -> Response {
    match catalogue.browse(params.query.as_deref()) {
        Ok(recordings) => Json(recordings).into_response(),
        Err(err) => {
            error!("Failed to list recordings: {}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch recordings",
            )
        }
    }
}

pub async fn get_recording(
    State(catalogue): State<GuardedCatalogueQuery>,
    Path(id): Path<String>,
) -> Response {
    match lookup(&catalogue, &id) {
        Ok(recording) => Json(recording).into_response(),
        Err(response) => response,
    }
}

pub async fn download_recording(
    State(catalogue): State<GuardedCatalogueQuery>,
    Path(id): Path<String>,
) -> Response {
    let recording = match lookup(&catalogue, &id) {
        Ok(recording) => recording,
        Err(response) => return response,
    };
    let Some(path) = recording.file_path else {
        return error_response(StatusCode::NOT_FOUND, "File not available");
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(err) => {
            warn!("Cannot open artifact {:?} of recording {}: {}", path, id, err);
            return error_response(StatusCode::NOT_FOUND, "File not found on disk");
        }
    };
    let size = match file.metadata().await {
        Ok(metadata) => metadata.len(),
        Err(err) => {
            error!("Cannot stat artifact {:?}: {}", path, err);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read file");
        }
    };

    let reader = BufReader::with_capacity(STREAM_BUFFER_SIZE, file);
    let body = Body::from_stream(ReaderStream::with_capacity(reader, STREAM_BUFFER_SIZE));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&path))
        .header(header::CONTENT_DISPOSITION, content_disposition(&path))
        .header(header::CONTENT_LENGTH, size)
        .body(body)
        .unwrap_or_else(|err| {
            error!("Failed to build download response: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}

pub async fn file_info(
    State(catalogue): State<GuardedCatalogueQuery>,
    Path(id): Path<String>,
) -> Response {
    let recording = match lookup(&catalogue, &id) {
        Ok(recording) => recording,
        Err(response) => return response,
    };
    let Some(path) = recording.file_path else {
        return error_response(StatusCode::NOT_FOUND, "File not available");
    };

    match tokio::fs::metadata(&path).await {
        Ok(metadata) => Json(FileInfo {
            size: metadata.len(),
            created: metadata.created().ok().map(format_timestamp),
            modified: metadata.modified().ok().map(format_timestamp),
            path: path.to_string_lossy().to_string(),
        })
        .into_response(),
        Err(err) => {
            warn!("Cannot stat artifact {:?} of recording {}: {}", path, id, err);
            error_response(StatusCode::NOT_FOUND, "File not found on disk")
        }
    }
}
