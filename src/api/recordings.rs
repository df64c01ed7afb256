use std::io;
use std::path::Path;

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::fs;
use tracing::warn;

use crate::errors::ApiError;
use crate::server::AppState;

const RECORDING_EXTENSIONS: [&str; 3] = ["mjr", "webm", "mp4"];

// -----------------------------------------------------------------------------
// ----- Recording -------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recording {
    pub filename: String,
    pub size: u64,
    pub created: Option<DateTime<Utc>>,
    pub modified: DateTime<Utc>,
}

// -----------------------------------------------------------------------------
// ----- Handlers --------------------------------------------------------------

pub async fn list_recordings(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let recordings = scan(&state.api.recordings_dir).await.map_err(|e| {
        warn!(dir = %state.api.recordings_dir.display(), error = %e, "recording scan failed");
        ApiError::Internal("could not read recordings directory".into())
    })?;

    Ok(Json(json!({
        "success": true,
        "count": recordings.len(),
        "recordings": recordings,
    })))
}

// -----------------------------------------------------------------------------
// ----- Scan ------------------------------------------------------------------

/// Recording files in `dir`, newest first. A missing directory is just an
/// empty list.
pub async fn scan(dir: &Path) -> io::Result<Vec<Recording>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut recordings = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let filename = entry.file_name().to_string_lossy().into_owned();
        if !is_recording(&filename) {
            continue;
        }

        let meta = entry.metadata().await?;
        if !meta.is_file() {
            continue;
        }

        recordings.push(Recording {
            filename,
            size: meta.len(),
            created: meta.created().ok().map(DateTime::<Utc>::from),
            modified: DateTime::<Utc>::from(meta.modified()?),
        });
    }

    recordings.sort_by(|a, b| b.modified.cmp(&a.modified));
    Ok(recordings)
}

fn is_recording(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| RECORDING_EXTENSIONS.contains(&ext))
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
