//! Archive upload endpoints.
//!
//! Both routes take a `multipart/form-data` body with the zip in an
//! `archive` field. `/api/v1/count` additionally reads one or more
//! `extensions` fields; each value may hold several extensions separated by
//! commas or whitespace. A request without an `archive` field is treated as
//! an empty upload.
//!
//! Pipeline work is blocking filesystem I/O, so it runs on the blocking pool.

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::Json;
use locstat::{count_archive_with_config, scan_archive_with_config, CountResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const ARCHIVE_FIELD: &str = "archive";
pub const EXTENSIONS_FIELD: &str = "extensions";

/// Response for `POST /api/v1/scan`
#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResponse {
    pub extensions: Vec<String>,
}

/// Parsed multipart upload.
#[derive(Debug, Default)]
pub struct Upload {
    pub archive: Bytes,
    pub extensions: Vec<String>,
}

/// Drain the multipart stream into an [`Upload`].
///
/// Unknown fields are skipped. A repeated `archive` field keeps the last one.
pub async fn read_upload(mut multipart: Multipart) -> ServerResult<Upload> {
    let mut upload = Upload::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            ARCHIVE_FIELD => upload.archive = field.bytes().await?,
            EXTENSIONS_FIELD | "extensions[]" => {
                let text = field.text().await?;
                upload.extensions.extend(split_extensions(&text));
            }
            _ => tracing::debug!(field = %name, "ignoring unknown multipart field"),
        }
    }

    Ok(upload)
}

/// Split a form value like `".rs, .py  md"` into its parts.
pub fn split_extensions(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
}

fn accept_multipart(multipart: Result<Multipart, MultipartRejection>) -> ServerResult<Multipart> {
    multipart.map_err(ServerError::from)
}

/// List the text file extensions contained in the uploaded archive.
///
/// # Response
///
/// ```json
/// { "extensions": [".md", ".py", ".rs"] }
/// ```
pub async fn scan(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServerResult<Json<ScanResponse>> {
    let upload = read_upload(accept_multipart(multipart)?).await?;
    let pipeline = state.pipeline.clone();

    let extensions = tokio::task::spawn_blocking(move || {
        scan_archive_with_config(&upload.archive, &pipeline)
    })
    .await??;

    tracing::info!(extensions = extensions.len(), "scan_request_complete");
    Ok(Json(ScanResponse { extensions }))
}

/// Count lines for the selected extensions in the uploaded archive.
///
/// # Response
///
/// ```json
/// {
///   "total_files": 2,
///   "total_lines": 130,
///   "line_counts_by_ext": { ".rs": 120, ".py": 10 },
///   "file_counts_by_ext": { ".py": 1, ".rs": 1 },
///   "top_files": [{ "path": "src/lib.rs", "lines": 120 }, { "path": "tool.py", "lines": 10 }]
/// }
/// ```
pub async fn count(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServerResult<Json<CountResult>> {
    let upload = read_upload(accept_multipart(multipart)?).await?;
    let pipeline = state.pipeline.clone();

    let result = tokio::task::spawn_blocking(move || {
        count_archive_with_config(&upload.archive, &upload.extensions, &pipeline)
    })
    .await??;

    tracing::info!(
        total_files = result.total_files,
        total_lines = result.total_lines,
        "count_request_complete"
    );
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_extensions() {
        let parts: Vec<String> = split_extensions(".rs, .py  md\t,,").collect();
        assert_eq!(parts, vec![".rs", ".py", "md"]);
        assert_eq!(split_extensions(" , ").count(), 0);
    }
}
