use axum::extract::{Path, State};
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use mvr_repo::{PutOutcome, Repository};

use crate::error::ServerResult;

/// Set on a PUT response when the upload published a version.
pub const COMMITTED_HEADER: HeaderName = HeaderName::from_static("x-mvr-committed");

/// Content type served for a repository file.
pub fn content_type(path: &str) -> &'static str {
    let ext = path.rsplit('/').next().and_then(|f| f.rsplit_once('.')).map(|(_, e)| e);
    match ext {
        Some("xml" | "pom") => "text/xml",
        Some("md5" | "sha1" | "sha256" | "sha512") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// GET and HEAD. The body is dropped for HEAD.
pub async fn get_file(
    State(repo): State<Repository>,
    Path(path): Path<String>,
) -> ServerResult<Response> {
    let bytes = repo.get(&path).await?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type(&path))),
            (header::CONTENT_LENGTH, HeaderValue::from(bytes.len())),
        ],
        bytes,
    )
        .into_response())
}

pub async fn put_file(
    State(repo): State<Repository>,
    Path(path): Path<String>,
    body: Bytes,
) -> ServerResult<Response> {
    let outcome = repo.put(&path, body).await?;
    tracing::debug!(path = %path, outcome = ?outcome, "upload handled");
    let mut response = StatusCode::CREATED.into_response();
    if let PutOutcome::Committed { version } = &outcome {
        if let Ok(value) = HeaderValue::from_str(version) {
            response.headers_mut().insert(COMMITTED_HEADER, value);
        }
    }
    Ok(response)
}
