use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use mvr_repo::Repository;
use tower_http::trace::TraceLayer;

use crate::handler;

/// Build the axum router serving `repo`.
///
/// Every path below `/` is a repository path. Methods other than GET, HEAD
/// and PUT get 405.
pub fn build_router(repo: Repository, max_upload_size: usize) -> Router {
    Router::new()
        .route(
            "/*path",
            get(handler::get_file).put(handler::put_file),
        )
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(TraceLayer::new_for_http())
        .with_state(repo)
}
