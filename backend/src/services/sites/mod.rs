//! # Site Service Module
//!
//! Persistence for edited sites, under `/api/sites`.
//!
//! ## Sub-modules:
//! - `save`: stores a working document and answers with its handle.
//! - `get`: returns a stored document in the shape the editor mounts.
//! - `export`: returns a stored document without edit markers, as a download.
//! - `store`: the SQLite table behind all of the above.

mod export;
mod get;
mod save;
mod store;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

/// The base path for all site-related API endpoints.
const API_PATH: &str = "/api/sites";

/// Configures and returns the Actix `Scope` for all site-related routes.
///
/// # Registered Routes:
///
/// *   **`POST /save`**: body `SaveSiteRequest`; `200` with `SaveSiteResponse`.
/// *   **`GET /export/{file_path}`**: stored document, markers stripped, as an
///     HTML attachment.
/// *   **`GET /{file_path}`**: stored document as `GeneratedSite`.
///
/// Handles contain slashes, so the path segment is a tail match. Failures
/// answer `503 Service Unavailable` with a text reason.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/save", post().to(save::process))
        .route("/export/{file_path:.*}", get().to(export::process))
        .route("/{file_path:.*}", get().to(get::process))
}
