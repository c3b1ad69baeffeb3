//! `POST /api/sites/save`: stores the working document under its handle.

use crate::config::ServerConfig;
use actix_web::{web, HttpResponse, Responder};
use common::requests::{SaveSiteRequest, SaveSiteResponse};
use log::{info, warn};
use std::path::Path;

use super::store::{allocate_file_path, open_database, upsert_site};

pub async fn process(
    config: web::Data<ServerConfig>,
    payload: web::Json<SaveSiteRequest>,
) -> impl Responder {
    match save_site(&config.database, &payload).await {
        Ok(response) => {
            info!("site saved as {}", response.file_path);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            warn!("site save failed: {}", e);
            HttpResponse::ServiceUnavailable().body(format!("Error al guardar el sitio: {}", e))
        }
    }
}

/// Persists `request` and returns the handle it was stored under. An empty
/// handle gets a freshly allocated one.
pub async fn save_site(database: &Path, request: &SaveSiteRequest) -> Result<SaveSiteResponse, String> {
    if request.html_content.trim().is_empty() {
        return Err("El contenido del sitio no puede estar vacío".to_string());
    }

    let file_path = match request.file_path.trim() {
        "" => allocate_file_path(),
        handle => handle.to_string(),
    };

    let conn = open_database(database)?;
    upsert_site(&conn, &file_path, &request.html_content)?;

    Ok(SaveSiteResponse { file_path })
}
