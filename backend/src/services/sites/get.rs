//! `GET /api/sites/{file_path}`: the stored document as a `GeneratedSite`,
//! the same shape the generation step hands to the editor.

use crate::config::ServerConfig;
use actix_web::{web, HttpResponse, Responder};
use common::model::site::GeneratedSite;
use std::path::Path;

use super::store::{find_site, open_database};

pub async fn process(config: web::Data<ServerConfig>, file_path: web::Path<String>) -> impl Responder {
    match get_site(&config.database, &file_path).await {
        Ok(site) => HttpResponse::Ok().json(site),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error al obtener el sitio: {}", e)),
    }
}

pub async fn get_site(database: &Path, file_path: &str) -> Result<GeneratedSite, String> {
    let conn = open_database(database)?;
    find_site(&conn, file_path)?.ok_or_else(|| format!("Sitio no encontrado: {}", file_path))
}
