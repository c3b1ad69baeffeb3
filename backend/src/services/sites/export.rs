//! `GET /api/sites/export/{file_path}`: the stored document without edit
//! markers, served as an HTML attachment.

use crate::config::ServerConfig;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};
use common::editor::strip_edit_markers;

use super::get::get_site;

const FALLBACK_FILE_NAME: &str = "sitio.html";

pub async fn process(config: web::Data<ServerConfig>, file_path: web::Path<String>) -> impl Responder {
    match get_site(&config.database, &file_path).await {
        Ok(site) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(file_name(&site.file_path))],
            })
            .body(strip_edit_markers(&site.html_content)),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error al exportar el sitio: {}", e)),
    }
}

fn file_name(file_path: &str) -> String {
    match file_path.rsplit('/').next() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => FALLBACK_FILE_NAME.to_string(),
    }
}
