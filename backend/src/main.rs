mod config;
mod services;

use crate::config::ServerConfig;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{info, warn};
use mime_guess::from_path;
use std::thread;
use std::time::Duration;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static/dist");

async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => match STATIC_DIR.get_file("index.html") {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = ServerConfig::from_env();
    let url = config.url();

    if STATIC_DIR.get_file("index.html").is_none() {
        warn!("frontend bundle not embedded, only the API is available");
    }

    if config.open_browser {
        let url = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            if let Err(err) = webbrowser::open(&url) {
                warn!("could not open browser: {}", err);
            }
        });
    }

    info!("Server running at {} (database {})", url, config.database.display());

    let bind = (config.host.clone(), config.port);
    let json_limit = config.json_limit;
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(config.clone())
            .service(services::sites::configure_routes())
            .default_service(web::route().to(serve_embedded))
    })
    .bind(bind)?
    .run()
    .await
}
