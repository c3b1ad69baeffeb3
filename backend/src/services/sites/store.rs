//! SQLite storage for saved sites.
//!
//! One row per handle in the `sites` table. The handle is opaque to the
//! editor; new ones are allocated as `sites/<uuid>.html`.

use common::model::site::GeneratedSite;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const SITES_DIR: &str = "sites";

/// Opens the database at `path`, creating the schema on first use.
pub fn open_database(path: &Path) -> Result<Connection, String> {
    let conn = Connection::open(path).map_err(|e| e.to_string())?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sites (
            file_path TEXT PRIMARY KEY,
            html_content TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| e.to_string())?;
    Ok(conn)
}

pub fn allocate_file_path() -> String {
    format!("{}/{}.html", SITES_DIR, Uuid::new_v4())
}

pub fn upsert_site(conn: &Connection, file_path: &str, html_content: &str) -> Result<(), String> {
    conn.execute(
        "INSERT INTO sites (file_path, html_content, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(file_path) DO UPDATE SET
            html_content = excluded.html_content,
            updated_at = excluded.updated_at",
        params![file_path, html_content, unix_now()],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

pub fn find_site(conn: &Connection, file_path: &str) -> Result<Option<GeneratedSite>, String> {
    conn.query_row(
        "SELECT file_path, html_content FROM sites WHERE file_path = ?1",
        params![file_path],
        |row| {
            Ok(GeneratedSite {
                file_path: row.get(0)?,
                html_content: row.get(1)?,
            })
        },
    )
    .optional()
    .map_err(|e| e.to_string())
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}
