//! Server configuration read from the environment.
//!
//! | Variable                   | Default          |
//! |----------------------------|------------------|
//! | `SITE_EDITOR_HOST`         | `127.0.0.1`      |
//! | `SITE_EDITOR_PORT`         | `8080`           |
//! | `SITE_EDITOR_DB`           | `sitegen.sqlite` |
//! | `SITE_EDITOR_OPEN_BROWSER` | `true`           |

use log::warn;
use std::env;
use std::path::PathBuf;

/// Largest accepted JSON body. Generated pages with inline assets get big.
pub const JSON_LIMIT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file holding the saved sites.
    pub database: PathBuf,
    /// Open the editor in the default browser once the server is up.
    pub open_browser: bool,
    pub json_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: PathBuf::from("sitegen.sqlite"),
            open_browser: true,
            json_limit: JSON_LIMIT_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(host) = lookup("SITE_EDITOR_HOST").filter(|host| !host.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = lookup("SITE_EDITOR_PORT") {
            match port.trim().parse() {
                Ok(port) => config.port = port,
                Err(_) => warn!("ignoring invalid SITE_EDITOR_PORT {:?}", port),
            }
        }
        if let Some(database) = lookup("SITE_EDITOR_DB").filter(|path| !path.trim().is_empty()) {
            config.database = PathBuf::from(database.trim());
        }
        if let Some(flag) = lookup("SITE_EDITOR_OPEN_BROWSER") {
            config.open_browser = !matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }

        config
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]);
        assert_eq!(config.url(), "http://127.0.0.1:8080");
        assert_eq!(config.database, PathBuf::from("sitegen.sqlite"));
        assert!(config.open_browser);
        assert_eq!(config.json_limit, JSON_LIMIT_BYTES);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = config_from(&[
            ("SITE_EDITOR_HOST", "0.0.0.0"),
            ("SITE_EDITOR_PORT", "9000"),
            ("SITE_EDITOR_DB", "/tmp/sites.sqlite"),
            ("SITE_EDITOR_OPEN_BROWSER", "false"),
        ]);
        assert_eq!(config.url(), "http://0.0.0.0:9000");
        assert_eq!(config.database, PathBuf::from("/tmp/sites.sqlite"));
        assert!(!config.open_browser);
    }

    #[test]
    fn invalid_port_keeps_default() {
        let config = config_from(&[("SITE_EDITOR_PORT", "eighty")]);
        assert_eq!(config.port, 8080);
    }
}
