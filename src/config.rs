// src/config.rs

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    /// Primary store connection string. When unset (or the database is
    /// unreachable at startup) the service runs on the JSON file store.
    pub database_url: Option<String>,

    /// Directory holding the flat-file records (enrollments, activity,
    /// categories, and the fallback simulation store).
    pub data_dir: PathBuf,

    /// Origins allowed by the CORS layer.
    pub allowed_origins: Vec<String>,

    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec!["http://localhost:5173".to_string()]);

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            data_dir,
            allowed_origins,
            port,
            rust_log,
        }
    }
}
