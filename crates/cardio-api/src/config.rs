//! API server configuration.
//!
//! Read from an optional TOML file, then overridden by `CARDIO_API_*`
//! environment variables (e.g. `CARDIO_API_PORT=9000`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use cardio_core::Doctor;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "cardio-api";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub busy_timeout_ms: u64,
    /// Doctors inserted at startup if missing.
    pub doctors: Vec<Doctor>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            database_path: PathBuf::from("healthcare.db"),
            busy_timeout_ms: 5000,
            doctors: default_doctors(),
        }
    }
}

impl ApiConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

fn default_doctors() -> Vec<Doctor> {
    vec![
        Doctor {
            doctor_id: 101,
            name: "Dr. Anita Sharma".to_string(),
            specialization: "Cardiology".to_string(),
        },
        Doctor {
            doctor_id: 102,
            name: "Dr. Marcus Hale".to_string(),
            specialization: "Internal Medicine".to_string(),
        },
        Doctor {
            doctor_id: 103,
            name: "Dr. Yuki Tanaka".to_string(),
            specialization: "Endocrinology".to_string(),
        },
    ]
}

/// Load configuration. An explicit `path` must exist; the default file is optional.
pub fn load_api_config(path: Option<&Path>) -> Result<ApiConfig, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix("CARDIO_API"))
        .build()?
        .try_deserialize()
}
