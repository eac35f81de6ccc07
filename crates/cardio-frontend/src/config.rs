//! Front-end configuration and the login roster.
//!
//! Settings come from an optional TOML file, overridden by `CARDIO_UI_*`
//! environment variables. Accounts live in a separate JSON file:
//!
//! ```json
//! {"users": [{"username": "admin", "password": "...", "role": "admin"}]}
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::FrontendError;

pub const DEFAULT_CONFIG_FILE: &str = "cardio-ui";

/// Role string granting access to the analysis page.
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Base URL of the clinical data API
    pub base_url: String,
    pub users_path: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            users_path: PathBuf::from("users_config.json"),
            request_timeout_secs: 10,
        }
    }
}

impl UiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn load_ui_config(path: Option<&Path>) -> Result<UiConfig, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix("CARDIO_UI"))
        .build()?
        .try_deserialize()
}

/// A configured login.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserAccount {
    pub username: String,
    pub password: String,
    pub role: String,
}

impl UserAccount {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

#[derive(Deserialize)]
struct UsersFile {
    users: Vec<UserAccount>,
}

pub fn parse_users(json: &str) -> Result<Vec<UserAccount>, FrontendError> {
    let file: UsersFile = serde_json::from_str(json)?;
    Ok(file.users)
}

pub fn load_users(path: &Path) -> Result<Vec<UserAccount>, FrontendError> {
    let json = std::fs::read_to_string(path).map_err(|source| FrontendError::UsersFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_users(&json)
}
