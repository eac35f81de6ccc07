//! Clinic intake front-end.
//!
//! Drives the intake flow against the clinical data API:
//!
//! ```text
//! Login ──► Home ──┬──► Personal ─► Lifestyle ─► Appointment ─► Test ─► Prescription
//!                  ├──► Existing patient lookup
//!                  └──► Analyze (admin only)
//! ```
//!
//! - [`client`]: [`ClinicApi`] trait and its HTTP implementation
//! - [`config`]: Settings and the login roster
//! - [`forms`]: Typed form inputs for each step
//! - [`session`]: Page and carried identifiers
//! - [`wizard`]: The step machine

use std::path::PathBuf;

use thiserror::Error;

pub mod client;
pub mod config;
pub mod forms;
pub mod session;
pub mod wizard;

pub use client::{ClientError, ClientResult, ClinicApi, HttpClinicApi};
pub use crate::config::{load_ui_config, load_users, UiConfig, UserAccount};
pub use session::{Page, Session};
pub use wizard::{HomeChoice, Wizard};

#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Please log in first")]
    NotLoggedIn,

    #[error("Only administrators can open the analysis page")]
    NotPermitted,

    #[error("Cannot do that from '{current}', expected '{expected}'")]
    WrongPage { expected: Page, current: Page },

    #[error("No {0} in the current session")]
    MissingPrerequisite(&'static str),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Failed to read users file {}: {source}", path.display())]
    UsersFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid users file: {0}")]
    UsersFormat(#[from] serde_json::Error),
}
