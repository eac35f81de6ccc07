//! Cardio Clinic Core Library
//!
//! Create-only record store for a cardiovascular clinic intake workflow.
//!
//! # Record lifecycle
//!
//! ```text
//! Patient ──► Lifestyle
//!    │
//!    └──► Appointment (doctor drawn at random)
//!              │
//!              ├──► Test details
//!              │        │
//!              │        ▼ risk rule
//!              └──► Prescription
//! ```
//!
//! Every created record gets a random 8-digit identifier. Candidates are
//! rejection-sampled against the owning table and resampled again if the
//! insert loses a race on the unique key.
//!
//! Relationships between tables are advisory: nothing checks that a
//! referenced patient or appointment exists, and rows are never updated or
//! deleted.
//!
//! # Modules
//!
//! - [`db`]: SQLite store, identifier allocation, table browsing
//! - [`models`]: Records, creation requests and their validation
//! - [`risk`]: Medicine substitution rule for prescriptions

pub mod db;
pub mod models;
pub mod risk;

// Re-export commonly used types
pub use db::{ClinicTable, Database, DbError, DbResult, RawRow, UnknownTable};
pub use models::{
    AnalysisRow, Appointment, AppointmentBooking, AppointmentRecords, Doctor, Lifestyle,
    NewAppointment, NewPatient, NewPrescription, NewTestDetails, Patient, PatientInfo,
    Prescription, TestDetails, ValidationError,
};
