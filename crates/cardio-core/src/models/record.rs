//! Test results, prescriptions and the analysis view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::validation::{require_level, require_non_empty, ValidationError, ValidationResult};

/// Request to record test results for an appointment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTestDetails {
    pub appointment_id: i64,
    /// Systolic blood pressure
    pub ap_hi: u32,
    /// Diastolic blood pressure
    pub ap_lo: u32,
    /// 1 = normal, 2 = above normal, 3 = well above normal
    pub cholesterol: u8,
    /// Same grading as cholesterol
    pub gluc: u8,
}

impl NewTestDetails {
    pub fn validate(&self) -> ValidationResult {
        require_level("cholesterol", self.cholesterol)?;
        require_level("gluc", self.gluc)?;
        Ok(())
    }
}

/// A stored test row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestDetails {
    pub test_id: i64,
    pub appointment_id: i64,
    pub ap_hi: u32,
    pub ap_lo: u32,
    pub cholesterol: u8,
    pub gluc: u8,
}

/// Request to prescribe medicine. The stored medicine name may differ from
/// `medicine_name`, see [`crate::risk`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPrescription {
    pub appointment_id: i64,
    pub prescribed_date: NaiveDate,
    pub medicine_name: String,
    /// Free-text instruction, e.g. "1x daily"
    pub dosage: String,
    pub duration_days: u32,
}

impl NewPrescription {
    pub fn validate(&self) -> ValidationResult {
        require_non_empty("medicine_name", &self.medicine_name)?;
        require_non_empty("dosage", &self.dosage)?;
        if self.duration_days == 0 {
            return Err(ValidationError::new("duration_days", "must be at least 1"));
        }
        Ok(())
    }
}

/// A stored prescription row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    pub prescription_id: i64,
    pub appointment_id: i64,
    pub prescribed_date: NaiveDate,
    pub medicine_name: String,
    pub dosage: String,
    pub duration_days: u32,
}

/// Test and prescription recorded against one appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppointmentRecords {
    pub test_details: Option<TestDetails>,
    pub prescription: Option<Prescription>,
}

/// One row of the patient × appointment × test join.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisRow {
    pub patient_id: i64,
    pub age: u32,
    pub ap_hi: u32,
    pub ap_lo: u32,
    pub cholesterol: u8,
    pub gluc: u8,
}
