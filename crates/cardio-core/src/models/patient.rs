//! Patient and lifestyle models.

use serde::{Deserialize, Serialize};

use super::validation::{require_flag, require_non_empty, require_positive, ValidationError, ValidationResult};

/// Gender codes as stored in `patient_details.gender`.
pub const GENDER_MALE: u8 = 1;
pub const GENDER_FEMALE: u8 = 2;

/// Request to register a new patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    /// 1 = male, 2 = female
    pub gender: u8,
    /// Height in cm
    pub height: f64,
    /// Weight in kg
    pub weight: f64,
}

impl NewPatient {
    pub fn validate(&self) -> ValidationResult {
        require_non_empty("name", &self.name)?;
        if self.gender != GENDER_MALE && self.gender != GENDER_FEMALE {
            return Err(ValidationError::new(
                "gender",
                format!("expected 1 or 2, got {}", self.gender),
            ));
        }
        require_positive("height", self.height)?;
        require_positive("weight", self.weight)?;
        Ok(())
    }
}

/// A stored patient row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Random 8-digit identifier
    pub patient_id: i64,
    pub name: String,
    pub age: u32,
    pub gender: u8,
    pub height: f64,
    pub weight: f64,
}

impl Patient {
    pub fn is_male(&self) -> bool {
        self.gender == GENDER_MALE
    }
}

/// Lifestyle answers for a patient. Each flag is 0 or 1.
///
/// Keyed by the patient identifier only; the patient is not required to
/// exist and more than one row per patient may be stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lifestyle {
    pub patient_id: i64,
    pub smoke: u8,
    pub alco: u8,
    pub active: u8,
}

impl Lifestyle {
    pub fn validate(&self) -> ValidationResult {
        require_flag("smoke", self.smoke)?;
        require_flag("alco", self.alco)?;
        require_flag("active", self.active)?;
        Ok(())
    }

    pub fn smokes(&self) -> bool {
        self.smoke == 1
    }

    pub fn drinks(&self) -> bool {
        self.alco == 1
    }

    pub fn is_active(&self) -> bool {
        self.active == 1
    }
}

/// Patient lookup result. Both halves are absent for an unknown identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PatientInfo {
    pub patient: Option<Patient>,
    pub lifestyle: Option<Lifestyle>,
}
