//! Medicine substitution rule for prescriptions.
//!
//! A patient is at risk when systolic pressure is above 140 or cholesterol
//! is graded well above normal (level 3). At-risk patients get the medicine the
//! clinician asked for; everyone else gets [`DEFAULT_MEDICINE`] and the
//! requested name is discarded.

use crate::models::TestDetails;

/// Substituted for the requested medicine when the patient is not at risk.
pub const DEFAULT_MEDICINE: &str = "Multivitamins";

/// Systolic pressure must exceed this value to count as at risk.
pub const SYSTOLIC_THRESHOLD: u32 = 140;

/// Cholesterol level must exceed this value to count as at risk.
pub const CHOLESTEROL_THRESHOLD: u8 = 2;

/// Both comparisons are strict.
pub fn is_at_risk(ap_hi: u32, cholesterol: u8) -> bool {
    ap_hi > SYSTOLIC_THRESHOLD || cholesterol > CHOLESTEROL_THRESHOLD
}

/// Pick the medicine name to store for a prescription.
pub fn resolve_medicine<'a>(requested: &'a str, test: &TestDetails) -> &'a str {
    if is_at_risk(test.ap_hi, test.cholesterol) {
        requested
    } else {
        DEFAULT_MEDICINE
    }
}
