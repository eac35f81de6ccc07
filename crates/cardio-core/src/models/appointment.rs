//! Doctor and appointment models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::validation::{require_non_empty, ValidationResult};

/// A pre-seeded doctor. Doctors are never created through the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub doctor_id: i64,
    pub name: String,
    pub specialization: String,
}

/// Request to book an appointment. The doctor is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAppointment {
    pub patient_id: i64,
    /// Free text, e.g. "Initial Consult", "Follow-up", "Test Review"
    pub appointment_type: String,
    pub appointment_date: NaiveDate,
}

impl NewAppointment {
    pub fn validate(&self) -> ValidationResult {
        require_non_empty("appointment_type", &self.appointment_type)
    }
}

/// A stored appointment row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub appointment_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_type: String,
}

/// Result of booking an appointment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentBooking {
    pub appointment_id: i64,
    pub assigned_doctor_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_iso_date() {
        let json = r#"{"patient_id": 12345678, "appointment_type": "Follow-up", "appointment_date": "2025-03-14"}"#;
        let appt: NewAppointment = serde_json::from_str(json).unwrap();
        assert_eq!(appt.appointment_date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert!(appt.validate().is_ok());
    }

    #[test]
    fn test_rejects_blank_type() {
        let appt = NewAppointment {
            patient_id: 12345678,
            appointment_type: String::new(),
            appointment_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        };
        assert_eq!(appt.validate().unwrap_err().field, "appointment_type");
    }
}
