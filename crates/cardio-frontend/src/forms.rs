//! Form inputs for each intake step and their request encodings.

use std::fmt;
use std::str::FromStr;

use cardio_core::models::{GENDER_FEMALE, GENDER_MALE};
use cardio_core::{Lifestyle, NewAppointment, NewPatient, NewPrescription, NewTestDetails};
use chrono::NaiveDate;

/// Parse failure for a choice field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{input}' is not a valid {field}")]
pub struct ChoiceError {
    pub field: &'static str,
    pub input: String,
}

fn choice_error(field: &'static str, input: &str) -> ChoiceError {
    ChoiceError {
        field,
        input: input.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn code(self) -> u8 {
        match self {
            Gender::Male => GENDER_MALE,
            Gender::Female => GENDER_FEMALE,
        }
    }
}

impl FromStr for Gender {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" | "1" => Ok(Gender::Male),
            "female" | "f" | "2" => Ok(Gender::Female),
            _ => Err(choice_error("gender", s)),
        }
    }
}

/// Yes/No answer, sent as 1/0.
pub fn yes_no(answer: bool) -> u8 {
    u8::from(answer)
}

pub fn parse_yes_no(s: &str) -> Result<bool, ChoiceError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "1" => Ok(true),
        "no" | "n" | "0" => Ok(false),
        _ => Err(choice_error("yes/no answer", s)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentKind {
    InitialConsult,
    FollowUp,
    TestReview,
}

impl AppointmentKind {
    pub const ALL: [AppointmentKind; 3] = [
        AppointmentKind::InitialConsult,
        AppointmentKind::FollowUp,
        AppointmentKind::TestReview,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AppointmentKind::InitialConsult => "Initial Consult",
            AppointmentKind::FollowUp => "Follow-up",
            AppointmentKind::TestReview => "Test Review",
        }
    }
}

impl fmt::Display for AppointmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AppointmentKind {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if let Ok(n) = wanted.parse::<usize>() {
            if let Some(kind) = n.checked_sub(1).and_then(|i| Self::ALL.get(i)) {
                return Ok(*kind);
            }
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| choice_error("appointment type", s))
    }
}

/// Cholesterol and glucose grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Normal,
    AboveNormal,
    WellAboveNormal,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Normal, Level::AboveNormal, Level::WellAboveNormal];

    pub fn code(self) -> u8 {
        match self {
            Level::Normal => 1,
            Level::AboveNormal => 2,
            Level::WellAboveNormal => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Normal => "Normal",
            Level::AboveNormal => "Above Normal",
            Level::WellAboveNormal => "Well Above Normal",
        }
    }
}

impl FromStr for Level {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| {
                level.label().eq_ignore_ascii_case(wanted) || level.code().to_string() == wanted
            })
            .ok_or_else(|| choice_error("level", s))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonalForm {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    /// Centimetres
    pub height: f64,
    /// Kilograms
    pub weight: f64,
}

impl PersonalForm {
    pub fn to_request(&self) -> NewPatient {
        NewPatient {
            name: self.name.trim().to_string(),
            age: self.age,
            gender: self.gender.code(),
            height: self.height,
            weight: self.weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifestyleForm {
    pub smoke: bool,
    pub alco: bool,
    pub active: bool,
}

impl LifestyleForm {
    pub fn to_request(self, patient_id: i64) -> Lifestyle {
        Lifestyle {
            patient_id,
            smoke: yes_no(self.smoke),
            alco: yes_no(self.alco),
            active: yes_no(self.active),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppointmentForm {
    pub kind: AppointmentKind,
    pub date: NaiveDate,
}

impl AppointmentForm {
    pub fn to_request(self, patient_id: i64) -> NewAppointment {
        NewAppointment {
            patient_id,
            appointment_type: self.kind.label().to_string(),
            appointment_date: self.date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestForm {
    pub ap_hi: u32,
    pub ap_lo: u32,
    pub cholesterol: Level,
    pub glucose: Level,
}

impl TestForm {
    pub fn to_request(self, appointment_id: i64) -> NewTestDetails {
        NewTestDetails {
            appointment_id,
            ap_hi: self.ap_hi,
            ap_lo: self.ap_lo,
            cholesterol: self.cholesterol.code(),
            gluc: self.glucose.code(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrescriptionForm {
    pub medicine_name: String,
    pub dosage: String,
    pub duration_days: u32,
    pub prescribed_date: NaiveDate,
}

impl PrescriptionForm {
    pub fn to_request(&self, appointment_id: i64) -> NewPrescription {
        NewPrescription {
            appointment_id,
            prescribed_date: self.prescribed_date,
            medicine_name: self.medicine_name.trim().to_string(),
            dosage: self.dosage.trim().to_string(),
            duration_days: self.duration_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_parsing() {
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("m".parse::<Gender>().unwrap().code(), 1);
        assert!("other".parse::<Gender>().is_err());

        assert!(parse_yes_no("Yes").unwrap());
        assert!(!parse_yes_no("0").unwrap());
        assert!(parse_yes_no("maybe").is_err());

        assert_eq!("follow-up".parse::<AppointmentKind>().unwrap(), AppointmentKind::FollowUp);
        assert_eq!("3".parse::<AppointmentKind>().unwrap(), AppointmentKind::TestReview);
        assert!("0".parse::<AppointmentKind>().is_err());

        assert_eq!("well above normal".parse::<Level>().unwrap().code(), 3);
        assert_eq!("2".parse::<Level>().unwrap(), Level::AboveNormal);
        assert!("4".parse::<Level>().is_err());
    }

    #[test]
    fn test_requests_carry_session_ids() {
        let lifestyle = LifestyleForm {
            smoke: true,
            alco: false,
            active: true,
        }
        .to_request(12345678);
        assert_eq!((lifestyle.smoke, lifestyle.alco, lifestyle.active), (1, 0, 1));
        assert_eq!(lifestyle.patient_id, 12345678);

        let test = TestForm {
            ap_hi: 150,
            ap_lo: 95,
            cholesterol: Level::WellAboveNormal,
            glucose: Level::Normal,
        }
        .to_request(87654321);
        assert_eq!(test.appointment_id, 87654321);
        assert_eq!((test.cholesterol, test.gluc), (3, 1));

        let appt = AppointmentForm {
            kind: AppointmentKind::InitialConsult,
            date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
        }
        .to_request(12345678);
        assert_eq!(appt.appointment_type, "Initial Consult");
        assert!(appt.validate().is_ok());
    }
}
