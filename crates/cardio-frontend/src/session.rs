//! Per-user session state for the intake flow.

use std::fmt;

/// Pages of the intake flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Login,
    Home,
    NewPatientPersonal,
    NewPatientLifestyle,
    NewPatientAppointment,
    NewPatientTest,
    NewPatientPrescription,
    ExistingPatient,
    Analyze,
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Page::Login => "Login",
            Page::Home => "Home",
            Page::NewPatientPersonal => "Step 1: Personal Details",
            Page::NewPatientLifestyle => "Step 2: Lifestyle Information",
            Page::NewPatientAppointment => "Step 3: Book Appointment",
            Page::NewPatientTest => "Step 4: Enter Test Details",
            Page::NewPatientPrescription => "Step 5: Prescription",
            Page::ExistingPatient => "Existing Patient Lookup",
            Page::Analyze => "Patient Records Analysis",
        }
    }

    /// True for the five new-patient steps.
    pub fn is_intake_step(self) -> bool {
        matches!(
            self,
            Page::NewPatientPersonal
                | Page::NewPatientLifestyle
                | Page::NewPatientAppointment
                | Page::NewPatientTest
                | Page::NewPatientPrescription
        )
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub username: String,
    pub role: String,
}

/// Everything the flow remembers between steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub page: Page,
    pub user: Option<SignedIn>,
    pub patient_id: Option<i64>,
    pub appointment_id: Option<i64>,
    pub test_id: Option<i64>,
    pub prescription_id: Option<i64>,
    /// Message from the last failed action, cleared on the next success.
    pub last_error: Option<String>,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Forget the identifiers of the intake in progress.
    pub fn clear_intake(&mut self) {
        self.patient_id = None;
        self.appointment_id = None;
        self.test_id = None;
        self.prescription_id = None;
    }
}
