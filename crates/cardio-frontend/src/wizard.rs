//! The intake step machine.
//!
//! A [`Wizard`] owns the [`Session`] and a [`ClinicApi`]. Each submit
//! checks that the session is on the matching page, calls the API, and
//! advances only on success. Failures leave the page unchanged and keep
//! the error message in [`Session::last_error`].

use cardio_core::{
    AnalysisRow, Appointment, AppointmentBooking, AppointmentRecords, ClinicTable, PatientInfo,
    RawRow, TestDetails,
};
use tracing::{debug, info, warn};

use crate::client::ClinicApi;
use crate::config::UserAccount;
use crate::forms::{AppointmentForm, LifestyleForm, PersonalForm, PrescriptionForm, TestForm};
use crate::session::{Page, Session, SignedIn};
use crate::FrontendError;

/// Choices offered on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeChoice {
    NewPatient,
    ExistingPatient,
}

/// Context shown alongside the prescription form.
#[derive(Debug, Clone, PartialEq)]
pub struct PrescriptionContext {
    pub info: PatientInfo,
    pub test_details: Option<TestDetails>,
    pub analysis: Vec<AnalysisRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentHistory {
    pub appointment: Appointment,
    /// Records lookup failures are reported per appointment.
    pub records: Result<AppointmentRecords, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatientOverview {
    pub info: PatientInfo,
    pub appointments: Vec<AppointmentHistory>,
}

impl PatientOverview {
    pub fn found(&self) -> bool {
        self.info.patient.is_some()
    }
}

/// One table on the analysis page.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub table: ClinicTable,
    pub rows: Result<Vec<RawRow>, String>,
}

pub struct Wizard<A> {
    api: A,
    users: Vec<UserAccount>,
    session: Session,
}

impl<A: ClinicApi> Wizard<A> {
    pub fn new(api: A, users: Vec<UserAccount>) -> Self {
        Self {
            api,
            users,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn page(&self) -> Page {
        self.session.page
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn go(&mut self, to: Page) {
        debug!(from = %self.session.page, to = %to, "page transition");
        self.session.page = to;
        self.session.last_error = None;
    }

    fn fail<T>(&mut self, err: FrontendError) -> Result<T, FrontendError> {
        warn!(page = %self.session.page, error = %err, "action failed");
        self.session.last_error = Some(err.to_string());
        Err(err)
    }

    fn ensure_page(&mut self, expected: Page) -> Result<(), FrontendError> {
        if !self.session.is_logged_in() {
            return self.fail(FrontendError::NotLoggedIn);
        }
        if self.session.page != expected {
            let current = self.session.page;
            return self.fail(FrontendError::WrongPage { expected, current });
        }
        Ok(())
    }

    fn require_id(&mut self, id: Option<i64>, what: &'static str) -> Result<i64, FrontendError> {
        match id {
            Some(id) => Ok(id),
            None => self.fail(FrontendError::MissingPrerequisite(what)),
        }
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<(), FrontendError> {
        if self.session.page != Page::Login {
            let current = self.session.page;
            return self.fail(FrontendError::WrongPage {
                expected: Page::Login,
                current,
            });
        }

        let account = self
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .cloned();
        match account {
            Some(account) => {
                info!(username = %account.username, role = %account.role, "user logged in");
                self.session.user = Some(SignedIn {
                    username: account.username,
                    role: account.role,
                });
                self.go(Page::Home);
                Ok(())
            }
            None => {
                warn!(username, "login rejected");
                self.fail(FrontendError::InvalidCredentials)
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(user) = &self.session.user {
            info!(username = %user.username, "user logged out");
        }
        self.session = Session::default();
    }

    /// Return to the home page, dropping the intake in progress.
    pub fn go_home(&mut self) -> Result<(), FrontendError> {
        if !self.session.is_logged_in() {
            return self.fail(FrontendError::NotLoggedIn);
        }
        if self.session.page.is_intake_step() && self.session.prescription_id.is_none() {
            debug!(page = %self.session.page, patient_id = ?self.session.patient_id, "intake left unfinished");
        }
        self.session.clear_intake();
        self.go(Page::Home);
        Ok(())
    }

    pub fn choose(&mut self, choice: HomeChoice) -> Result<(), FrontendError> {
        self.ensure_page(Page::Home)?;
        match choice {
            HomeChoice::NewPatient => self.go(Page::NewPatientPersonal),
            HomeChoice::ExistingPatient => self.go(Page::ExistingPatient),
        }
        Ok(())
    }

    /// Open the analysis page. Admins only.
    pub fn open_analysis(&mut self) -> Result<(), FrontendError> {
        self.ensure_page(Page::Home)?;
        let is_admin = self
            .session
            .user
            .as_ref()
            .is_some_and(|user| user.role == crate::config::ADMIN_ROLE);
        if !is_admin {
            return self.fail(FrontendError::NotPermitted);
        }
        self.go(Page::Analyze);
        Ok(())
    }

    pub async fn submit_personal(&mut self, form: &PersonalForm) -> Result<i64, FrontendError> {
        self.ensure_page(Page::NewPatientPersonal)?;
        match self.api.create_patient(&form.to_request()).await {
            Ok(patient_id) => {
                self.session.clear_intake();
                self.session.patient_id = Some(patient_id);
                self.go(Page::NewPatientLifestyle);
                Ok(patient_id)
            }
            Err(e) => self.fail(e.into()),
        }
    }

    pub async fn submit_lifestyle(&mut self, form: LifestyleForm) -> Result<(), FrontendError> {
        self.ensure_page(Page::NewPatientLifestyle)?;
        let patient_id = self.require_id(self.session.patient_id, "patient")?;
        match self.api.add_lifestyle(&form.to_request(patient_id)).await {
            Ok(()) => {
                self.go(Page::NewPatientAppointment);
                Ok(())
            }
            Err(e) => self.fail(e.into()),
        }
    }

    pub async fn submit_appointment(
        &mut self,
        form: AppointmentForm,
    ) -> Result<AppointmentBooking, FrontendError> {
        self.ensure_page(Page::NewPatientAppointment)?;
        let patient_id = self.require_id(self.session.patient_id, "patient")?;
        match self.api.create_appointment(&form.to_request(patient_id)).await {
            Ok(booking) => {
                self.session.appointment_id = Some(booking.appointment_id);
                self.go(Page::NewPatientTest);
                Ok(booking)
            }
            Err(e) => self.fail(e.into()),
        }
    }

    pub async fn submit_test(&mut self, form: TestForm) -> Result<i64, FrontendError> {
        self.ensure_page(Page::NewPatientTest)?;
        let appointment_id = self.require_id(self.session.appointment_id, "appointment")?;
        match self.api.add_test(&form.to_request(appointment_id)).await {
            Ok(test_id) => {
                self.session.test_id = Some(test_id);
                self.go(Page::NewPatientPrescription);
                Ok(test_id)
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Patient snapshot and analysis rows for the prescription page.
    pub async fn prescription_context(&mut self) -> Result<PrescriptionContext, FrontendError> {
        self.ensure_page(Page::NewPatientPrescription)?;
        let patient_id = self.require_id(self.session.patient_id, "patient")?;
        let appointment_id = self.require_id(self.session.appointment_id, "appointment")?;

        let loaded = async {
            let info = self.api.patient_info(patient_id).await?;
            let records = self.api.records(appointment_id).await?;
            let analysis = self.api.analysis().await?;
            Ok::<_, crate::ClientError>(PrescriptionContext {
                info,
                test_details: records.test_details,
                analysis,
            })
        }
        .await;
        loaded.or_else(|e| self.fail(e.into()))
    }

    /// Prescribe for the current appointment. Stays on the prescription page.
    pub async fn submit_prescription(
        &mut self,
        form: &PrescriptionForm,
    ) -> Result<i64, FrontendError> {
        self.ensure_page(Page::NewPatientPrescription)?;
        let appointment_id = self.require_id(self.session.appointment_id, "appointment")?;
        match self.api.prescribe(&form.to_request(appointment_id)).await {
            Ok(prescription_id) => {
                info!(prescription_id, appointment_id, "prescription submitted");
                self.session.prescription_id = Some(prescription_id);
                self.session.last_error = None;
                Ok(prescription_id)
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Load a patient, their appointments and each appointment's records.
    pub async fn lookup_patient(&mut self, patient_id: i64) -> Result<PatientOverview, FrontendError> {
        self.ensure_page(Page::ExistingPatient)?;

        let loaded = async {
            let info = self.api.patient_info(patient_id).await?;
            let appointments = self.api.appointments(patient_id).await?;
            Ok::<_, crate::ClientError>((info, appointments))
        }
        .await;
        let (info, appointments) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => return self.fail(e.into()),
        };

        let mut history = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            let records = self
                .api
                .records(appointment.appointment_id)
                .await
                .map_err(|e| e.to_string());
            history.push(AppointmentHistory {
                appointment,
                records,
            });
        }

        self.session.last_error = None;
        Ok(PatientOverview {
            info,
            appointments: history,
        })
    }

    /// Fetch every table for the analysis page.
    pub async fn browse_tables(&mut self) -> Result<Vec<TableView>, FrontendError> {
        self.ensure_page(Page::Analyze)?;

        let mut views = Vec::with_capacity(ClinicTable::ALL.len());
        for table in ClinicTable::ALL {
            let rows = self.api.fetch_table(table).await.map_err(|e| {
                warn!(table = %table, error = %e, "table fetch failed");
                e.to_string()
            });
            views.push(TableView { table, rows });
        }
        Ok(views)
    }
}
