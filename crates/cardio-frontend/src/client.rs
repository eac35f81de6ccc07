//! HTTP client for the clinical data API.

use std::time::Duration;

use async_trait::async_trait;
use cardio_core::models::{ErrorBody, PatientCreated, PrescriptionCreated, StatusMessage, TestCreated};
use cardio_core::{
    AnalysisRow, Appointment, AppointmentBooking, AppointmentRecords, ClinicTable, Doctor,
    Lifestyle, NewAppointment, NewPatient, NewPrescription, NewTestDetails, PatientInfo, RawRow,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Client errors.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status; `detail` is the server's message.
    #[error("{detail}")]
    Api { status: u16, detail: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Operations offered by the clinical data API.
#[async_trait]
pub trait ClinicApi: Send + Sync {
    async fn create_patient(&self, patient: &NewPatient) -> ClientResult<i64>;
    async fn add_lifestyle(&self, lifestyle: &Lifestyle) -> ClientResult<()>;
    async fn list_doctors(&self) -> ClientResult<Vec<Doctor>>;
    async fn create_appointment(&self, appt: &NewAppointment) -> ClientResult<AppointmentBooking>;
    async fn add_test(&self, test: &NewTestDetails) -> ClientResult<i64>;
    async fn prescribe(&self, presc: &NewPrescription) -> ClientResult<i64>;
    async fn patient_info(&self, patient_id: i64) -> ClientResult<PatientInfo>;
    async fn appointments(&self, patient_id: i64) -> ClientResult<Vec<Appointment>>;
    async fn records(&self, appointment_id: i64) -> ClientResult<AppointmentRecords>;
    async fn fetch_table(&self, table: ClinicTable) -> ClientResult<Vec<RawRow>>;
    async fn analysis(&self) -> ClientResult<Vec<AnalysisRow>>;
}

/// [`ClinicApi`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpClinicApi {
    client: Client,
    base_url: String,
}

impl HttpClinicApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let resp = self.client.get(self.url(path)).send().await?;
        decode(resp).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> ClientResult<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    // Prefer the server's {"detail": ...}; fall back to the raw body
    let text = resp.text().await?;
    let detail = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.detail)
        .unwrap_or(text);
    Err(ClientError::Api {
        status: status.as_u16(),
        detail,
    })
}

#[async_trait]
impl ClinicApi for HttpClinicApi {
    async fn create_patient(&self, patient: &NewPatient) -> ClientResult<i64> {
        let created: PatientCreated = self.post_json("/patients/new", patient).await?;
        Ok(created.patient_id)
    }

    async fn add_lifestyle(&self, lifestyle: &Lifestyle) -> ClientResult<()> {
        let _: StatusMessage = self.post_json("/patients/lifestyle", lifestyle).await?;
        Ok(())
    }

    async fn list_doctors(&self) -> ClientResult<Vec<Doctor>> {
        self.get_json("/doctors").await
    }

    async fn create_appointment(&self, appt: &NewAppointment) -> ClientResult<AppointmentBooking> {
        self.post_json("/appointments", appt).await
    }

    async fn add_test(&self, test: &NewTestDetails) -> ClientResult<i64> {
        let created: TestCreated = self.post_json("/tests", test).await?;
        Ok(created.test_id)
    }

    async fn prescribe(&self, presc: &NewPrescription) -> ClientResult<i64> {
        let created: PrescriptionCreated = self.post_json("/prescriptions", presc).await?;
        Ok(created.prescription_id)
    }

    async fn patient_info(&self, patient_id: i64) -> ClientResult<PatientInfo> {
        self.get_json(&format!("/patients/{}", patient_id)).await
    }

    async fn appointments(&self, patient_id: i64) -> ClientResult<Vec<Appointment>> {
        self.get_json(&format!("/appointments/{}", patient_id)).await
    }

    async fn records(&self, appointment_id: i64) -> ClientResult<AppointmentRecords> {
        self.get_json(&format!("/records/{}", appointment_id)).await
    }

    async fn fetch_table(&self, table: ClinicTable) -> ClientResult<Vec<RawRow>> {
        self.get_json(&format!("/fetch/{}", table)).await
    }

    async fn analysis(&self) -> ClientResult<Vec<AnalysisRow>> {
        self.get_json("/get_analysis").await
    }
}
