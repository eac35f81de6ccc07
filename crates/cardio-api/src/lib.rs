//! Clinical Data API.
//!
//! Stateless axum handlers over [`cardio_core::Database`]. Each request
//! opens its own SQLite connection on the blocking pool, runs its
//! statements and drops the connection on every exit path.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Json, Router};
use cardio_core::models::{PatientCreated, PrescriptionCreated, StatusMessage, TestCreated};
use cardio_core::{
    AnalysisRow, Appointment, AppointmentBooking, AppointmentRecords, ClinicTable, Database,
    DbResult, Doctor, Lifestyle, NewAppointment, NewPatient, NewPrescription, NewTestDetails,
    PatientInfo, RawRow,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod config;
pub mod error;

pub use crate::config::{load_api_config, ApiConfig};
pub use error::ApiError;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Shared state: where the database lives and how long to wait on locks.
#[derive(Clone)]
pub struct AppState {
    db_path: Arc<PathBuf>,
    busy_timeout: Duration,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
            busy_timeout,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.database_path.clone(), config.busy_timeout())
    }

    /// Run `op` against a fresh connection on the blocking pool.
    async fn with_db<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> DbResult<T> + Send + 'static,
    {
        let path = Arc::clone(&self.db_path);
        let busy_timeout = self.busy_timeout;
        let result = tokio::task::spawn_blocking(move || {
            let db = Database::connect(path.as_path(), busy_timeout)?;
            op(&db)
        })
        .await?;
        Ok(result?)
    }
}

/// Create the schema and seed configured doctors.
pub fn prepare_database(config: &ApiConfig) -> DbResult<()> {
    let db = Database::open(&config.database_path, config.busy_timeout())?;
    let added = db.seed_doctors(&config.doctors)?;
    info!(path = %config.database_path.display(), doctors_added = added, "database ready");
    Ok(())
}

async fn create_patient_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewPatient>, JsonRejection>,
) -> ApiResult<PatientCreated> {
    let Json(patient) = payload?;
    patient.validate()?;
    let patient_id = state.with_db(move |db| db.create_patient(&patient)).await?;
    Ok(Json(PatientCreated { patient_id }))
}

async fn create_lifestyle_handler(
    State(state): State<AppState>,
    payload: Result<Json<Lifestyle>, JsonRejection>,
) -> ApiResult<StatusMessage> {
    let Json(lifestyle) = payload?;
    lifestyle.validate()?;
    state.with_db(move |db| db.insert_lifestyle(&lifestyle)).await?;
    Ok(Json(StatusMessage {
        message: "Lifestyle data added successfully".to_string(),
    }))
}

async fn list_doctors_handler(State(state): State<AppState>) -> ApiResult<Vec<Doctor>> {
    let doctors = state.with_db(|db| db.list_doctors()).await?;
    Ok(Json(doctors))
}

async fn create_appointment_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewAppointment>, JsonRejection>,
) -> ApiResult<AppointmentBooking> {
    let Json(appt) = payload?;
    appt.validate()?;
    let booking = state.with_db(move |db| db.create_appointment(&appt)).await?;
    Ok(Json(booking))
}

async fn add_test_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewTestDetails>, JsonRejection>,
) -> ApiResult<TestCreated> {
    let Json(test) = payload?;
    test.validate()?;
    let test_id = state.with_db(move |db| db.add_test_details(&test)).await?;
    Ok(Json(TestCreated { test_id }))
}

async fn prescribe_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewPrescription>, JsonRejection>,
) -> ApiResult<PrescriptionCreated> {
    let Json(presc) = payload?;
    presc.validate()?;
    let prescription_id = state.with_db(move |db| db.prescribe_medicine(&presc)).await?;
    Ok(Json(PrescriptionCreated { prescription_id }))
}

async fn patient_info_handler(
    State(state): State<AppState>,
    patient_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<PatientInfo> {
    let Path(patient_id) = patient_id?;
    let info = state.with_db(move |db| db.patient_info(patient_id)).await?;
    Ok(Json(info))
}

async fn appointments_handler(
    State(state): State<AppState>,
    patient_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Vec<Appointment>> {
    let Path(patient_id) = patient_id?;
    let appointments = state
        .with_db(move |db| db.appointments_for_patient(patient_id))
        .await?;
    Ok(Json(appointments))
}

async fn records_handler(
    State(state): State<AppState>,
    appointment_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<AppointmentRecords> {
    let Path(appointment_id) = appointment_id?;
    let records = state
        .with_db(move |db| db.appointment_records(appointment_id))
        .await?;
    Ok(Json(records))
}

async fn fetch_table_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> ApiResult<Vec<RawRow>> {
    let table: ClinicTable = table.parse()?;
    let rows = state.with_db(move |db| db.fetch_table(table)).await?;
    Ok(Json(rows))
}

async fn analysis_handler(State(state): State<AppState>) -> ApiResult<Vec<AnalysisRow>> {
    let rows = state.with_db(|db| db.analysis()).await?;
    Ok(Json(rows))
}

async fn health_check_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Build the router with every endpoint.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/patients/new", post(create_patient_handler))
        .route("/patients/lifestyle", post(create_lifestyle_handler))
        .route("/patients/:patient_id", get(patient_info_handler))
        .route("/doctors", get(list_doctors_handler))
        .route("/appointments", post(create_appointment_handler))
        .route("/appointments/:patient_id", get(appointments_handler))
        .route("/tests", post(add_test_handler))
        .route("/prescriptions", post(prescribe_handler))
        .route("/records/:appointment_id", get(records_handler))
        .route("/fetch/:table", get(fetch_table_handler))
        .route("/get_analysis", get(analysis_handler))
        .route("/health", get(health_check_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn serve<S>(listener: TcpListener, state: AppState, shutdown: S) -> std::io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "clinical data API listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
