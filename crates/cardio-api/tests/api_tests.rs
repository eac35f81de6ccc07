//! End-to-end tests against a live server on an ephemeral port.

use std::time::Duration;

use cardio_api::{prepare_database, serve, ApiConfig, AppState};
use cardio_core::Doctor;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

struct TestServer {
    base_url: String,
    client: Client,
    _dir: TempDir,
}

impl TestServer {
    async fn start(doctors: Vec<Doctor>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = ApiConfig {
            database_path: dir.path().join("clinic.db"),
            doctors,
            ..ApiConfig::default()
        };
        prepare_database(&config).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = AppState::from_config(&config);
        tokio::spawn(serve(listener, state, std::future::pending()));

        Self {
            base_url: format!("http://{}", addr),
            client: Client::builder().timeout(Duration::from_secs(10)).build().unwrap(),
            _dir: dir,
        }
    }

    async fn with_default_doctors() -> Self {
        Self::start(ApiConfig::default().doctors).await
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn create_patient(&self) -> i64 {
        let (status, body) = self
            .post(
                "/patients/new",
                json!({"name": "Grace Obi", "age": 64, "gender": 2, "height": 160.0, "weight": 77.5}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["patient_id"].as_i64().unwrap()
    }

    async fn book(&self, patient_id: i64) -> i64 {
        let (status, body) = self
            .post(
                "/appointments",
                json!({"patient_id": patient_id, "appointment_type": "Initial Consult", "appointment_date": "2025-07-01"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["appointment_id"].as_i64().unwrap()
    }

    async fn add_test(&self, appointment_id: i64, ap_hi: u32, cholesterol: u8) -> i64 {
        let (status, body) = self
            .post(
                "/tests",
                json!({"appointment_id": appointment_id, "ap_hi": ap_hi, "ap_lo": 85, "cholesterol": cholesterol, "gluc": 1}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["test_id"].as_i64().unwrap()
    }

    async fn prescribe(&self, appointment_id: i64, medicine: &str) -> (StatusCode, Value) {
        self.post(
            "/prescriptions",
            json!({
                "appointment_id": appointment_id,
                "prescribed_date": "2025-07-01",
                "medicine_name": medicine,
                "dosage": "1x daily",
                "duration_days": 30
            }),
        )
        .await
    }
}

#[tokio::test]
async fn test_full_intake_workflow() {
    let server = TestServer::with_default_doctors().await;

    let patient_id = server.create_patient().await;
    assert!((10_000_000..=99_999_999).contains(&patient_id));

    let (status, body) = server
        .post(
            "/patients/lifestyle",
            json!({"patient_id": patient_id, "smoke": 1, "alco": 0, "active": 1}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Lifestyle data added successfully");

    let (status, body) = server
        .post(
            "/appointments",
            json!({"patient_id": patient_id, "appointment_type": "Follow-up", "appointment_date": "2025-07-01"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let appointment_id = body["appointment_id"].as_i64().unwrap();
    assert!([101, 102, 103].contains(&body["assigned_doctor_id"].as_i64().unwrap()));

    let test_id = server.add_test(appointment_id, 155, 2).await;

    let (status, body) = server.prescribe(appointment_id, "Amlodipine").await;
    assert_eq!(status, StatusCode::OK);
    let prescription_id = body["prescription_id"].as_i64().unwrap();

    let (_, info) = server.get(&format!("/patients/{}", patient_id)).await;
    assert_eq!(info["patient"]["name"], "Grace Obi");
    assert_eq!(info["lifestyle"]["smoke"], 1);

    let (_, appts) = server.get(&format!("/appointments/{}", patient_id)).await;
    assert_eq!(appts.as_array().unwrap().len(), 1);
    assert_eq!(appts[0]["appointment_type"], "Follow-up");
    assert_eq!(appts[0]["appointment_date"], "2025-07-01");

    let (_, records) = server.get(&format!("/records/{}", appointment_id)).await;
    assert_eq!(records["test_details"]["test_id"], test_id);
    assert_eq!(records["prescription"]["prescription_id"], prescription_id);
    assert_eq!(records["prescription"]["medicine_name"], "Amlodipine");

    let (status, analysis) = server.get("/get_analysis").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        analysis,
        json!([{"patient_id": patient_id, "age": 64, "ap_hi": 155, "ap_lo": 85, "cholesterol": 2, "gluc": 1}])
    );
}

#[tokio::test]
async fn test_risk_rule_substitutes_default() {
    let server = TestServer::with_default_doctors().await;
    let appointment_id = server.book(server.create_patient().await).await;
    server.add_test(appointment_id, 100, 1).await;

    let (status, _) = server.prescribe(appointment_id, "Amlodipine").await;
    assert_eq!(status, StatusCode::OK);

    let (_, records) = server.get(&format!("/records/{}", appointment_id)).await;
    assert_eq!(records["prescription"]["medicine_name"], "Multivitamins");
}

#[tokio::test]
async fn test_prescription_without_test_is_not_found() {
    let server = TestServer::with_default_doctors().await;
    let appointment_id = server.book(server.create_patient().await).await;

    let (status, body) = server.prescribe(appointment_id, "Amlodipine").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Test data not found");

    let (_, rows) = server.get("/fetch/prescriptions").await;
    assert_eq!(rows, json!([]));
}

#[tokio::test]
async fn test_appointment_without_doctors_fails() {
    let server = TestServer::start(Vec::new()).await;
    let patient_id = server.create_patient().await;

    let (status, body) = server
        .post(
            "/appointments",
            json!({"patient_id": patient_id, "appointment_type": "Initial Consult", "appointment_date": "2025-07-01"}),
        )
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"], "No doctors available to assign");

    let (_, rows) = server.get("/fetch/appointments").await;
    assert_eq!(rows, json!([]));
}

#[tokio::test]
async fn test_unknown_patient_returns_nulls() {
    let server = TestServer::with_default_doctors().await;

    let (status, body) = server.get("/patients/12345678").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"patient": null, "lifestyle": null}));

    let (status, body) = server.get("/records/12345678").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"test_details": null, "prescription": null}));
}

#[tokio::test]
async fn test_invalid_input_rejected() {
    let server = TestServer::with_default_doctors().await;

    let (status, body) = server
        .post(
            "/patients/new",
            json!({"name": "X", "age": 30, "gender": 5, "height": 170.0, "weight": 70.0}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("gender"));

    let (status, body) = server.post("/tests", json!({"appointment_id": "abc"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, body) = server.get("/patients/not-a-number").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (_, rows) = server.get("/fetch/patient_details").await;
    assert_eq!(rows, json!([]));
}

#[tokio::test]
async fn test_fetch_table_allow_list() {
    let server = TestServer::with_default_doctors().await;

    let (status, doctors) = server.get("/fetch/doctors").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doctors.as_array().unwrap().len(), 3);
    assert_eq!(doctors[0]["doctor_id"], 101);

    let (status, body) = server.get("/fetch/sqlite_master").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Unknown table: sqlite_master");
}

#[tokio::test]
async fn test_list_doctors() {
    let server = TestServer::with_default_doctors().await;

    let (status, body) = server.get("/doctors").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body[1],
        json!({"doctor_id": 102, "name": "Dr. Marcus Hale", "specialization": "Internal Medicine"})
    );
}

#[tokio::test]
async fn test_unprepared_database_is_not_created() {
    let dir = tempfile::tempdir().unwrap();
    let config = ApiConfig {
        database_path: dir.path().join("missing.db"),
        ..ApiConfig::default()
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, AppState::from_config(&config), std::future::pending()));

    let resp = Client::new()
        .get(format!("http://{}/doctors", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!config.database_path.exists());
}

#[tokio::test]
async fn test_concurrent_patient_creation() {
    let server = std::sync::Arc::new(TestServer::with_default_doctors().await);

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let server = std::sync::Arc::clone(&server);
            tokio::spawn(async move { server.create_patient().await })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap());
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 20);

    let (_, rows) = server.get("/fetch/patient_details").await;
    assert_eq!(rows.as_array().unwrap().len(), 20);
}
