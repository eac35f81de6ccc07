//! Patient and lifestyle database operations.

use rand::Rng;
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::{Database, DbResult, IdKind};
use crate::models::{Lifestyle, NewPatient, Patient, PatientInfo};

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        patient_id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
        height: row.get(4)?,
        weight: row.get(5)?,
    })
}

fn lifestyle_from_row(row: &Row<'_>) -> rusqlite::Result<Lifestyle> {
    Ok(Lifestyle {
        patient_id: row.get(0)?,
        smoke: row.get(1)?,
        alco: row.get(2)?,
        active: row.get(3)?,
    })
}

impl Database {
    /// Register a patient under a new random identifier.
    pub fn create_patient(&self, patient: &NewPatient) -> DbResult<i64> {
        self.create_patient_with(patient, &mut rand::thread_rng())
    }

    /// Register a patient, drawing identifier candidates from `rng`.
    pub fn create_patient_with<R: Rng + ?Sized>(
        &self,
        patient: &NewPatient,
        rng: &mut R,
    ) -> DbResult<i64> {
        let patient_id = self.insert_with_unique_id(IdKind::Patient, rng, |conn, id| {
            conn.execute(
                r#"
                INSERT INTO patient_details (patient_id, name, age, gender, height, weight)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    id,
                    patient.name,
                    patient.age,
                    patient.gender,
                    patient.height,
                    patient.weight,
                ],
            )
        })?;
        info!(patient_id, "patient created");
        Ok(patient_id)
    }

    /// Store lifestyle answers. The patient is not looked up.
    pub fn insert_lifestyle(&self, lifestyle: &Lifestyle) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO patient_lifestyle (patient_id, smoke, alco, active) VALUES (?1, ?2, ?3, ?4)",
            params![
                lifestyle.patient_id,
                lifestyle.smoke,
                lifestyle.alco,
                lifestyle.active,
            ],
        )?;
        Ok(())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, patient_id: i64) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                r#"
                SELECT patient_id, name, age, gender, height, weight
                FROM patient_details
                WHERE patient_id = ?
                "#,
                [patient_id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get the first lifestyle row stored for a patient.
    pub fn get_lifestyle(&self, patient_id: i64) -> DbResult<Option<Lifestyle>> {
        self.conn
            .query_row(
                r#"
                SELECT patient_id, smoke, alco, active
                FROM patient_lifestyle
                WHERE patient_id = ?
                ORDER BY rowid
                LIMIT 1
                "#,
                [patient_id],
                lifestyle_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Patient and lifestyle, looked up one after the other.
    pub fn patient_info(&self, patient_id: i64) -> DbResult<PatientInfo> {
        Ok(PatientInfo {
            patient: self.get_patient(patient_id)?,
            lifestyle: self.get_lifestyle(patient_id)?,
        })
    }
}
