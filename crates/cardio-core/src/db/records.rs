//! Test and prescription database operations.

use rand::Rng;
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::{Database, DbError, DbResult, IdKind};
use crate::models::{AppointmentRecords, NewPrescription, NewTestDetails, Prescription, TestDetails};
use crate::risk;

const TEST_COLUMNS: &str = "test_id, appointment_id, ap_hi, ap_lo, cholesterol, gluc";

fn test_from_row(row: &Row<'_>) -> rusqlite::Result<TestDetails> {
    Ok(TestDetails {
        test_id: row.get(0)?,
        appointment_id: row.get(1)?,
        ap_hi: row.get(2)?,
        ap_lo: row.get(3)?,
        cholesterol: row.get(4)?,
        gluc: row.get(5)?,
    })
}

fn prescription_from_row(row: &Row<'_>) -> rusqlite::Result<Prescription> {
    Ok(Prescription {
        prescription_id: row.get(0)?,
        appointment_id: row.get(1)?,
        prescribed_date: row.get(2)?,
        medicine_name: row.get(3)?,
        dosage: row.get(4)?,
        duration_days: row.get(5)?,
    })
}

impl Database {
    /// Record test results. The appointment is not looked up.
    pub fn add_test_details(&self, test: &NewTestDetails) -> DbResult<i64> {
        self.add_test_details_with(test, &mut rand::thread_rng())
    }

    pub fn add_test_details_with<R: Rng + ?Sized>(
        &self,
        test: &NewTestDetails,
        rng: &mut R,
    ) -> DbResult<i64> {
        let test_id = self.insert_with_unique_id(IdKind::Test, rng, |conn, id| {
            conn.execute(
                r#"
                INSERT INTO test_details (test_id, appointment_id, ap_hi, ap_lo, cholesterol, gluc)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    id,
                    test.appointment_id,
                    test.ap_hi,
                    test.ap_lo,
                    test.cholesterol,
                    test.gluc,
                ],
            )
        })?;
        info!(test_id, appointment_id = test.appointment_id, "test details recorded");
        Ok(test_id)
    }

    /// Most recently recorded test for an appointment.
    pub fn latest_test_for_appointment(&self, appointment_id: i64) -> DbResult<Option<TestDetails>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM test_details WHERE appointment_id = ? ORDER BY rowid DESC LIMIT 1",
                    TEST_COLUMNS
                ),
                [appointment_id],
                test_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// First recorded test for an appointment.
    pub fn first_test_for_appointment(&self, appointment_id: i64) -> DbResult<Option<TestDetails>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM test_details WHERE appointment_id = ? ORDER BY rowid LIMIT 1",
                    TEST_COLUMNS
                ),
                [appointment_id],
                test_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Prescribe medicine for an appointment.
    pub fn prescribe_medicine(&self, presc: &NewPrescription) -> DbResult<i64> {
        self.prescribe_medicine_with(presc, &mut rand::thread_rng())
    }

    /// Prescribe medicine, drawing identifier candidates from `rng`.
    ///
    /// The appointment's latest test decides whether the requested medicine
    /// or [`risk::DEFAULT_MEDICINE`] is stored. Without a test nothing is
    /// written and [`DbError::NotFound`] is returned.
    pub fn prescribe_medicine_with<R: Rng + ?Sized>(
        &self,
        presc: &NewPrescription,
        rng: &mut R,
    ) -> DbResult<i64> {
        let test = self
            .latest_test_for_appointment(presc.appointment_id)?
            .ok_or_else(|| DbError::NotFound("Test data not found".into()))?;
        let medicine_name = risk::resolve_medicine(&presc.medicine_name, &test);

        let prescription_id = self.insert_with_unique_id(IdKind::Prescription, rng, |conn, id| {
            conn.execute(
                r#"
                INSERT INTO prescriptions (prescription_id, appointment_id, prescribed_date, medicine_name, dosage, duration_days)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    id,
                    presc.appointment_id,
                    presc.prescribed_date,
                    medicine_name,
                    presc.dosage,
                    presc.duration_days,
                ],
            )
        })?;

        info!(
            prescription_id,
            appointment_id = presc.appointment_id,
            substituted = medicine_name != presc.medicine_name,
            "prescription stored"
        );
        Ok(prescription_id)
    }

    /// Get a prescription by ID.
    pub fn get_prescription(&self, prescription_id: i64) -> DbResult<Option<Prescription>> {
        self.conn
            .query_row(
                r#"
                SELECT prescription_id, appointment_id, prescribed_date, medicine_name, dosage, duration_days
                FROM prescriptions
                WHERE prescription_id = ?
                "#,
                [prescription_id],
                prescription_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// First recorded prescription for an appointment.
    pub fn first_prescription_for_appointment(
        &self,
        appointment_id: i64,
    ) -> DbResult<Option<Prescription>> {
        self.conn
            .query_row(
                r#"
                SELECT prescription_id, appointment_id, prescribed_date, medicine_name, dosage, duration_days
                FROM prescriptions
                WHERE appointment_id = ?
                ORDER BY rowid
                LIMIT 1
                "#,
                [appointment_id],
                prescription_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Test and prescription for an appointment, first match of each.
    pub fn appointment_records(&self, appointment_id: i64) -> DbResult<AppointmentRecords> {
        Ok(AppointmentRecords {
            test_details: self.first_test_for_appointment(appointment_id)?,
            prescription: self.first_prescription_for_appointment(appointment_id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ids::seeds_with_descending_ids;
    use crate::db::{random_id, ClinicTable};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const APPOINTMENT: i64 = 40404040;

    fn test_reading(ap_hi: u32, cholesterol: u8) -> NewTestDetails {
        NewTestDetails {
            appointment_id: APPOINTMENT,
            ap_hi,
            ap_lo: 85,
            cholesterol,
            gluc: 1,
        }
    }

    fn request(medicine: &str) -> NewPrescription {
        NewPrescription {
            appointment_id: APPOINTMENT,
            prescribed_date: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            medicine_name: medicine.into(),
            dosage: "1x daily".into(),
            duration_days: 30,
        }
    }

    fn stored_medicine(ap_hi: u32, cholesterol: u8, requested: &str) -> String {
        let db = Database::open_in_memory().unwrap();
        db.add_test_details(&test_reading(ap_hi, cholesterol)).unwrap();
        let id = db.prescribe_medicine(&request(requested)).unwrap();
        db.get_prescription(id).unwrap().unwrap().medicine_name
    }

    #[test]
    fn test_high_systolic_keeps_request() {
        assert_eq!(stored_medicine(141, 1, "Amlodipine"), "Amlodipine");
    }

    #[test]
    fn test_normal_reading_stores_default() {
        assert_eq!(stored_medicine(100, 1, "Amlodipine"), "Multivitamins");
    }

    #[test]
    fn test_high_cholesterol_keeps_request() {
        assert_eq!(stored_medicine(140, 3, "Atorvastatin"), "Atorvastatin");
    }

    #[test]
    fn test_prescription_without_test_is_not_found() {
        let db = Database::open_in_memory().unwrap();

        let result = db.prescribe_medicine(&request("Amlodipine"));
        assert!(matches!(result, Err(DbError::NotFound(_))));
        assert_eq!(db.count_rows(ClinicTable::Prescriptions).unwrap(), 0);
    }

    /// Seeds for which the row inserted second gets the smaller identifier.
    fn descending_seeds() -> (u64, u64) {
        let seeds = seeds_with_descending_ids(|rng| random_id(rng));
        assert!(
            random_id(&mut StdRng::seed_from_u64(seeds.0))
                > random_id(&mut StdRng::seed_from_u64(seeds.1))
        );
        seeds
    }

    #[test]
    fn test_latest_test_drives_rule() {
        let db = Database::open_in_memory().unwrap();
        let (older, newer) = descending_seeds();

        let older_id = db
            .add_test_details_with(&test_reading(160, 3), &mut StdRng::seed_from_u64(older))
            .unwrap();
        let newer_id = db
            .add_test_details_with(&test_reading(110, 1), &mut StdRng::seed_from_u64(newer))
            .unwrap();
        assert!(newer_id < older_id);

        assert_eq!(
            db.latest_test_for_appointment(APPOINTMENT).unwrap().unwrap().test_id,
            newer_id
        );
        let id = db.prescribe_medicine(&request("Amlodipine")).unwrap();
        let stored = db.get_prescription(id).unwrap().unwrap();
        assert_eq!(stored.medicine_name, "Multivitamins");
    }

    #[test]
    fn test_records_return_first_match() {
        let db = Database::open_in_memory().unwrap();
        let (first, second) = descending_seeds();

        let first_test = db
            .add_test_details_with(&test_reading(150, 2), &mut StdRng::seed_from_u64(first))
            .unwrap();
        let second_test = db
            .add_test_details_with(&test_reading(145, 1), &mut StdRng::seed_from_u64(second))
            .unwrap();
        let first_presc = db
            .prescribe_medicine_with(&request("Amlodipine"), &mut StdRng::seed_from_u64(first))
            .unwrap();
        let second_presc = db
            .prescribe_medicine_with(&request("Losartan"), &mut StdRng::seed_from_u64(second))
            .unwrap();
        assert!(second_test < first_test);
        assert!(second_presc < first_presc);

        let records = db.appointment_records(APPOINTMENT).unwrap();
        assert_eq!(records.test_details.unwrap().test_id, first_test);
        assert_eq!(records.prescription.unwrap().prescription_id, first_presc);
    }

    #[test]
    fn test_records_for_unknown_appointment() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.appointment_records(1).unwrap(), AppointmentRecords::default());
    }
}
