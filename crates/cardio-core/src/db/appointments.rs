//! Doctor and appointment database operations.

use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::params;
use tracing::info;

use super::{Database, DbError, DbResult, IdKind};
use crate::models::{Appointment, AppointmentBooking, Doctor, NewAppointment};

impl Database {
    /// Insert doctors that are not present yet. Returns how many were added.
    pub fn seed_doctors(&self, doctors: &[Doctor]) -> DbResult<usize> {
        let mut stmt = self.conn.prepare(
            "INSERT OR IGNORE INTO doctors (doctor_id, name, specialization) VALUES (?1, ?2, ?3)",
        )?;
        let mut added = 0;
        for doctor in doctors {
            added += stmt.execute(params![doctor.doctor_id, doctor.name, doctor.specialization])?;
        }
        Ok(added)
    }

    /// List all doctors.
    pub fn list_doctors(&self) -> DbResult<Vec<Doctor>> {
        let mut stmt = self
            .conn
            .prepare("SELECT doctor_id, name, specialization FROM doctors ORDER BY doctor_id")?;

        let rows = stmt.query_map([], |row| {
            Ok(Doctor {
                doctor_id: row.get(0)?,
                name: row.get(1)?,
                specialization: row.get(2)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// All doctor identifiers.
    pub fn doctor_ids(&self) -> DbResult<Vec<i64>> {
        let mut stmt = self.conn.prepare("SELECT doctor_id FROM doctors")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Book an appointment with a doctor chosen uniformly at random.
    pub fn create_appointment(&self, appt: &NewAppointment) -> DbResult<AppointmentBooking> {
        self.create_appointment_with(appt, &mut rand::thread_rng())
    }

    /// Book an appointment, drawing the doctor and identifier from `rng`.
    ///
    /// Fails with [`DbError::NoDoctors`] before anything is written if no
    /// doctor has been seeded.
    pub fn create_appointment_with<R: Rng + ?Sized>(
        &self,
        appt: &NewAppointment,
        rng: &mut R,
    ) -> DbResult<AppointmentBooking> {
        let doctor_ids = self.doctor_ids()?;
        let assigned_doctor_id = *doctor_ids.choose(rng).ok_or(DbError::NoDoctors)?;

        let appointment_id = self.insert_with_unique_id(IdKind::Appointment, rng, |conn, id| {
            conn.execute(
                r#"
                INSERT INTO appointments (appointment_id, patient_id, doctor_id, appointment_date, appointment_type)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    id,
                    appt.patient_id,
                    assigned_doctor_id,
                    appt.appointment_date,
                    appt.appointment_type,
                ],
            )
        })?;

        info!(appointment_id, assigned_doctor_id, patient_id = appt.patient_id, "appointment booked");
        Ok(AppointmentBooking {
            appointment_id,
            assigned_doctor_id,
        })
    }

    /// All appointments for a patient, in booking order.
    pub fn appointments_for_patient(&self, patient_id: i64) -> DbResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT appointment_id, patient_id, doctor_id, appointment_date, appointment_type
            FROM appointments
            WHERE patient_id = ?
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([patient_id], |row| {
            Ok(Appointment {
                appointment_id: row.get(0)?,
                patient_id: row.get(1)?,
                doctor_id: row.get(2)?,
                appointment_date: row.get(3)?,
                appointment_type: row.get(4)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
