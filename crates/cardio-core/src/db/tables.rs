//! Whole-table browsing and the analysis join.
//!
//! Table names arriving from callers are parsed into [`ClinicTable`]; only
//! the fixed statements below ever reach SQLite.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::ValueRef;
use serde_json::{Map, Number, Value};
use thiserror::Error;

use super::{Database, DbResult};
use crate::models::AnalysisRow;

/// A row as an ordered column name → value mapping.
pub type RawRow = Map<String, Value>;

/// The tables that may be browsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClinicTable {
    PatientDetails,
    PatientLifestyle,
    Doctors,
    Appointments,
    TestDetails,
    Prescriptions,
}

/// A table name outside [`ClinicTable`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown table: {0}")]
pub struct UnknownTable(pub String);

impl ClinicTable {
    pub const ALL: [ClinicTable; 6] = [
        ClinicTable::PatientDetails,
        ClinicTable::PatientLifestyle,
        ClinicTable::Doctors,
        ClinicTable::Appointments,
        ClinicTable::TestDetails,
        ClinicTable::Prescriptions,
    ];

    /// Name of the SQL table.
    pub fn as_str(self) -> &'static str {
        match self {
            ClinicTable::PatientDetails => "patient_details",
            ClinicTable::PatientLifestyle => "patient_lifestyle",
            ClinicTable::Doctors => "doctors",
            ClinicTable::Appointments => "appointments",
            ClinicTable::TestDetails => "test_details",
            ClinicTable::Prescriptions => "prescriptions",
        }
    }

    /// Human-readable heading.
    pub fn label(self) -> &'static str {
        match self {
            ClinicTable::PatientDetails => "Patient Details",
            ClinicTable::PatientLifestyle => "Patient Lifestyle",
            ClinicTable::Doctors => "Doctors",
            ClinicTable::Appointments => "Appointments",
            ClinicTable::TestDetails => "Test Details",
            ClinicTable::Prescriptions => "Prescriptions",
        }
    }

    fn select_all_sql(self) -> &'static str {
        match self {
            ClinicTable::PatientDetails => "SELECT * FROM patient_details",
            ClinicTable::PatientLifestyle => "SELECT * FROM patient_lifestyle",
            ClinicTable::Doctors => "SELECT * FROM doctors",
            ClinicTable::Appointments => "SELECT * FROM appointments",
            ClinicTable::TestDetails => "SELECT * FROM test_details",
            ClinicTable::Prescriptions => "SELECT * FROM prescriptions",
        }
    }

    fn count_sql(self) -> &'static str {
        match self {
            ClinicTable::PatientDetails => "SELECT COUNT(*) FROM patient_details",
            ClinicTable::PatientLifestyle => "SELECT COUNT(*) FROM patient_lifestyle",
            ClinicTable::Doctors => "SELECT COUNT(*) FROM doctors",
            ClinicTable::Appointments => "SELECT COUNT(*) FROM appointments",
            ClinicTable::TestDetails => "SELECT COUNT(*) FROM test_details",
            ClinicTable::Prescriptions => "SELECT COUNT(*) FROM prescriptions",
        }
    }
}

impl FromStr for ClinicTable {
    type Err = UnknownTable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClinicTable::ALL
            .into_iter()
            .find(|table| table.as_str() == s)
            .ok_or_else(|| UnknownTable(s.to_string()))
    }
}

impl fmt::Display for ClinicTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::from(b.to_vec()),
    }
}

const ANALYSIS_SQL: &str = r#"
    SELECT
        pd.patient_id,
        pd.age,
        td.ap_hi,
        td.ap_lo,
        td.cholesterol,
        td.gluc
    FROM
        patient_details pd
    JOIN
        appointments a ON pd.patient_id = a.patient_id
    JOIN
        test_details td ON a.appointment_id = td.appointment_id
"#;

impl Database {
    /// Every row of a table, as raw column mappings.
    pub fn fetch_table(&self, table: ClinicTable) -> DbResult<Vec<RawRow>> {
        let mut stmt = self.conn.prepare(table.select_all_sql())?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let rows = stmt.query_map([], |row| {
            let mut raw = RawRow::new();
            for (idx, name) in columns.iter().enumerate() {
                raw.insert(name.clone(), json_value(row.get_ref(idx)?));
            }
            Ok(raw)
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Number of rows in a table.
    pub fn count_rows(&self, table: ClinicTable) -> DbResult<i64> {
        let count = self.conn.query_row(table.count_sql(), [], |row| row.get(0))?;
        Ok(count)
    }

    /// Patient × appointment × test join used for age trend charts.
    pub fn analysis(&self) -> DbResult<Vec<AnalysisRow>> {
        let mut stmt = self.conn.prepare(ANALYSIS_SQL)?;

        let rows = stmt.query_map([], |row| {
            Ok(AnalysisRow {
                patient_id: row.get(0)?,
                age: row.get(1)?,
                ap_hi: row.get(2)?,
                ap_lo: row.get(3)?,
                cholesterol: row.get(4)?,
                gluc: row.get(5)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Doctor, NewAppointment, NewPatient, NewTestDetails};
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_parse_allowed_names() {
        for table in ClinicTable::ALL {
            assert_eq!(table.as_str().parse::<ClinicTable>().unwrap(), table);
        }
    }

    #[test]
    fn test_rejects_unlisted_names() {
        assert!("users".parse::<ClinicTable>().is_err());
        assert!("doctors; DROP TABLE doctors".parse::<ClinicTable>().is_err());
        assert!("Doctors".parse::<ClinicTable>().is_err());
        assert_eq!(
            "sqlite_master".parse::<ClinicTable>().unwrap_err().to_string(),
            "Unknown table: sqlite_master"
        );
    }

    #[test]
    fn test_fetch_raw_rows() {
        let db = Database::open_in_memory().unwrap();
        db.seed_doctors(&[Doctor {
            doctor_id: 7,
            name: "Dr. Okafor".into(),
            specialization: "Cardiology".into(),
        }])
        .unwrap();

        let rows = db.fetch_table(ClinicTable::Doctors).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            Value::Object(rows[0].clone()),
            json!({"doctor_id": 7, "name": "Dr. Okafor", "specialization": "Cardiology"})
        );
        let keys: Vec<&String> = rows[0].keys().collect();
        assert_eq!(keys, ["doctor_id", "name", "specialization"]);
    }

    #[test]
    fn test_fetch_preserves_types() {
        let db = Database::open_in_memory().unwrap();
        db.create_patient(&NewPatient {
            name: "Lena Park".into(),
            age: 45,
            gender: 2,
            height: 165.5,
            weight: 60.0,
        })
        .unwrap();

        let rows = db.fetch_table(ClinicTable::PatientDetails).unwrap();
        assert_eq!(rows[0]["name"], json!("Lena Park"));
        assert_eq!(rows[0]["height"], json!(165.5));
        assert_eq!(rows[0]["age"], json!(45));
    }

    #[test]
    fn test_empty_table() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.fetch_table(ClinicTable::Prescriptions).unwrap().is_empty());
    }

    #[test]
    fn test_analysis_joins_three_tables() {
        let db = Database::open_in_memory().unwrap();
        db.seed_doctors(&[Doctor {
            doctor_id: 1,
            name: "Dr. Kapoor".into(),
            specialization: "Cardiology".into(),
        }])
        .unwrap();

        let patient_id = db
            .create_patient(&NewPatient {
                name: "Omar Haddad".into(),
                age: 58,
                gender: 1,
                height: 181.0,
                weight: 92.0,
            })
            .unwrap();
        let booking = db
            .create_appointment(&NewAppointment {
                patient_id,
                appointment_type: "Test Review".into(),
                appointment_date: NaiveDate::from_ymd_opt(2025, 4, 20).unwrap(),
            })
            .unwrap();
        db.add_test_details(&NewTestDetails {
            appointment_id: booking.appointment_id,
            ap_hi: 150,
            ap_lo: 95,
            cholesterol: 2,
            gluc: 3,
        })
        .unwrap();
        // Orphan test: its appointment does not exist, so it is not joined
        db.add_test_details(&NewTestDetails {
            appointment_id: 99999999,
            ap_hi: 110,
            ap_lo: 70,
            cholesterol: 1,
            gluc: 1,
        })
        .unwrap();

        let rows = db.analysis().unwrap();
        assert_eq!(
            rows,
            vec![AnalysisRow {
                patient_id,
                age: 58,
                ap_hi: 150,
                ap_lo: 95,
                cholesterol: 2,
                gluc: 3,
            }]
        );
    }
}
