//! SQLite schema definition.

/// Complete database schema for the clinic.
///
/// Cross-table references carry no foreign keys. Generated identifiers are
/// `UNIQUE` columns rather than `INTEGER PRIMARY KEY`, so they do not alias
/// the rowid and `ORDER BY rowid` stays in insertion order.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patient_details (
    patient_id INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    age INTEGER NOT NULL,
    gender INTEGER NOT NULL,                     -- 1 = male, 2 = female
    height REAL NOT NULL,                        -- cm
    weight REAL NOT NULL                         -- kg
);

-- Not unique: repeated submissions add rows
CREATE TABLE IF NOT EXISTS patient_lifestyle (
    patient_id INTEGER NOT NULL,
    smoke INTEGER NOT NULL,
    alco INTEGER NOT NULL,
    active INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_lifestyle_patient ON patient_lifestyle(patient_id);

-- ============================================================================
-- Doctors (seeded, read-only through the API)
-- ============================================================================

CREATE TABLE IF NOT EXISTS doctors (
    doctor_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    specialization TEXT NOT NULL DEFAULT ''
);

-- ============================================================================
-- Appointments and per-appointment records
-- ============================================================================

CREATE TABLE IF NOT EXISTS appointments (
    appointment_id INTEGER NOT NULL UNIQUE,
    patient_id INTEGER NOT NULL,
    doctor_id INTEGER NOT NULL,
    appointment_date TEXT NOT NULL,              -- YYYY-MM-DD
    appointment_type TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments(patient_id);

CREATE TABLE IF NOT EXISTS test_details (
    test_id INTEGER NOT NULL UNIQUE,
    appointment_id INTEGER NOT NULL,
    ap_hi INTEGER NOT NULL,
    ap_lo INTEGER NOT NULL,
    cholesterol INTEGER NOT NULL,                -- 1..3
    gluc INTEGER NOT NULL                        -- 1..3
);

CREATE INDEX IF NOT EXISTS idx_tests_appointment ON test_details(appointment_id);

CREATE TABLE IF NOT EXISTS prescriptions (
    prescription_id INTEGER NOT NULL UNIQUE,
    appointment_id INTEGER NOT NULL,
    prescribed_date TEXT NOT NULL,               -- YYYY-MM-DD
    medicine_name TEXT NOT NULL,
    dosage TEXT NOT NULL,
    duration_days INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_prescriptions_appointment ON prescriptions(appointment_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let insert = "INSERT INTO test_details (test_id, appointment_id, ap_hi, ap_lo, cholesterol, gluc) VALUES (12345678, 1, 120, 80, 1, 1)";
        conn.execute(insert, []).unwrap();
        match conn.execute(insert, []) {
            Err(rusqlite::Error::SqliteFailure(e, _)) => {
                assert_eq!(e.extended_code, rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE);
            }
            other => panic!("expected a unique constraint failure, got {:?}", other),
        }
    }

    #[test]
    fn test_rowid_follows_insertion_order() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        // Larger identifier first
        for test_id in [90000000, 10000000] {
            conn.execute(
                "INSERT INTO test_details (test_id, appointment_id, ap_hi, ap_lo, cholesterol, gluc) VALUES (?1, 1, 120, 80, 1, 1)",
                [test_id],
            )
            .unwrap();
        }

        let first: i64 = conn
            .query_row("SELECT test_id FROM test_details ORDER BY rowid LIMIT 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(first, 90000000);
    }

    #[test]
    fn test_lifestyle_allows_repeats() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let insert = "INSERT INTO patient_lifestyle (patient_id, smoke, alco, active) VALUES (12345678, 0, 0, 1)";
        conn.execute(insert, []).unwrap();
        conn.execute(insert, []).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM patient_lifestyle", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}
