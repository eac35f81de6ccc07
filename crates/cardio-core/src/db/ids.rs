//! Random 8-digit identifier allocation.
//!
//! Candidates are drawn uniformly and checked against the owning table.
//! The check and the insert are separate statements, so two writers can
//! both see a candidate as free; the loser hits the unique constraint
//! and draws again.

use rand::Rng;
use rusqlite::{ffi, Connection, ErrorCode};
use tracing::debug;

use super::{Database, DbError, DbResult};

/// Smallest identifier handed out.
pub const ID_MIN: i64 = 10_000_000;
/// Largest identifier handed out.
pub const ID_MAX: i64 = 99_999_999;
/// Draws allowed per creation before giving up.
pub const MAX_ID_ATTEMPTS: usize = 1000;

/// Tables whose rows are keyed by a generated identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Patient,
    Appointment,
    Test,
    Prescription,
}

impl IdKind {
    pub fn table(self) -> &'static str {
        match self {
            IdKind::Patient => "patient_details",
            IdKind::Appointment => "appointments",
            IdKind::Test => "test_details",
            IdKind::Prescription => "prescriptions",
        }
    }

    fn exists_sql(self) -> &'static str {
        match self {
            IdKind::Patient => "SELECT COUNT(*) FROM patient_details WHERE patient_id = ?",
            IdKind::Appointment => "SELECT COUNT(*) FROM appointments WHERE appointment_id = ?",
            IdKind::Test => "SELECT COUNT(*) FROM test_details WHERE test_id = ?",
            IdKind::Prescription => "SELECT COUNT(*) FROM prescriptions WHERE prescription_id = ?",
        }
    }
}

/// Draw one candidate identifier.
pub fn random_id<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    rng.gen_range(ID_MIN..=ID_MAX)
}

/// Whether an insert failed because the key was already taken.
fn is_key_conflict(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && (e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    || e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE)
        }
        _ => false,
    }
}

/// Two seeds whose first identifier draws come out in descending order,
/// given how a creation consumes the rng before drawing (`first_draw`).
#[cfg(test)]
pub(crate) fn seeds_with_descending_ids<F>(first_draw: F) -> (u64, u64)
where
    F: Fn(&mut rand::rngs::StdRng) -> i64,
{
    use rand::SeedableRng;

    let draw = |seed| first_draw(&mut rand::rngs::StdRng::seed_from_u64(seed));
    (0..)
        .find(|&seed| draw(seed) > draw(seed + 1))
        .map(|seed| (seed, seed + 1))
        .unwrap_or_default()
}

impl Database {
    /// Check whether an identifier is already used in the table for `kind`.
    pub fn id_taken(&self, kind: IdKind, id: i64) -> DbResult<bool> {
        let count: i64 = self
            .conn
            .query_row(kind.exists_sql(), [id], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Insert a row under a freshly allocated identifier and return it.
    ///
    /// `insert` receives the connection and the candidate and must write
    /// exactly one row keyed by it.
    pub(crate) fn insert_with_unique_id<R, F>(
        &self,
        kind: IdKind,
        rng: &mut R,
        mut insert: F,
    ) -> DbResult<i64>
    where
        R: Rng + ?Sized,
        F: FnMut(&Connection, i64) -> rusqlite::Result<usize>,
    {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let candidate = random_id(rng);
            if self.id_taken(kind, candidate)? {
                debug!(table = kind.table(), candidate, attempt, "identifier taken, resampling");
                continue;
            }
            match insert(&self.conn, candidate) {
                Ok(_) => return Ok(candidate),
                Err(e) if is_key_conflict(&e) => {
                    debug!(table = kind.table(), candidate, attempt, "identifier claimed concurrently, resampling");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(DbError::IdSpaceExhausted {
            table: kind.table(),
            attempts: MAX_ID_ATTEMPTS,
        })
    }
}
