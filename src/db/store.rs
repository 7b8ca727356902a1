use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use super::repository::{get_prescription, insert_prescription};
use super::sqlite::{open_database, open_memory_database};
use super::DatabaseError;
use crate::models::PrescriptionRecord;

/// Storage keyed by `patient_id`. Insert and lookup only; records are
/// never updated or deleted through this interface.
///
/// Implementations block; async callers run them on a blocking thread.
pub trait PrescriptionStore: Send + Sync {
    /// Persist a record and return it as stored.
    fn store(&self, record: &PrescriptionRecord) -> Result<PrescriptionRecord, DatabaseError>;

    /// `Ok(None)` when no record has this id.
    fn lookup(&self, patient_id: &str) -> Result<Option<PrescriptionRecord>, DatabaseError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Local SQLite storage. One connection, serialised behind a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = open_database(path)?;
        tracing::info!(path = %path.display(), "SQLite prescription store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(open_memory_database()?),
        })
    }
}

impl PrescriptionStore for SqliteStore {
    fn store(&self, record: &PrescriptionRecord) -> Result<PrescriptionRecord, DatabaseError> {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        insert_prescription(&conn, record)?;
        // Read back so callers see exactly what was persisted.
        get_prescription(&conn, &record.patient_id)?.ok_or(DatabaseError::EmptyResponse)
    }

    fn lookup(&self, patient_id: &str) -> Result<Option<PrescriptionRecord>, DatabaseError> {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        get_prescription(&conn, patient_id)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
