use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use locale_sync::{SyncError, UpdateLog};

use crate::schema;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// How long ago translations were last pulled into repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    NeverUpdated,
    Due { days_old: u64 },
    NotDue { days_old: u64 },
}

/// SQLite record of completed pull runs.
pub struct UpdateStore {
    conn: Mutex<rusqlite::Connection>,
}

impl UpdateStore {
    /// Open a store backed by a file on disk.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = rusqlite::Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::with_connection(conn)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = rusqlite::Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(mut conn: rusqlite::Connection) -> Result<Self, StoreError> {
        schema::migrations()
            .to_latest(&mut conn)
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, rusqlite::Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Completion time of the most recent pull, if any.
    pub fn last_update_time(&self) -> Result<Option<SystemTime>, StoreError> {
        let secs: Option<i64> = self
            .conn()
            .query_row("SELECT MAX(completed_at) FROM update_runs", [], |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(secs.map(|secs| UNIX_EPOCH + Duration::from_secs(secs.max(0) as u64)))
    }

    pub fn record_update_now(&self) -> Result<(), StoreError> {
        self.set_last_update_time(epoch_secs(SystemTime::now()))
    }

    /// Record a pull completed at `epoch_secs` (for testing staleness).
    pub fn set_last_update_time(&self, epoch_secs: u64) -> Result<(), StoreError> {
        self.conn()
            .execute(
                "INSERT INTO update_runs (completed_at) VALUES (?1)",
                [epoch_secs as i64],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    /// Number of recorded pull runs.
    pub fn update_count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM update_runs", [], |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(count.max(0) as u64)
    }

    /// Whether the next automatic pull is due, given the pull `period`.
    pub fn update_status(&self, period: Duration) -> Result<UpdateStatus, StoreError> {
        let Some(last) = self.last_update_time()? else {
            return Ok(UpdateStatus::NeverUpdated);
        };

        let elapsed = SystemTime::now().duration_since(last).unwrap_or_default();
        let days_old = elapsed.as_secs() / SECONDS_PER_DAY;
        if elapsed > period {
            Ok(UpdateStatus::Due { days_old })
        } else {
            Ok(UpdateStatus::NotDue { days_old })
        }
    }
}

#[async_trait::async_trait]
impl UpdateLog for UpdateStore {
    async fn last_update_time(&self) -> Result<Option<SystemTime>, SyncError> {
        UpdateStore::last_update_time(self).map_err(Into::into)
    }

    async fn record_update_now(&self) -> Result<(), SyncError> {
        UpdateStore::record_update_now(self).map_err(Into::into)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("migration error: {0}")]
    Migration(String),
}

impl From<StoreError> for SyncError {
    fn from(error: StoreError) -> Self {
        SyncError::Storage(error.to_string())
    }
}

fn epoch_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}
