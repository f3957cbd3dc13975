use std::time::{Duration, SystemTime};

use crate::error::SyncError;

/// Default period between automatic pulls from the translation project.
pub const DEFAULT_UPDATE_PERIOD: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Record of when the last full pull into repositories completed.
#[async_trait::async_trait]
pub trait UpdateLog: Send + Sync {
    async fn last_update_time(&self) -> Result<Option<SystemTime>, SyncError>;

    async fn record_update_now(&self) -> Result<(), SyncError>;
}

/// True if no pull was ever recorded, or the last one is older than `period`.
pub async fn is_update_due(
    log: &dyn UpdateLog,
    period: Duration,
    now: SystemTime,
) -> Result<bool, SyncError> {
    let Some(last) = log.last_update_time().await? else {
        return Ok(true);
    };
    let elapsed = now.duration_since(last).unwrap_or_default();
    Ok(elapsed > period)
}
