use std::time::Duration;

use anyhow::Result;
use locale_sync_store::{UpdateStatus, UpdateStore};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Print when translations were last pulled and whether a pull is due.
pub fn run(store: &UpdateStore, period: Duration, repositories: usize) -> Result<()> {
    let period_days = period.as_secs() / SECONDS_PER_DAY;
    println!("Configured repositories: {repositories}");
    println!("Update period: {period_days} days");
    println!("Recorded pulls: {}", store.update_count()?);

    match store.update_status(period)? {
        UpdateStatus::NeverUpdated => println!("Translations have never been pulled; next pull is due now."),
        UpdateStatus::Due { days_old } => {
            println!("Last pull was {days_old} days ago; next pull is due now.")
        }
        UpdateStatus::NotDue { days_old } => println!(
            "Last pull was {days_old} days ago; next pull is due in {} days.",
            period_days.saturating_sub(days_old)
        ),
    }
    Ok(())
}
