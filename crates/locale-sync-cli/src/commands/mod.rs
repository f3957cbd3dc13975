pub mod add;
pub mod delete;
pub mod pull;
pub mod push;
pub mod status;

use anyhow::Result;
use locale_sync::{BatchReport, LogReporter};

/// Report failures of a batch run and print a one-line summary.
///
/// Fails only when every repository failed.
pub fn finish_batch<T>(report: &BatchReport<T>, verb: &str) -> Result<()> {
    report.report_failures(&LogReporter);

    let total = report.len();
    let failed = report.failure_count();
    if total > 0 && failed == total {
        anyhow::bail!("all {total} repositories failed to {verb}");
    }
    if failed > 0 {
        println!("{verb}: {} repositories succeeded ({failed} failed)", total - failed);
    } else {
        println!("{verb}: {total} repositories succeeded");
    }
    Ok(())
}
