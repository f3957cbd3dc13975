use std::path::Path;

use locale_sync::SyncError;
use tokio::process::Command;

/// Run `git <args>` inside `dir` and return its stdout.
pub(crate) async fn git(dir: &Path, args: &[&str]) -> Result<Vec<u8>, SyncError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .await
        .map_err(|e| SyncError::VersionControl(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        return Err(SyncError::VersionControl(format!(
            "`git {}` failed: {}",
            redact(args),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(output.stdout)
}

/// Join arguments for display with credentials in URLs masked.
fn redact(args: &[&str]) -> String {
    args.iter()
        .map(|arg| match (arg.find("://"), arg.find('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                format!("{}://***{}", &arg[..scheme_end], &arg[at..])
            }
            _ => (*arg).to_owned(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
