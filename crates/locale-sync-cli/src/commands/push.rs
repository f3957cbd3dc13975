use anyhow::{Context, Result};
use locale_sync::{PushCommit, RepositoryName, TranslationProject, VersionControl, on_push};

/// Upload the changed source files of one repository.
///
/// `changed` holds repository-relative paths; anything outside `locale/en`
/// is ignored.
pub async fn run(
    project: &dyn TranslationProject,
    vcs: &dyn VersionControl,
    repository: &str,
    changed: Vec<String>,
) -> Result<()> {
    let name: RepositoryName = repository.parse()?;
    let repo = vcs
        .find_repository(&name)
        .await?
        .with_context(|| format!("repository {repository} is not configured"))?;

    let commits = [PushCommit {
        added: Vec::new(),
        modified: changed,
    }];
    let report = on_push(project, vcs, &repo, &commits).await?;

    if report.is_empty() {
        println!("{name}: no source-language files to upload");
    } else {
        println!(
            "{name}: {} added, {} updated",
            report.added.len(),
            report.updated.len()
        );
    }
    Ok(())
}
