use anyhow::{Context, Result};
use locale_sync::{AddOptions, RepositoryName, RepositoryRef, TranslationProject, VersionControl, onboard_all};

use super::finish_batch;

/// Onboard the named repositories, or every configured one if none are named.
pub async fn run(
    project: &dyn TranslationProject,
    vcs: &dyn VersionControl,
    names: &[String],
    options: AddOptions,
    concurrency: usize,
) -> Result<()> {
    let repositories = select_repositories(vcs, names).await?;
    println!("Onboarding {} repositories...", repositories.len());

    let report = onboard_all(project, vcs, repositories, options, concurrency).await;
    for (name, onboarded) in report.succeeded() {
        println!(
            "{name}: {} source files, {} translated files",
            onboarded.source_files, onboarded.translated_files
        );
        if !onboarded.new_languages.is_empty() {
            println!("  new project languages: {}", onboarded.new_languages.join(", "));
        }
    }

    finish_batch(&report, "onboard")
}

async fn select_repositories(vcs: &dyn VersionControl, names: &[String]) -> Result<Vec<RepositoryRef>> {
    if names.is_empty() {
        return Ok(vcs.list_repositories().await?);
    }

    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        let parsed: RepositoryName = name.parse()?;
        let repo = vcs
            .find_repository(&parsed)
            .await?
            .with_context(|| format!("repository {name} is not configured"))?;
        selected.push(repo);
    }
    Ok(selected)
}
