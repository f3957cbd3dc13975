use std::time::Duration;

use anyhow::Result;
use locale_sync::{
    BatchReport, CommitIdentity, PullOutcome, RepositoryName, TranslationProject, VersionControl, pull_all,
    pull_all_if_due, pull_one,
};
use locale_sync_store::UpdateStore;

use super::finish_batch;

/// Which repositories a pull run covers.
pub enum PullScope {
    /// One repository, regardless of when translations were last pulled.
    Single(String),
    /// Every managed repository, only if the update period has elapsed.
    IfDue,
    /// Every managed repository.
    All,
}

pub struct PullSettings<'a> {
    pub identity: &'a CommitIdentity,
    pub period: Duration,
    pub concurrency: usize,
}

pub async fn run(
    project: &dyn TranslationProject,
    vcs: &dyn VersionControl,
    store: &UpdateStore,
    scope: PullScope,
    settings: PullSettings<'_>,
) -> Result<()> {
    match scope {
        PullScope::Single(repository) => {
            let name: RepositoryName = repository.parse()?;
            println!("Pulling translations into {name}...");
            let outcome = pull_one(project, vcs, &name, settings.identity).await?;
            print_outcome(&name, &outcome);
            Ok(())
        }
        PullScope::IfDue => {
            let report = pull_all_if_due(
                project,
                vcs,
                store,
                settings.period,
                settings.identity,
                settings.concurrency,
            )
            .await?;
            match report {
                Some(report) => print_report(&report),
                None => {
                    println!("Translations were pulled recently, nothing to do.");
                    Ok(())
                }
            }
        }
        PullScope::All => {
            println!("Pulling translations into all managed repositories...");
            let report = pull_all(project, vcs, settings.identity, settings.concurrency).await?;
            store.record_update_now()?;
            print_report(&report)
        }
    }
}

fn print_report(report: &BatchReport<PullOutcome>) -> Result<()> {
    if report.is_empty() {
        println!("No repositories are managed by the translation project.");
        return Ok(());
    }
    for (name, outcome) in report.succeeded() {
        print_outcome(name, outcome);
    }
    finish_batch(report, "pull")
}

fn print_outcome(name: &RepositoryName, outcome: &PullOutcome) {
    if outcome.pushed {
        println!(
            "{name}: pushed {} files in {} languages",
            outcome.files,
            outcome.languages.len()
        );
    } else {
        println!("{name}: already up to date");
    }
}
