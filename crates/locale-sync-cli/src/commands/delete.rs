use anyhow::Result;
use locale_sync::TranslationProject;

pub async fn run(project: &dyn TranslationProject, name: &str) -> Result<()> {
    project.delete_directory(name).await?;
    println!("Deleted project directory \"{name}\"");
    Ok(())
}
