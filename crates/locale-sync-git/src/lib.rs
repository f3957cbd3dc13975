mod command;
pub mod repositories;
pub mod working_copy;

pub use repositories::{CheckoutSource, GitRepositories, RepositoryEntry, github_clone_url};
pub use working_copy::GitWorkingCopy;
