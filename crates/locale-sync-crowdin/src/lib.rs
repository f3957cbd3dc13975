pub mod archive;
pub mod client;
pub mod wire;

pub use client::{CrowdinClient, CrowdinConfig};
