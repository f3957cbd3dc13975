mod schema;
pub mod store;

pub use store::{StoreError, UpdateStatus, UpdateStore};
