#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared models and file-backed storage for the progress tracking service.

pub mod error;
pub mod model;
pub mod projects;
pub mod records;
pub mod store;

pub use error::StoreError;
pub use model::{ProjectSummary, Record};
pub use projects::{list_projects, stage_file_path, STAGE_FILE};
pub use records::{next_id, remove, set_status, upsert, Upsert};
pub use store::JsonStore;
