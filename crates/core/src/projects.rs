//! Project discovery: every `Project{id}` directory holding a stage file is a
//! project.

use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::{ProjectSummary, StoreError};

/// File name of a project's stage list.
pub const STAGE_FILE: &str = "stage.json";

/// Location of the stage file of `project_id` below `projects_root`.
pub fn stage_file_path(projects_root: &Path, project_id: &str) -> PathBuf {
    projects_root
        .join(format!("Project{project_id}"))
        .join(STAGE_FILE)
}

/// Lists the projects below `root` in file-name order.
///
/// Entries without a readable, parseable stage file are skipped. Only a
/// failure to enumerate `root` itself is an error.
pub async fn list_projects(root: &Path) -> Result<Vec<ProjectSummary>, StoreError> {
    let walk_root = root.to_path_buf();
    let entries = tokio::task::spawn_blocking(move || child_entries(&walk_root))
        .await
        .map_err(|e| StoreError::Enumerate {
            path: root.to_path_buf(),
            source: io::Error::other(e),
        })??;

    let mut projects = Vec::with_capacity(entries.len());
    for entry in entries {
        let stage_file = entry.join(STAGE_FILE);
        match read_summary(&stage_file).await {
            Ok(summary) => projects.push(summary),
            Err(e) => debug!(entry = %entry.display(), error = %e, "skipping project entry"),
        }
    }
    Ok(projects)
}

fn child_entries(root: &Path) -> Result<Vec<PathBuf>, StoreError> {
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| {
            entry.map(walkdir::DirEntry::into_path).map_err(|e| StoreError::Enumerate {
                path: root.to_path_buf(),
                source: e.into(),
            })
        })
        .collect()
}

async fn read_summary(stage_file: &Path) -> Result<ProjectSummary, StoreError> {
    let bytes = tokio::fs::read(stage_file).await.map_err(|source| StoreError::Read {
        path: stage_file.to_path_buf(),
        source,
    })?;
    let doc: Value = serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
        path: stage_file.to_path_buf(),
        source,
    })?;
    Ok(ProjectSummary::from_document(&doc))
}
