use std::net::SocketAddr;
use std::path::PathBuf;

use progress_core::stage_file_path;

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub listen: SocketAddr,
    /// Holds `projects/` and `downloads.json`.
    pub data_dir: PathBuf,
}

impl DaemonConfig {
    pub fn projects_dir(&self) -> PathBuf {
        self.data_dir.join("projects")
    }

    pub fn downloads_file(&self) -> PathBuf {
        self.data_dir.join("downloads.json")
    }

    pub fn stage_file(&self, project_id: &str) -> PathBuf {
        stage_file_path(&self.projects_dir(), project_id)
    }
}
