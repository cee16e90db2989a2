use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use progress_core::{
    model::STATUS_FIELD, records, JsonStore, ProjectSummary, Record, Upsert,
};
use tracing::{debug, info};

use crate::{
    config::DaemonConfig,
    error::{ApiError, Resource},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DaemonConfig>,
    pub store: Arc<JsonStore>,
}

impl AppState {
    pub fn new(config: DaemonConfig) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(JsonStore::new()),
        }
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Reads the leading integer of a path id, so `"2abc"` and `"2.5"` both
/// mean `2`. No leading digits, or a value beyond `i64`, matches no record.
fn parse_id(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let sign_len = usize::from(raw.starts_with(['+', '-']));
    let digits = raw[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    raw[..sign_len + digits].parse().ok()
}

pub async fn welcome() -> &'static str {
    "Welcome to the stages API!"
}

/// GET /projects
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Vec<ProjectSummary>> {
    let projects = progress_core::list_projects(&state.config.projects_dir())
        .await
        .map_err(|e| ApiError::from_store(Resource::Projects, e))?;
    debug!(count = projects.len(), "listed projects");
    Ok(Json(projects))
}

/// GET /projects/stage/{project_id}
pub async fn get_stages(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Vec<Record>> {
    let stages = state
        .store
        .read(&state.config.stage_file(&project_id))
        .await
        .map_err(|e| ApiError::from_store(Resource::Stages, e))?;
    Ok(Json(stages))
}

/// POST /projects/stage/{project_id}
pub async fn upsert_stage(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(stage): Json<Record>,
) -> ApiResult<Vec<Record>> {
    let mut outcome = None;
    let stages = state
        .store
        .modify(&state.config.stage_file(&project_id), |stages| {
            outcome = Some(records::upsert(stages, stage)?);
            Ok(())
        })
        .await
        .map_err(|e| ApiError::from_store(Resource::Stages, e))?;

    match outcome {
        Some(Upsert::Appended { id }) => info!(project = %project_id, id, "stage added"),
        Some(Upsert::Replaced { index }) => info!(project = %project_id, index, "stage replaced"),
        None => {}
    }
    Ok(Json(stages))
}

/// POST /projects/stage/{project_id}/{id}: replaces only the `status` field.
pub async fn update_stage_status(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(String, String)>,
    Json(body): Json<Record>,
) -> ApiResult<Vec<Record>> {
    let Some(stage_id) = parse_id(&id) else {
        return Err(ApiError::NotFound("Stage not found"));
    };
    let status = body.get(STATUS_FIELD).cloned();

    let stages = state
        .store
        .modify(&state.config.stage_file(&project_id), |stages| {
            records::set_status(stages, stage_id, status)
        })
        .await
        .map_err(|e| ApiError::from_store(Resource::Stages, e))?;

    info!(project = %project_id, id = stage_id, "stage status updated");
    Ok(Json(stages))
}

/// DELETE /projects/stage/{project_id}/{id}
///
/// Succeeds whether or not the id existed.
pub async fn delete_stage(
    State(state): State<AppState>,
    Path((project_id, id)): Path<(String, String)>,
) -> ApiResult<Vec<Record>> {
    let stage_id = parse_id(&id);
    let mut removed = 0;
    let stages = state
        .store
        .modify(&state.config.stage_file(&project_id), |stages| {
            if let Some(stage_id) = stage_id {
                removed = records::remove(stages, stage_id);
            }
            Ok(())
        })
        .await
        .map_err(|e| ApiError::from_store(Resource::Stages, e))?;

    info!(project = %project_id, id = %id, removed, "stage delete");
    Ok(Json(stages))
}

/// GET /downloads
pub async fn list_downloads(State(state): State<AppState>) -> ApiResult<Vec<Record>> {
    let downloads = state
        .store
        .read(&state.config.downloads_file())
        .await
        .map_err(|e| ApiError::from_store(Resource::Downloads, e))?;
    Ok(Json(downloads))
}

/// POST /downloads
pub async fn upsert_download(
    State(state): State<AppState>,
    Json(download): Json<Record>,
) -> ApiResult<Vec<Record>> {
    let mut outcome = None;
    let downloads = state
        .store
        .modify(&state.config.downloads_file(), |downloads| {
            outcome = Some(records::upsert(downloads, download)?);
            Ok(())
        })
        .await
        .map_err(|e| ApiError::from_store(Resource::Downloads, e))?;

    match outcome {
        Some(Upsert::Appended { id }) => info!(id, "download added"),
        Some(Upsert::Replaced { index }) => info!(index, "download replaced"),
        None => {}
    }
    Ok(Json(downloads))
}

/// DELETE /downloads/{id}
pub async fn delete_download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Record>> {
    let download_id = parse_id(&id);
    let mut removed = 0;
    let downloads = state
        .store
        .modify(&state.config.downloads_file(), |downloads| {
            if let Some(download_id) = download_id {
                removed = records::remove(downloads, download_id);
            }
            Ok(())
        })
        .await
        .map_err(|e| ApiError::from_store(Resource::Downloads, e))?;

    info!(id = %id, removed, "download delete");
    Ok(Json(downloads))
}
