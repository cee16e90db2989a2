use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::{self, AppState};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::welcome))
        .route("/projects", get(api::list_projects))
        .route(
            "/projects/stage/{project_id}",
            get(api::get_stages).post(api::upsert_stage),
        )
        .route(
            "/projects/stage/{project_id}/{id}",
            post(api::update_stage_status).delete(api::delete_stage),
        )
        .route(
            "/downloads",
            get(api::list_downloads).post(api::upsert_download),
        )
        .route("/downloads/{id}", delete(api::delete_download))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
