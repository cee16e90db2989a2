//! End-to-end tests against a live listener.

use std::path::Path;

use progress_daemon::{api::AppState, config::DaemonConfig, http};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

struct TestServer {
    base: String,
    client: reqwest::Client,
    data: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let data = tempfile::tempdir().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let config = DaemonConfig {
            listen: addr,
            data_dir: data.path().to_path_buf(),
        };
        let app = http::router(AppState::new(config));
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
            data,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn stage_file(&self, project: &str) -> std::path::PathBuf {
        self.data
            .path()
            .join("projects")
            .join(format!("Project{project}"))
            .join("stage.json")
    }

    async fn seed(&self, path: &Path, v: Value) {
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(path, serde_json::to_vec_pretty(&v).unwrap())
            .await
            .unwrap();
    }

    async fn get(&self, path: &str) -> (StatusCode, String) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        (res.status(), res.text().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, String) {
        let res = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        (res.status(), res.text().await.unwrap())
    }

    async fn delete(&self, path: &str) -> (StatusCode, String) {
        let res = self.client.delete(self.url(path)).send().await.unwrap();
        (res.status(), res.text().await.unwrap())
    }
}

fn parse(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn root_says_welcome() {
    let srv = TestServer::start().await;
    let (status, body) = srv.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Welcome to the stages API!");
}

#[tokio::test]
async fn stage_lifecycle_from_empty() {
    let srv = TestServer::start().await;
    srv.seed(&srv.stage_file("1"), json!([])).await;

    let (status, body) = srv.post("/projects/stage/1", json!({"name": "design"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!([{"id": 1, "name": "design"}]));

    let (status, body) = srv.post("/projects/stage/1/1", json!({"status": "done"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!([{"id": 1, "name": "design", "status": "done"}]));

    let (status, body) = srv.delete("/projects/stage/1/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!([]));

    let on_disk = tokio::fs::read_to_string(srv.stage_file("1")).await.unwrap();
    assert_eq!(on_disk, "[]");
}

#[tokio::test]
async fn get_stages_returns_file_contents() {
    let srv = TestServer::start().await;
    let stages = json!([
        {"id": 1, "projectId": 1, "projectName": "Alpha", "status": "done"},
        {"id": 2, "name": "build", "status": "todo"}
    ]);
    srv.seed(&srv.stage_file("1"), stages.clone()).await;

    let (status, body) = srv.get("/projects/stage/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), stages);
}

#[tokio::test]
async fn unknown_project_is_500() {
    let srv = TestServer::start().await;
    let (status, body) = srv.get("/projects/stage/9").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error reading project stages");

    let (status, _) = srv.post("/projects/stage/9", json!({"name": "x"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!srv.stage_file("9").exists());
}

#[tokio::test]
async fn malformed_stage_file_is_500() {
    let srv = TestServer::start().await;
    let path = srv.stage_file("3");
    tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
    tokio::fs::write(&path, b"[{\"id\": ").await.unwrap();

    let (status, body) = srv.get("/projects/stage/3").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error reading project stages");
}

#[tokio::test]
async fn upsert_with_existing_id_replaces_in_place() {
    let srv = TestServer::start().await;
    srv.seed(
        &srv.stage_file("1"),
        json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}, {"id": 3, "name": "c"}]),
    )
    .await;

    let (_, body) = srv
        .post("/projects/stage/1", json!({"id": 2, "name": "B", "status": "wip"}))
        .await;
    assert_eq!(
        parse(&body),
        json!([
            {"id": 1, "name": "a"},
            {"id": 2, "name": "B", "status": "wip"},
            {"id": 3, "name": "c"}
        ])
    );
}

#[tokio::test]
async fn append_uses_last_element_id() {
    let srv = TestServer::start().await;
    srv.seed(&srv.stage_file("1"), json!([{"id": 3}, {"id": 1}])).await;

    let (_, body) = srv.post("/projects/stage/1", json!({"name": "next"})).await;
    let stages = parse(&body);
    assert_eq!(stages[2], json!({"name": "next", "id": 2}));
}

#[tokio::test]
async fn status_update_on_missing_stage_is_404_and_file_untouched() {
    let srv = TestServer::start().await;
    let path = srv.stage_file("1");
    tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
    tokio::fs::write(&path, br#"[{"id":1,"status":"todo"}]"#).await.unwrap();

    let (status, body) = srv.post("/projects/stage/1/5", json!({"status": "done"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Stage not found");

    let (status, _) = srv.post("/projects/stage/1/abc", json!({"status": "done"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(
        tokio::fs::read(&path).await.unwrap(),
        br#"[{"id":1,"status":"todo"}]"#.to_vec()
    );
}

#[tokio::test]
async fn path_id_uses_leading_integer() {
    let srv = TestServer::start().await;
    srv.seed(&srv.stage_file("1"), json!([{"id": 1, "name": "a"}, {"id": 2, "name": "b"}])).await;

    let (status, body) = srv.post("/projects/stage/1/1abc", json!({"status": "done"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)[0], json!({"id": 1, "name": "a", "status": "done"}));

    let (status, body) = srv.delete("/projects/stage/1/2.5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!([{"id": 1, "name": "a", "status": "done"}]));
}

#[tokio::test]
async fn append_after_largest_id_is_500() {
    let srv = TestServer::start().await;
    let path = srv.stage_file("1");
    srv.seed(&path, json!([{"id": 9223372036854775807_i64}])).await;
    let before = tokio::fs::read(&path).await.unwrap();

    let (status, body) = srv.post("/projects/stage/1", json!({"name": "x"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error saving project stages");
    assert_eq!(tokio::fs::read(&path).await.unwrap(), before);
}

#[tokio::test]
async fn deleting_missing_stage_returns_unchanged_list() {
    let srv = TestServer::start().await;
    srv.seed(&srv.stage_file("1"), json!([{"id": 1, "name": "a"}])).await;

    for _ in 0..2 {
        let (status, body) = srv.delete("/projects/stage/1/7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body), json!([{"id": 1, "name": "a"}]));
    }
}

#[tokio::test]
async fn list_projects_skips_dirs_without_stage_file() {
    let srv = TestServer::start().await;
    srv.seed(
        &srv.stage_file("1"),
        json!([{"id": 1, "projectId": 1, "projectName": "Alpha"}]),
    )
    .await;
    tokio::fs::create_dir_all(srv.data.path().join("projects").join("Project2"))
        .await
        .unwrap();

    let (status, body) = srv.get("/projects").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!([{"projectId": 1, "projectName": "Alpha"}]));
}

#[tokio::test]
async fn list_projects_without_root_is_500() {
    let srv = TestServer::start().await;
    let (status, body) = srv.get("/projects").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error reading projects directory");
}

#[tokio::test]
async fn downloads_crud() {
    let srv = TestServer::start().await;
    let file = srv.data.path().join("downloads.json");
    srv.seed(&file, json!([])).await;

    let (_, body) = srv
        .post("/downloads", json!({"title": "Manual", "url": "/files/manual.pdf"}))
        .await;
    assert_eq!(parse(&body), json!([{"title": "Manual", "url": "/files/manual.pdf", "id": 1}]));

    let (_, body) = srv.post("/downloads", json!({"title": "Datasheet"})).await;
    assert_eq!(parse(&body).as_array().unwrap().len(), 2);

    let (_, body) = srv
        .post("/downloads", json!({"id": 1, "title": "Manual v2"}))
        .await;
    assert_eq!(parse(&body)[0], json!({"id": 1, "title": "Manual v2"}));

    let (status, body) = srv.delete("/downloads/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!([{"title": "Datasheet", "id": 2}]));

    let (_, body) = srv.get("/downloads").await;
    assert_eq!(parse(&body), json!([{"title": "Datasheet", "id": 2}]));

    let on_disk = tokio::fs::read_to_string(&file).await.unwrap();
    assert!(on_disk.starts_with("[\n  {\n    \"title\": \"Datasheet\""));
}

#[tokio::test]
async fn missing_downloads_file_is_500() {
    let srv = TestServer::start().await;
    let (status, body) = srv.get("/downloads").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error reading downloads");
}

#[tokio::test]
async fn concurrent_stage_posts_all_land() {
    let srv = TestServer::start().await;
    srv.seed(&srv.stage_file("1"), json!([])).await;

    let mut tasks = Vec::new();
    for i in 0..10 {
        let client = srv.client.clone();
        let url = srv.url("/projects/stage/1");
        tasks.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({"name": format!("stage-{i}")}))
                .send()
                .await
                .unwrap()
                .status()
        }));
    }
    for t in tasks {
        assert_eq!(t.await.unwrap(), StatusCode::OK);
    }

    let (_, body) = srv.get("/projects/stage/1").await;
    let mut ids: Vec<i64> = parse(&body)
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
}
