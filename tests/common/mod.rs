#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use http_body_util::BodyExt;
use lottery_backend::config::LotteryConfig;
use lottery_backend::infrastructure::database;
use lottery_backend::services::storage::{NoOpPictureStore, PictureStore};
use lottery_backend::{AppState, create_app};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const BOUNDARY: &str = "---------------------------lotteryboundary4711";

pub async fn setup_test_db() -> DatabaseConnection {
    // One connection, so every query sees the same in-memory database
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    database::run_migrations(&db).await.unwrap();
    db
}

pub fn test_config() -> LotteryConfig {
    LotteryConfig::development()
}

pub async fn setup_app(config: LotteryConfig) -> (Router, DatabaseConnection) {
    setup_app_with_store(config, Arc::new(NoOpPictureStore)).await
}

pub async fn setup_app_with_store(
    config: LotteryConfig,
    pictures: Arc<dyn PictureStore>,
) -> (Router, DatabaseConnection) {
    let db = setup_test_db().await;
    let state = AppState::new(db.clone(), pictures, config).unwrap();
    (create_app(state), db)
}

/// Multipart body with one file part per `(field, filename, bytes)` entry.
pub fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, filename, data) in parts {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
                 Content-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn png_bytes(seed: u8) -> Vec<u8> {
    vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, seed]
}

pub fn upload_request(filename: &str, client_ip: &str) -> Request<Body> {
    let data = png_bytes(1);
    Request::builder()
        .method("POST")
        .uri("/lottery")
        .header("x-forwarded-for", client_ip)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(&[("picture", filename, &data)])))
        .unwrap()
}

pub fn empty_post(uri: &str, client_ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-forwarded-for", client_ip)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    read_json(response).await
}

pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or_else(|_| {
        panic!(
            "non-JSON body with status {}: {}",
            status,
            String::from_utf8_lossy(&body)
        )
    });
    (status, json)
}

pub fn numbers(value: &Value) -> Vec<i64> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect()
}

pub struct MockPictureStore {
    pub files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockPictureStore {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl PictureStore for MockPictureStore {
    async fn save(&self, filename: &str, data: &[u8]) -> anyhow::Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(filename.to_string(), data.to_vec());
        Ok(())
    }

    async fn remove(&self, filename: &str) -> anyhow::Result<()> {
        self.files.lock().unwrap().remove(filename);
        Ok(())
    }

    async fn exists(&self, filename: &str) -> anyhow::Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(filename))
    }
}

/// Mirror that always fails to write, as a full disk would.
pub struct FailingPictureStore;

#[async_trait]
impl PictureStore for FailingPictureStore {
    async fn save(&self, _filename: &str, _data: &[u8]) -> anyhow::Result<()> {
        Err(anyhow!("No space left on device"))
    }

    async fn remove(&self, _filename: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn exists(&self, _filename: &str) -> anyhow::Result<bool> {
        Ok(false)
    }
}
