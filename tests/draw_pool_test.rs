mod common;

use axum::http::StatusCode;
use common::*;
use lottery_backend::entities::prelude::*;
use lottery_backend::services::storage::{LocalPictureStore, PictureStore};
use sea_orm::{EntityTrait, PaginatorTrait};
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test]
async fn test_single_number_pool() {
    let mut config = test_config();
    config.pool_min = 1;
    config.pool_max = 1;
    let (app, db) = setup_app(config).await;

    let (status, json) = send(&app, upload_request("only.png", "10.0.0.1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"], 1);

    let (status, json) = send(&app, upload_request("another.png", "10.0.0.1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "No numbers left to draw");

    assert_eq!(Lotteries::find().count(&db).await.unwrap(), 1);
    assert_eq!(Removeds::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_full_pool_then_exhaustion() {
    let (app, db) = setup_app(test_config()).await;

    let mut drawn = HashSet::new();
    for i in 0..40 {
        let (status, json) =
            send(&app, upload_request(&format!("pic-{}.png", i), "10.0.0.1")).await;
        assert_eq!(status, StatusCode::OK, "upload {} failed: {}", i, json);
        drawn.insert(json["result"].as_i64().unwrap());
    }
    assert_eq!(drawn, (1..=40).collect::<HashSet<i64>>());

    let (status, _) = send(&app, upload_request("pic-40.png", "10.0.0.1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(Lotteries::find().count(&db).await.unwrap(), 40);
    assert_eq!(Removeds::find().count(&db).await.unwrap(), 40);

    let (_, json) = send(&app, empty_post("/getlottery", "10.0.0.1")).await;
    let listed: HashSet<i64> = numbers(&json["removed"]).into_iter().collect();
    assert_eq!(listed, drawn);
}

#[tokio::test]
async fn test_custom_pool_range() {
    let mut config = test_config();
    config.pool_min = 100;
    config.pool_max = 102;
    let (app, _db) = setup_app(config).await;

    let mut drawn = HashSet::new();
    for i in 0..3 {
        let (status, json) = send(&app, upload_request(&format!("r{}.png", i), "10.0.0.1")).await;
        assert_eq!(status, StatusCode::OK);
        drawn.insert(json["result"].as_i64().unwrap());
    }
    assert_eq!(drawn, [100, 101, 102].into_iter().collect());
}

#[tokio::test]
async fn test_picture_is_mirrored_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(LocalPictureStore::new(dir.path()));
    let mut config = test_config();
    config.mirror_uploads = true;
    config.upload_dir = dir.path().to_path_buf();
    let (app, _db) = setup_app_with_store(config, store.clone()).await;

    let (status, _) = send(&app, upload_request("mirror.png", "10.0.0.1")).await;
    assert_eq!(status, StatusCode::OK);

    assert!(store.exists("mirror.png").await.unwrap());
    assert_eq!(
        std::fs::read(dir.path().join("mirror.png")).unwrap(),
        png_bytes(1)
    );
}

#[tokio::test]
async fn test_mirror_failure_rolls_back_the_draw() {
    let (app, db) = setup_app_with_store(test_config(), Arc::new(FailingPictureStore)).await;

    let (status, json) = send(&app, upload_request("lost.png", "10.0.0.1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Error saving file");
    assert!(json["details"].as_str().unwrap().contains("No space left"));

    assert_eq!(Lotteries::find().count(&db).await.unwrap(), 0);
    assert_eq!(Removeds::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_rejected_upload_leaves_no_mirror_file() {
    let store = Arc::new(MockPictureStore::new());
    let (app, _db) = setup_app_with_store(test_config(), store.clone()).await;

    let (status, _) = send(&app, upload_request("keep.png", "10.0.0.1")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, upload_request("keep.png", "10.0.0.2")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let files = store.files.lock().unwrap();
    assert_eq!(files.len(), 1);
    assert!(files.contains_key("keep.png"));
}
