pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::LotteryConfig;
use crate::services::lottery_service::LotteryService;
use crate::services::pool::NumberPool;
use crate::services::storage::PictureStore;
use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::lottery::upload_lottery,
        api::handlers::lottery::get_lottery_data,
        api::handlers::lottery::get_my_lottery_numbers,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::PictureForm,
            models::UploadResponse,
            models::LotteryDataResponse,
            models::MyNumbersResponse,
            models::HealthResponse,
            api::error::ErrorBody,
        )
    ),
    tags(
        (name = "lottery", description = "Picture upload and number draw endpoints"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub lottery: Arc<LotteryService>,
    pub config: LotteryConfig,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        pictures: Arc<dyn PictureStore>,
        config: LotteryConfig,
    ) -> anyhow::Result<Self> {
        let pool = NumberPool::new(config.pool_min, config.pool_max)?;
        let lottery = Arc::new(LotteryService::new(
            db.clone(),
            pictures,
            pool,
            config.uploader_label.clone(),
        ));

        Ok(Self {
            db,
            lottery,
            config,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let lottery_routes = Router::new()
        .route(
            "/lottery",
            post(api::handlers::lottery::upload_lottery).layer(
                axum::extract::DefaultBodyLimit::max(
                    state.config.max_file_size + 1024 * 1024, // 1MB buffer for multipart overhead
                ),
            ),
        )
        .route("/getlottery", post(api::handlers::lottery::get_lottery_data))
        .route(
            "/getMyLotteryNumbers",
            post(api::handlers::lottery::get_my_lottery_numbers),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            api::middleware::identity::identity_middleware,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .merge(lottery_routes)
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
