use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart form accepted by `POST /lottery`
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct PictureForm {
    /// The picture file. Exactly one is required.
    #[schema(value_type = String, format = Binary)]
    pub picture: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    /// The drawn number
    pub result: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LotteryDataResponse {
    pub removed: Vec<i32>,
    pub award: Vec<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MyNumbersResponse {
    pub removed: Vec<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub version: String,
}
