use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::identity::CallerIdentity;
use crate::models::{LotteryDataResponse, MyNumbersResponse, UploadResponse};
use crate::services::lottery_service::PictureUpload;
use crate::utils::validation::{sanitize_filename, validate_picture};
use axum::{
    Extension, Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};

/// Name of the multipart field carrying the picture
pub const PICTURE_FIELD: &str = "picture";

fn form_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Reads the form, requiring exactly one file in the `picture` field.
/// Other fields are skipped.
async fn read_picture_form(
    multipart: &mut Multipart,
    max_file_size: usize,
) -> Result<PictureUpload, AppError> {
    let mut upload: Option<PictureUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        if field.name() != Some(PICTURE_FIELD) {
            continue;
        }

        if upload.is_some() {
            return Err(AppError::BadRequest(format!(
                "only one '{}' file may be uploaded",
                PICTURE_FIELD
            )));
        }

        let original_filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::BadRequest(format!("'{}' must be a file field", PICTURE_FIELD))
            })?;

        let filename = sanitize_filename(&original_filename)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let data = field.bytes().await.map_err(form_error)?.to_vec();
        validate_picture(&data, max_file_size).map_err(|e| {
            if data.len() > max_file_size {
                AppError::PayloadTooLarge(e.to_string())
            } else {
                AppError::BadRequest(e.to_string())
            }
        })?;

        upload = Some(PictureUpload { filename, data });
    }

    upload.ok_or_else(|| {
        AppError::BadRequest(format!("missing required field '{}'", PICTURE_FIELD))
    })
}

#[utoipa::path(
    post,
    path = "/lottery",
    request_body(content = crate::models::PictureForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Picture stored and a number drawn", body = UploadResponse),
        (status = 400, description = "Malformed form or picture already uploaded", body = crate::api::error::ErrorBody),
        (status = 413, description = "Picture too large", body = crate::api::error::ErrorBody),
        (status = 500, description = "Storage failure or no numbers left", body = crate::api::error::ErrorBody)
    ),
    tag = "lottery"
)]
pub async fn upload_lottery(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let upload = read_picture_form(&mut multipart, state.config.max_file_size).await?;
    let outcome = state.lottery.draw(upload, identity.as_str()).await?;

    Ok(Json(UploadResponse {
        message: "Lottery uploaded successfully".to_string(),
        result: outcome.number,
    }))
}

#[utoipa::path(
    post,
    path = "/getlottery",
    responses(
        (status = 200, description = "All drawn numbers and the award numbers", body = LotteryDataResponse),
        (status = 500, description = "Storage failure", body = crate::api::error::ErrorBody)
    ),
    tag = "lottery"
)]
pub async fn get_lottery_data(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<Json<LotteryDataResponse>, AppError> {
    tracing::debug!("Lottery data requested by {}", identity.as_str());

    let removed = state
        .lottery
        .removed_numbers()
        .await
        .map_err(|e| AppError::internal("Error fetching removed data", e))?;

    let award = state
        .lottery
        .award_numbers()
        .await
        .map_err(|e| AppError::internal("Error fetching award data", e))?;

    Ok(Json(LotteryDataResponse { removed, award }))
}

#[utoipa::path(
    post,
    path = "/getMyLotteryNumbers",
    responses(
        (status = 200, description = "Numbers drawn under the caller's identity", body = MyNumbersResponse),
        (status = 500, description = "Storage failure", body = crate::api::error::ErrorBody)
    ),
    tag = "lottery"
)]
pub async fn get_my_lottery_numbers(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<Json<MyNumbersResponse>, AppError> {
    let removed = state
        .lottery
        .numbers_for_session(identity.as_str())
        .await
        .map_err(|e| AppError::internal("Error fetching user's removed numbers", e))?;

    Ok(Json(MyNumbersResponse { removed }))
}
