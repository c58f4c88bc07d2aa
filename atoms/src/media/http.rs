use lambda_http::{http::StatusCode, Body, Error as LambdaError, Response};
use thiserror::Error;

use super::error::StoreError;
use super::model::CreateImagePayload;
use super::store::ImageStore;

/// Client-facing detail for every 5xx
pub const INTERNAL_ERROR_DETAIL: &str = "Internal Server Error";

/// Request-level failures. `status_code` is the only place store outcomes
/// become HTTP statuses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Store(StoreError::Connectivity(_) | StoreError::Malformed(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn into_response(self) -> Result<Response<Body>, LambdaError> {
        let status = self.status_code();
        if status.is_server_error() {
            // Full SDK context stays in the logs only
            tracing::error!("❌ store fault: {}", self);
            return detail_response(status, INTERNAL_ERROR_DETAIL);
        }
        detail_response(status, &self.to_string())
    }
}

pub fn json_response(status: StatusCode, body: String) -> Result<Response<Body>, LambdaError> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(body.into())
        .map_err(Box::new)?)
}

/// `{"detail": ...}` error body
pub fn detail_response(status: StatusCode, detail: &str) -> Result<Response<Body>, LambdaError> {
    json_response(status, serde_json::json!({ "detail": detail }).to_string())
}

/// Parse a create body. Missing or null `url` and bad timestamps are validation errors.
pub fn parse_create_payload(body: &[u8]) -> Result<CreateImagePayload, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Validation(e.to_string()))
}

/// HTTP Handler: GET /images
pub async fn list_images_handler(store: &dyn ImageStore) -> Result<Response<Body>, LambdaError> {
    match store.list().await {
        Ok(images) => json_response(StatusCode::OK, serde_json::to_string(&images)?),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// HTTP Handler: POST /add_image
pub async fn create_image_handler(
    store: &dyn ImageStore,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload = match parse_create_payload(body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::info!("📦 rejected add_image body: {}", e);
            return e.into_response();
        }
    };

    match store.insert(payload.url, payload.created_at).await {
        Ok(image) => {
            tracing::info!("✅ created image id={} url={}", image.id, image.url);
            json_response(StatusCode::CREATED, serde_json::to_string(&image)?)
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// HTTP Handler: DELETE /delete_image/{id}
pub async fn delete_image_handler(
    store: &dyn ImageStore,
    image_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match store.delete(image_id).await {
        Ok(()) => {
            tracing::info!("🗑️ deleted image id={}", image_id);
            Ok(Response::builder()
                .status(StatusCode::NO_CONTENT)
                .header("Access-Control-Allow-Origin", "*")
                .body(Body::Empty)
                .map_err(Box::new)?)
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
