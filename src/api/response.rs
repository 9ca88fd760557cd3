use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Uniform response envelope: `{code, data}` on success, `{code, message}`
/// on failure. `code` mirrors the HTTP status so browser clients can branch
/// on the body alone.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn success<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::OK,
        Json(ApiResponse {
            code: StatusCode::OK.as_u16(),
            data: Some(data),
            message: None,
        }),
    )
}

pub fn error(
    status: StatusCode,
    message: String,
) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    (
        status,
        Json(ApiResponse {
            code: status.as_u16(),
            data: None,
            message: Some(message),
        }),
    )
}
