use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::response;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("诗词文件不存在: {0}")]
    CorpusNotFound(String),

    #[error("读取文件失败: {0}")]
    CorpusRead(String),

    #[error("不支持的朝代: {0}")]
    UnknownDynasty(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::CorpusNotFound(_) => StatusCode::NOT_FOUND,
            AppError::CorpusRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UnknownDynasty(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        response::error(self.status_code(), self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
