// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::utils::errors::ExtractionError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口。
/// 预期错误（ExtractionError）按分类映射状态码并透传原始消息；
/// 其余错误仅记录到服务端日志，对调用方返回通用500
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0.downcast_ref::<ExtractionError>() {
            Some(err) => (status_for(err), err.to_string()),
            None => {
                // Never leak internals to the caller
                error!("UNCAUGHT INTERNAL SERVER ERROR: {:?}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UNCAUGHT SERVER ERROR. Check server logs.".to_string(),
                )
            }
        };

        let body = Json(json!({ "is_success": false, "error": message }));
        (status, body).into_response()
    }
}

/// 预期错误到HTTP状态码的映射
fn status_for(err: &ExtractionError) -> StatusCode {
    match err {
        ExtractionError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ExtractionError::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
        ExtractionError::DocumentDownloadFailed { .. } => StatusCode::BAD_REQUEST,
        ExtractionError::UnsupportedDocumentType(_) => StatusCode::BAD_REQUEST,
        ExtractionError::ExtractionServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ExtractionError::ModelService { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
        ExtractionError::MalformedModelResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ExtractionError::SchemaViolation(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
