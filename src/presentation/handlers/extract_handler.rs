// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{Extension, Json};
use std::sync::Arc;
use validator::Validate;

use crate::application::dto::extract_request::{ExtractRequestDto, ExtractResponseDto};
use crate::domain::services::extraction_service::BillExtractionService;
use crate::presentation::errors::AppError;
use crate::utils::errors::ExtractionError;

/// 账单提取端点
///
/// 单请求单响应，无跨请求状态；所有失败通过AppError统一映射
pub async fn extract_bill_data(
    Extension(service): Extension<Arc<BillExtractionService>>,
    Json(payload): Json<ExtractRequestDto>,
) -> Result<Json<ExtractResponseDto>, AppError> {
    payload
        .validate()
        .map_err(|e| ExtractionError::InvalidRequest(e.to_string()))?;

    let outcome = service.extract(&payload.document).await?;

    Ok(Json(ExtractResponseDto {
        is_success: true,
        token_usage: outcome.token_usage,
        data: outcome.data,
    }))
}
