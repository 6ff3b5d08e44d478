// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::models::extraction::{ExtractionData, TokenUsage};

/// 提取请求体
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ExtractRequestDto {
    /// 账单文档URL
    #[validate(url)]
    pub document: String,
}

/// 提取响应体
///
/// is_success为true时data完整且内部一致；失败走统一错误响应
#[derive(Debug, Deserialize, Serialize)]
pub struct ExtractResponseDto {
    pub is_success: bool,
    pub token_usage: TokenUsage,
    pub data: ExtractionData,
}
