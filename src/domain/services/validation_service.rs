// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::Value;

use crate::domain::models::extraction::LlmExtraction;
use crate::utils::errors::ExtractionError;

/// 严格模式校验模型输出
///
/// 将模型生成的JSON强制转换为LlmExtraction：缺失字段、
/// 类型错误（如字符串形式的数值）或枚举外的page_type
/// 都会使整份文档的结果被拒绝，不接受部分成功
pub fn validate_extraction(data: Value) -> Result<LlmExtraction, ExtractionError> {
    serde_json::from_value(data).map_err(|e| ExtractionError::SchemaViolation(e.to_string()))
}
