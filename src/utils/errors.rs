// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 提取流水线错误类型
///
/// 覆盖从文档下载到模型输出校验的全部预期失败场景，
/// 由表示层统一映射为HTTP状态码
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// 请求参数无效
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// 模型API密钥未配置
    #[error("Gemini API key is missing. Check the BILLRS__GEMINI__API_KEY environment variable.")]
    MissingCredential,

    /// 文档下载失败
    #[error("DOCUMENT DOWNLOAD FAILED: URL {url}... returned error: {cause}")]
    DocumentDownloadFailed { url: String, cause: String },

    /// 不支持的文档类型
    #[error("Unsupported file type: {0}")]
    UnsupportedDocumentType(String),

    /// 模型服务限流且重试已耗尽
    #[error("LLM API failed after multiple retries.")]
    ExtractionServiceUnavailable,

    /// 模型服务返回不可重试的错误
    #[error("LLM API Error: {message}")]
    ModelService { status: u16, message: String },

    /// 模型响应结构异常
    #[error("LLM returned invalid or unexpected structure: {0}")]
    MalformedModelResponse(String),

    /// 模型输出未通过严格模式校验
    #[error("LLM output failed schema validation: {0}")]
    SchemaViolation(String),
}

impl ExtractionError {
    /// 判断错误是否可重试
    ///
    /// 仅模型服务限流（HTTP 429）可重试，其余错误首次出现即终止
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExtractionError::ModelService { status: 429, .. })
    }
}
