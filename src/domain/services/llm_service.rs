// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::warn;

use crate::config::settings::GeminiSettings;
use crate::domain::models::extraction::TokenUsage;
use crate::engines::traits::FetchedDocument;
use crate::utils::errors::ExtractionError;
use crate::utils::retry_policy::RetryPolicy;

/// 提取指令提示词
///
/// 同时作为用户消息与systemInstruction发送，约束page_type枚举
/// 与document_final_total为账单上的原文总额
const EXTRACTION_PROMPT: &str = "You are a highly accurate invoice data extraction specialist. \
    Analyze the entire multi-page bill document and extract ALL line item details, quantities, rates, and amounts. \
    Strictly adhere to the provided JSON schema for the output. \
    The 'page_type' must be one of: 'Bill Detail', 'Final Bill', or 'Pharmacy'. \
    The 'document_final_total' must be the exact grand total amount written on the entire bill document.";

/// 模型提取服务特质
#[async_trait]
pub trait LlmExtractionService: Send + Sync {
    /// 检查凭证是否已配置
    ///
    /// 流水线在任何出站IO之前调用此方法
    fn ensure_credential(&self) -> Result<(), ExtractionError>;

    /// 调用模型从文档中提取账单数据
    ///
    /// 返回模型生成的JSON与本次调用的令牌用量
    async fn extract_bill_data(
        &self,
        document: &FetchedDocument,
    ) -> Result<(Value, TokenUsage), ExtractionError>;
}

/// 单次模型调用的分类结果
///
/// 退避循环只依赖此分类，不检查状态码或错误文本
enum CallOutcome {
    /// 成功，携带生成的JSON与令牌用量
    Success(Value, TokenUsage),
    /// 模型服务限流（HTTP 429），可重试
    Retryable,
    /// 终止性失败，立即向上传播
    Terminal(ExtractionError),
}

/// Gemini模型服务
///
/// 负责与Gemini generateContent API的交互：构造多模态请求、
/// 限流退避重试、解析生成文本与令牌用量
pub struct GeminiService {
    api_key: Option<String>,
    model: String,
    api_base_url: String,
    retry_policy: RetryPolicy,
    client: reqwest::Client,
}

impl GeminiService {
    /// 从配置创建服务实例
    ///
    /// 凭证通过配置注入，不读取任何模块级全局状态
    pub fn new(settings: &GeminiSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_base_url: settings.api_base_url.clone(),
            retry_policy: RetryPolicy::new(
                settings.max_attempts,
                Duration::from_millis(settings.retry_base_delay_ms),
            ),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base_url, self.model
        )
    }

    /// 执行单次模型调用并分类结果
    async fn call_once(&self, api_key: &str, payload: &Value) -> CallOutcome {
        let response = match self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(payload)
            .send()
            .await
        {
            Ok(response) => response,
            // Transport failure carries no model status, treated as terminal
            Err(e) => {
                return CallOutcome::Terminal(ExtractionError::ModelService {
                    status: 500,
                    message: e.to_string(),
                })
            }
        };

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<Value>().await {
                Ok(body) => body["error"]["message"]
                    .as_str()
                    .unwrap_or("Unknown API Error")
                    .to_string(),
                Err(_) => "Unknown API Error".to_string(),
            };
            let err = ExtractionError::ModelService {
                status: status.as_u16(),
                message,
            };
            return if err.is_retryable() {
                CallOutcome::Retryable
            } else {
                CallOutcome::Terminal(err)
            };
        }

        let body: GenerateContentResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                return CallOutcome::Terminal(ExtractionError::MalformedModelResponse(
                    e.to_string(),
                ))
            }
        };

        match parse_generation(body) {
            Ok((data, usage)) => CallOutcome::Success(data, usage),
            Err(e) => CallOutcome::Terminal(e),
        }
    }
}

#[async_trait]
impl LlmExtractionService for GeminiService {
    fn ensure_credential(&self) -> Result<(), ExtractionError> {
        if self.api_key.as_deref().unwrap_or_default().is_empty() {
            return Err(ExtractionError::MissingCredential);
        }
        Ok(())
    }

    async fn extract_bill_data(
        &self,
        document: &FetchedDocument,
    ) -> Result<(Value, TokenUsage), ExtractionError> {
        self.ensure_credential()?;
        let api_key = self.api_key.as_deref().unwrap_or_default();

        let payload = build_payload(document);

        for attempt in 0..self.retry_policy.max_attempts {
            match self.call_once(api_key, &payload).await {
                CallOutcome::Success(data, usage) => return Ok((data, usage)),
                CallOutcome::Terminal(err) => return Err(err),
                CallOutcome::Retryable => {
                    if !self.retry_policy.should_retry(attempt) {
                        break;
                    }
                    let delay = self.retry_policy.calculate_backoff(attempt);
                    warn!(
                        "Gemini API rate limited (HTTP 429), retrying in {:?} (attempt {}/{})",
                        delay,
                        attempt + 1,
                        self.retry_policy.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(ExtractionError::ExtractionServiceUnavailable)
    }
}

/// 构造generateContent请求体
///
/// 内联文档 + 严格responseSchema，模型被约束为只输出合规JSON
fn build_payload(document: &FetchedDocument) -> Value {
    json!({
        "contents": [{
            "parts": [
                {"text": EXTRACTION_PROMPT},
                {"inlineData": {"mimeType": document.media_type, "data": document.data}}
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        },
        "systemInstruction": {"parts": [{"text": EXTRACTION_PROMPT}]}
    })
}

/// 模型输出的声明式schema
///
/// 与LlmExtraction结构一一对应，所有行项目字段均为必填
fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "pagewise_line_items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "page_no": {"type": "string"},
                        "page_type": {
                            "type": "string",
                            "enum": ["Bill Detail", "Final Bill", "Pharmacy"]
                        },
                        "bill_items": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "item_name": {"type": "string"},
                                    "item_amount": {"type": "number"},
                                    "item_rate": {"type": "number"},
                                    "item_quantity": {"type": "number"}
                                },
                                "required": ["item_name", "item_amount", "item_rate", "item_quantity"]
                            }
                        }
                    },
                    "required": ["page_no", "page_type", "bill_items"]
                }
            },
            "document_final_total": {"type": "number"}
        },
        "required": ["pagewise_line_items", "document_final_total"]
    })
}

/// generateContent响应体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// 令牌用量元数据，缺失的计数按0处理
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UsageMetadata {
    prompt_token_count: u64,
    candidates_token_count: u64,
}

/// 从响应体中取出生成的JSON与令牌用量
///
/// 候选缺失或生成文本不是合法JSON均视为模型契约违规
fn parse_generation(body: GenerateContentResponse) -> Result<(Value, TokenUsage), ExtractionError> {
    let usage = body.usage_metadata.unwrap_or_default();

    let text = body
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.first())
        .and_then(|p| p.text.as_deref())
        .ok_or_else(|| {
            ExtractionError::MalformedModelResponse("candidate text is missing".to_string())
        })?;

    let data = serde_json::from_str::<Value>(text).map_err(|e| {
        ExtractionError::MalformedModelResponse(format!("generated text is not valid JSON: {}", e))
    })?;

    Ok((
        data,
        TokenUsage::new(usage.prompt_token_count, usage.candidates_token_count),
    ))
}
