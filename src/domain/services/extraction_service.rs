// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::models::extraction::{ExtractionData, TokenUsage};
use crate::domain::services::aggregation_service;
use crate::domain::services::llm_service::LlmExtractionService;
use crate::domain::services::validation_service;
use crate::engines::traits::DocumentFetcher;
use crate::utils::errors::ExtractionError;

/// 账单提取流水线
///
/// 按固定顺序编排单个请求的处理：凭证检查 → 文档下载 →
/// 模型调用 → 严格校验 → 重算聚合。请求之间无共享可变状态
pub struct BillExtractionService {
    fetcher: Arc<dyn DocumentFetcher>,
    llm: Arc<dyn LlmExtractionService>,
}

/// 流水线输出
///
/// 聚合数据与累计令牌用量，由表示层组装为最终响应
#[derive(Debug)]
pub struct ExtractionOutcome {
    pub data: ExtractionData,
    pub token_usage: TokenUsage,
}

impl BillExtractionService {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, llm: Arc<dyn LlmExtractionService>) -> Self {
        Self { fetcher, llm }
    }

    /// 处理一次提取请求
    ///
    /// # 参数
    ///
    /// * `document_url` - 账单文档URL
    ///
    /// # 返回值
    ///
    /// * `Ok(ExtractionOutcome)` - 完整且内部一致的提取结果
    /// * `Err(ExtractionError)` - 任一环节的预期失败，不存在部分成功
    pub async fn extract(&self, document_url: &str) -> Result<ExtractionOutcome, ExtractionError> {
        // Credential check precedes all outbound I/O
        self.llm.ensure_credential()?;

        let document = self.fetcher.fetch(document_url).await?;
        debug!(
            "Document downloaded via {} engine, media type {}",
            self.fetcher.name(),
            document.media_type
        );

        let (raw_output, token_usage) = self.llm.extract_bill_data(&document).await?;

        let extraction = validation_service::validate_extraction(raw_output)?;
        let data = aggregation_service::reconcile(extraction);

        info!(
            "Extraction complete: {} items, total {}, {} tokens",
            data.total_item_count, data.final_total_extracted, token_usage.total_tokens
        );

        Ok(ExtractionOutcome { data, token_usage })
    }
}
