// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::time::Duration;

use crate::config::settings::FetcherSettings;
use crate::engines::traits::{DocumentFetcher, FetchedDocument};
use crate::engines::validators;
use crate::utils::errors::ExtractionError;

/// 下载失败详情中URL的最大保留长度
const URL_TRUNCATE_LEN: usize = 50;

/// 文档获取引擎
///
/// 基于reqwest实现的HTTP文档下载引擎，下载后将字节编码为base64
pub struct FetchEngine {
    client: reqwest::Client,
}

impl FetchEngine {
    /// 创建新的获取引擎
    ///
    /// # 参数
    ///
    /// * `settings` - 文档下载配置（超时时间等）
    pub fn new(settings: &FetcherSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; billrs/1.0; +http://billrs.dev)")
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for FetchEngine {
    /// 下载并编码远程文档
    ///
    /// # 参数
    ///
    /// * `url` - 文档URL
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchedDocument)` - 媒体类型与base64编码数据
    /// * `Err(ExtractionError)` - 下载失败或媒体类型不受支持
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, ExtractionError> {
        // SSRF protection
        validators::validate_url(url)
            .await
            .map_err(|e| ExtractionError::InvalidRequest(format!("SSRF protection: {}", e)))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_failed(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_failed(url, format!("HTTP status {}", status)));
        }

        // Media type check happens before the body is read
        let media_type = declared_media_type(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        if !is_supported_media_type(&media_type) {
            return Err(ExtractionError::UnsupportedDocumentType(media_type));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| download_failed(url, e.to_string()))?;

        Ok(FetchedDocument {
            media_type,
            data: BASE64.encode(&bytes),
        })
    }

    /// 引擎名称
    fn name(&self) -> &'static str {
        "fetch"
    }
}

/// 构造下载失败错误，URL截断保留前50个字符
fn download_failed(url: &str, cause: String) -> ExtractionError {
    ExtractionError::DocumentDownloadFailed {
        url: url.chars().take(URL_TRUNCATE_LEN).collect(),
        cause,
    }
}

/// 解析声明的媒体类型，剥离charset等参数
///
/// 缺失Content-Type时按image/jpeg处理
fn declared_media_type(content_type: Option<&str>) -> String {
    let raw = content_type.unwrap_or("image/jpeg");
    raw.split(';').next().unwrap_or(raw).trim().to_string()
}

/// 仅接受image/*与application/pdf
fn is_supported_media_type(media_type: &str) -> bool {
    media_type.starts_with("image/") || media_type == "application/pdf"
}
