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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含服务器、文档下载和Gemini模型服务的所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 文档下载配置
    pub fetcher: FetcherSettings,
    /// Gemini模型服务配置
    pub gemini: GeminiSettings,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 文档下载配置设置
#[derive(Debug, Deserialize)]
pub struct FetcherSettings {
    /// 下载超时时间（秒）
    pub timeout_secs: u64,
}

/// Gemini模型服务配置设置
#[derive(Debug, Deserialize)]
pub struct GeminiSettings {
    /// API密钥（缺失时每个请求以MissingCredential失败）
    pub api_key: Option<String>,
    /// 模型名称
    pub model: String,
    /// API基础URL
    pub api_base_url: String,
    /// 单次调用超时时间（秒）
    pub request_timeout_secs: u64,
    /// 最大尝试次数（含首次请求）
    pub max_attempts: u32,
    /// 限流重试的初始退避时间（毫秒）
    pub retry_base_delay_ms: u64,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default fetcher settings
            .set_default("fetcher.timeout_secs", 10)?
            // Default Gemini settings
            .set_default("gemini.model", "gemini-2.5-flash-preview-09-2025")?
            .set_default(
                "gemini.api_base_url",
                "https://generativelanguage.googleapis.com",
            )?
            .set_default("gemini.request_timeout_secs", 120)?
            .set_default("gemini.max_attempts", 3)?
            .set_default("gemini.retry_base_delay_ms", 1000)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("BILLRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}
