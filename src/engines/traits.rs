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

use crate::utils::errors::ExtractionError;

/// 已下载并编码的文档
///
/// 媒体类型与base64数据分开保存，下游可直接拼装为
/// `data:<mime>;base64,<data>`形式的内联载荷
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// 声明的媒体类型（已剥离参数，如charset）
    pub media_type: String,
    /// 原始字节的base64编码
    pub data: String,
}

/// 文档获取引擎特质
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// 下载并编码远程文档
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, ExtractionError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
