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

use axum::Extension;
use billrs::config::settings::Settings;
use billrs::domain::services::extraction_service::BillExtractionService;
use billrs::domain::services::llm_service::GeminiService;
use billrs::engines::fetch_engine::FetchEngine;
use billrs::presentation::routes;
use billrs::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting billrs...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");
    if settings.gemini.api_key.is_none() {
        // 服务仍可启动，但每个提取请求都会以MissingCredential失败
        warn!("Gemini API key is not configured; extraction requests will fail");
    }

    // 3. Initialize components
    let fetcher = Arc::new(FetchEngine::new(&settings.fetcher)?);
    let llm = Arc::new(GeminiService::new(&settings.gemini)?);
    let extraction_service = Arc::new(BillExtractionService::new(fetcher, llm));
    info!("Extraction pipeline initialized");

    // 4. Start HTTP server
    let app = routes::routes()
        .layer(TraceLayer::new_for_http())
        .layer(Extension(extraction_service));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
