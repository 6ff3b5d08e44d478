// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::Extension;
use axum_test::TestServer;
use billrs::config::settings::{FetcherSettings, GeminiSettings};
use billrs::domain::services::extraction_service::BillExtractionService;
use billrs::domain::services::llm_service::GeminiService;
use billrs::engines::fetch_engine::FetchEngine;
use billrs::presentation::routes;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::MockServer;

pub struct TestApp {
    pub server: TestServer,
    pub document_server: MockServer,
    pub gemini_server: MockServer,
}

/// 测试期间关闭SSRF保护，否则无法访问本机的mock服务器
pub fn disable_ssrf_protection() {
    std::env::set_var("BILLRS_DISABLE_SSRF_PROTECTION", "true");
}

pub async fn create_test_app(api_key: Option<&str>) -> TestApp {
    disable_ssrf_protection();

    let document_server = MockServer::start().await;
    let gemini_server = MockServer::start().await;

    let fetcher_settings = FetcherSettings { timeout_secs: 5 };
    let gemini_settings = GeminiSettings {
        api_key: api_key.map(|k| k.to_string()),
        model: "gemini-test".to_string(),
        api_base_url: gemini_server.uri(),
        request_timeout_secs: 5,
        max_attempts: 3,
        // 测试中压缩退避时间
        retry_base_delay_ms: 10,
    };

    let fetcher = Arc::new(FetchEngine::new(&fetcher_settings).expect("fetch engine"));
    let llm = Arc::new(GeminiService::new(&gemini_settings).expect("gemini service"));
    let extraction_service = Arc::new(BillExtractionService::new(fetcher, llm));

    let app = routes::routes().layer(Extension(extraction_service));
    let server = TestServer::new(app).expect("test server");

    TestApp {
        server,
        document_server,
        gemini_server,
    }
}

impl TestApp {
    /// 待提取文档的URL（指向文档mock服务器）
    pub fn document_url(&self) -> String {
        format!("{}/bill.pdf", self.document_server.uri())
    }
}

/// 构造Gemini generateContent成功响应体
pub fn generation_body(generated: &Value, prompt_tokens: u64, output_tokens: u64) -> Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": generated.to_string()}]}
        }],
        "usageMetadata": {
            "promptTokenCount": prompt_tokens,
            "candidatesTokenCount": output_tokens
        }
    })
}

/// 规格示例文档：两页三项，模型自报总额故意给错
pub fn example_extraction_output() -> Value {
    json!({
        "pagewise_line_items": [
            {
                "page_no": "1",
                "page_type": "Bill Detail",
                "bill_items": [
                    {"item_name": "A", "item_amount": 100.00, "item_rate": 100.00, "item_quantity": 1.0},
                    {"item_name": "B", "item_amount": 50.50, "item_rate": 50.50, "item_quantity": 1.0}
                ]
            },
            {
                "page_no": "2",
                "page_type": "Pharmacy",
                "bill_items": [
                    {"item_name": "C", "item_amount": 25.25, "item_rate": 25.25, "item_quantity": 1.0}
                ]
            }
        ],
        "document_final_total": 999.99
    })
}
