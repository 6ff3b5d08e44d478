// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 账单行项目
///
/// 模型从账单中提取出的单条明细，所有四个字段必须同时存在，
/// 金额、单价与数量必须为JSON数值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillItem {
    /// 项目名称，与账单原文一致
    pub item_name: String,
    /// 折后净金额
    pub item_amount: f64,
    /// 单价
    pub item_rate: f64,
    /// 数量
    pub item_quantity: f64,
}

/// 页面分类
///
/// 由模型判定，仅允许三个枚举值；枚举外的值视为校验失败
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageType {
    #[serde(rename = "Bill Detail")]
    BillDetail,
    #[serde(rename = "Final Bill")]
    FinalBill,
    #[serde(rename = "Pharmacy")]
    Pharmacy,
}

/// 单页提取结果
///
/// 页面顺序与页内行项目顺序保持文档原序，不做任何重排
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLineItems {
    /// 页码标签（文本，不要求连续数字）
    pub page_no: String,
    /// 页面分类
    pub page_type: PageType,
    /// 该页全部行项目，按文档顺序排列
    pub bill_items: Vec<BillItem>,
}

/// 模型原始提取输出
///
/// document_final_total为模型抄录的账单总额，仅作参考，
/// 最终总额始终由行项目求和重新计算
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmExtraction {
    pub pagewise_line_items: Vec<PageLineItems>,
    pub document_final_total: f64,
}

/// 令牌用量统计
///
/// 累计本次请求内所有模型调用的输入/输出令牌数
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub total_tokens: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            total_tokens: input_tokens + output_tokens,
            input_tokens,
            output_tokens,
        }
    }
}

/// 聚合后的提取数据
///
/// final_total_extracted与total_item_count由重算得出，
/// 与模型自报总额无关
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionData {
    pub pagewise_line_items: Vec<PageLineItems>,
    pub final_total_extracted: f64,
    pub total_item_count: u64,
    pub sub_total_extracted: Option<f64>,
}
