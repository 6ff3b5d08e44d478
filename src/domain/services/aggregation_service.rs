// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::extraction::{ExtractionData, LlmExtraction};

/// 重算聚合结果
///
/// 按页序、页内项序逐项累加金额与条目数。模型自报的
/// document_final_total不参与计算；舍入仅在最终总额上执行一次，
/// 中间和不单独舍入。纯函数，不修改输入顺序
pub fn reconcile(extraction: LlmExtraction) -> ExtractionData {
    let mut cumulative_total: f64 = 0.0;
    let mut item_count: u64 = 0;

    for page in &extraction.pagewise_line_items {
        for item in &page.bill_items {
            cumulative_total += item.item_amount;
            item_count += 1;
        }
    }

    ExtractionData {
        pagewise_line_items: extraction.pagewise_line_items,
        final_total_extracted: round2(cumulative_total),
        total_item_count: item_count,
        sub_total_extracted: None,
    }
}

/// 四舍五入到小数点后两位
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
