//! APIレスポンスパーサー
//!
//! 分類レスポンスを厳密に検証する。フィールドの欠落・型違い・範囲外は
//! すべて MalformedResponse とし、部分的な結果は返さない。

use serde::Deserialize;

use crate::error::{ClassifyError, Result};
use crate::types::ClassificationResult;

/// レスポンスの生の形（両フィールド必須）
#[derive(Debug, Deserialize)]
struct RawPrediction {
    object: String,
    confidence: f64,
}

/// レスポンスからJSON部分を抽出
///
/// ```json ... ``` ブロックがあればその中身、なければ全体（前後の空白除去）
///
/// # Examples
/// ```
/// use classifier_common::extract_json;
///
/// let response = "```json\n{\"object\": \"mèo\"}\n```";
/// assert_eq!(extract_json(response), "{\"object\": \"mèo\"}");
/// ```
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();
    if let Some(start_marker) = trimmed.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = trimmed[start..].find("```") {
            return trimmed[start..start + end_offset].trim();
        }
    }
    trimmed
}

/// 分類レスポンスをパース
///
/// # Arguments
/// * `response` - APIが返したテキスト
///
/// # Returns
/// * `Ok(ClassificationResult)` - 検証済みの結果
/// * `Err(ClassifyError::MalformedResponse)` - JSONでない、フィールド欠落・型違い・範囲外
pub fn parse_classification(response: &str) -> Result<ClassificationResult> {
    let json_str = extract_json(response);
    if json_str.is_empty() {
        return Err(ClassifyError::malformed("empty response"));
    }

    let raw: RawPrediction = serde_json::from_str(json_str)
        .map_err(|e| ClassifyError::malformed(e.to_string()))?;

    ClassificationResult::new(raw.object, raw.confidence)
}
