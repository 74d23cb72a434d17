//! プロンプトとレスポンススキーマ
//!
//! - CLASSIFY_PROMPT: 主要オブジェクト判定の指示文（ベトナム語で回答させる）
//! - response_schema: Geminiの responseSchema（object + confidence の2フィールド固定）

use serde_json::{json, Value};

/// 分類プロンプト
pub const CLASSIFY_PROMPT: &str = r#"Xác định đối tượng chính trong hình ảnh này. Chỉ trả lời bằng một đối tượng JSON có cấu trúc sau: { "object": "tên đối tượng bằng tiếng Việt", "confidence": một số từ 0 đến 1 thể hiện độ tin cậy của bạn }"#;

/// レスポンスのMIMEタイプ
pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// 分類レスポンスのスキーマ
///
/// Gemini API の OpenAPI サブセット形式（type は大文字）
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "object": {
                "type": "STRING",
                "description": "Tên của đối tượng chính được xác định trong hình ảnh, bằng tiếng Việt."
            },
            "confidence": {
                "type": "NUMBER",
                "description": "Một số từ 0 đến 1 thể hiện mức độ tin cậy của dự đoán."
            }
        },
        "required": ["object", "confidence"]
    })
}
