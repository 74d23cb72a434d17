//! 結果表示モデル
//!
//! SessionStateから描画用の値を作るだけで副作用はない

use crate::session::SessionState;

pub const TITLE: &str = "Hệ thống Phân loại Hình ảnh";
pub const SUBTITLE: &str = "Tải lên hình ảnh để Gemini AI phân tích";
pub const UPLOAD_PROMPT: &str = "Tải lên một tệp hoặc kéo và thả";
pub const UPLOAD_FORMATS: &str = "PNG, JPG, JPEG";
pub const IDLE_HEADLINE: &str = "Chưa có kết quả";
pub const IDLE_HINT: &str = "Tải lên một hình ảnh và nhấn \"Phân loại\" để bắt đầu.";
pub const LOADING_TEXT: &str = "Đang phân tích hình ảnh...";
pub const ERROR_HEADLINE: &str = "Đã xảy ra lỗi";
pub const RESULT_HEADLINE: &str = "Kết quả dự đoán";
pub const OBJECT_LABEL: &str = "Đối tượng";
pub const CONFIDENCE_LABEL: &str = "Độ chính xác";

/// 信頼度の色分け
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// >75% High, >50% Medium, それ以外 Low
    pub fn from_percent(percent: u8) -> Self {
        if percent > 75 {
            ConfidenceTier::High
        } else if percent > 50 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
        }
    }
}

/// 信頼度（0..=1）を四捨五入したパーセント値に変換
pub fn confidence_percent(confidence: f64) -> u8 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// 分類ボタンのラベル
pub fn classify_button_label(is_loading: bool) -> &'static str {
    if is_loading {
        "Đang xử lý..."
    } else {
        "Phân loại Hình ảnh"
    }
}

/// 描画用の状態
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    Idle,
    Loading,
    Error {
        message: String,
    },
    Result {
        object: String,
        percent: u8,
        tier: ConfidenceTier,
    },
}

impl ResultView {
    pub fn from_state(state: &SessionState) -> Self {
        match state {
            SessionState::Idle => ResultView::Idle,
            SessionState::Loading => ResultView::Loading,
            SessionState::Error(message) => ResultView::Error {
                message: message.clone(),
            },
            SessionState::Result(result) => {
                let percent = confidence_percent(result.confidence());
                ResultView::Result {
                    object: result.object().to_string(),
                    percent,
                    tier: ConfidenceTier::from_percent(percent),
                }
            }
        }
    }
}
