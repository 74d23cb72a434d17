//! エラー型定義
//!
//! - UploadRejection: アップロード時の検証エラー（再アップロードで回復可能）
//! - ClassifyError: 分類処理のエラー（設定・通信・レスポンス不正）
//!
//! Displayはそのままユーザー向けメッセージとして画面に表示される

use thiserror::Error;

/// 下位エラーのラップ用
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// アップロード検証エラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("Định dạng tệp không hợp lệ. Vui lòng chọn tệp .jpg, .jpeg, hoặc .png.")]
    InvalidFormat { mime_type: String },

    #[error("Kích thước tệp quá lớn. Vui lòng chọn tệp nhỏ hơn 10MB.")]
    TooLarge { size: u64, limit: u64 },

    #[error("Không thể đọc tệp {name}: {reason}")]
    Unreadable { name: String, reason: String },
}

/// 分類エラー
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// APIキー未設定（ネットワーク呼び出し前に検出）
    #[error("API_KEY is not configured. Please set the API_KEY environment variable.")]
    Configuration,

    /// 通信エラー・非2xxステータス（原因は保持するが表示は汎用メッセージ）
    #[error("Không thể phân loại hình ảnh. Vui lòng thử lại.")]
    Service {
        #[source]
        source: BoxError,
    },

    /// APIレスポンスが契約どおりのJSONでない
    #[error("Phản hồi từ API không hợp lệ: {0}")]
    MalformedResponse(String),
}

impl ClassifyError {
    pub fn service(source: impl Into<BoxError>) -> Self {
        ClassifyError::Service { source: source.into() }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        ClassifyError::MalformedResponse(detail.into())
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, ClassifyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_invalid_format_message() {
        let err = UploadRejection::InvalidFormat { mime_type: "image/gif".to_string() };
        let display = format!("{}", err);
        assert!(display.contains(".jpg"));
        assert!(display.contains(".png"));
    }

    #[test]
    fn test_too_large_message() {
        let err = UploadRejection::TooLarge { size: 11 * 1024 * 1024, limit: 10 * 1024 * 1024 };
        assert!(format!("{}", err).contains("10MB"));
    }

    #[test]
    fn test_service_error_hides_cause_but_keeps_source() {
        let io_error = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ClassifyError::service(io_error);

        assert_eq!(format!("{}", err), "Không thể phân loại hình ảnh. Vui lòng thử lại.");
        let source = err.source().expect("sourceが保持されていない");
        assert!(source.to_string().contains("refused"));
    }

    #[test]
    fn test_malformed_message_includes_detail() {
        let err = ClassifyError::malformed("missing field `confidence`");
        let display = format!("{}", err);
        assert!(display.contains("không hợp lệ"));
        assert!(display.contains("confidence"));
    }

    #[test]
    fn test_configuration_message() {
        let display = format!("{}", ClassifyError::Configuration);
        assert!(display.contains("API_KEY"));
    }

    #[test]
    fn test_error_debug() {
        let err = UploadRejection::Unreadable { name: "a.png".to_string(), reason: "テスト".to_string() };
        let debug = format!("{:?}", err);
        assert!(debug.contains("Unreadable"));
        assert!(debug.contains("テスト"));
    }
}
