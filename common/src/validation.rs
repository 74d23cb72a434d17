//! アップロード検証ルール
//!
//! 検証順序: 1. MIMEタイプ  2. サイズ上限  3. 空ファイル

use crate::error::UploadRejection;
use crate::types::{FileCandidate, ImageMime};

/// アップロード上限（10 MiB）
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// ファイル選択ダイアログのフィルタ用拡張子
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// アップロード検証ポリシー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub accepted: Vec<ImageMime>,
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            accepted: vec![ImageMime::Jpeg, ImageMime::Png],
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    /// 候補を検証し、受付可能ならMIMEタイプを返す
    pub fn check(&self, candidate: &FileCandidate) -> Result<ImageMime, UploadRejection> {
        let mime = ImageMime::from_mime_type(&candidate.mime_type)
            .filter(|m| self.accepted.contains(m))
            .ok_or_else(|| UploadRejection::InvalidFormat {
                mime_type: candidate.mime_type.clone(),
            })?;

        let size = candidate.size();
        if size > self.max_bytes {
            return Err(UploadRejection::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        // 空データをそのまま送信しない
        if size == 0 {
            return Err(UploadRejection::Unreadable {
                name: candidate.name.clone(),
                reason: "tệp rỗng".to_string(),
            });
        }

        Ok(mime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(mime: &str, size: usize) -> FileCandidate {
        FileCandidate::new("test", mime, vec![0u8; size])
    }

    #[test]
    fn test_accepts_jpeg_and_png() {
        let policy = UploadPolicy::default();
        assert_eq!(policy.check(&candidate("image/jpeg", 10)), Ok(ImageMime::Jpeg));
        assert_eq!(policy.check(&candidate("image/jpg", 10)), Ok(ImageMime::Jpeg));
        assert_eq!(policy.check(&candidate("image/png", 10)), Ok(ImageMime::Png));
    }

    #[test]
    fn test_rejects_other_formats() {
        let policy = UploadPolicy::default();
        for mime in ["image/gif", "image/webp", "application/pdf", "text/plain", ""] {
            let result = policy.check(&candidate(mime, 10));
            assert!(
                matches!(result, Err(UploadRejection::InvalidFormat { .. })),
                "{} が拒否されていない",
                mime
            );
        }
    }

    #[test]
    fn test_size_limit_boundary() {
        let policy = UploadPolicy::default();
        let limit = MAX_UPLOAD_BYTES as usize;
        assert!(policy.check(&candidate("image/png", limit)).is_ok());

        let result = policy.check(&candidate("image/png", limit + 1));
        assert_eq!(
            result,
            Err(UploadRejection::TooLarge {
                size: MAX_UPLOAD_BYTES + 1,
                limit: MAX_UPLOAD_BYTES,
            })
        );
    }

    #[test]
    fn test_format_checked_before_size() {
        let policy = UploadPolicy::default();
        let result = policy.check(&candidate("image/gif", MAX_UPLOAD_BYTES as usize + 1));
        assert!(matches!(result, Err(UploadRejection::InvalidFormat { .. })));
    }

    #[test]
    fn test_empty_file_rejected() {
        let policy = UploadPolicy::default();
        let result = policy.check(&candidate("image/jpeg", 0));
        assert!(matches!(result, Err(UploadRejection::Unreadable { .. })));
    }

    #[test]
    fn test_custom_policy() {
        let policy = UploadPolicy {
            accepted: vec![ImageMime::Png],
            max_bytes: 4,
        };
        assert!(matches!(
            policy.check(&candidate("image/jpeg", 2)),
            Err(UploadRejection::InvalidFormat { .. })
        ));
        assert!(matches!(
            policy.check(&candidate("image/png", 5)),
            Err(UploadRejection::TooLarge { .. })
        ));
    }
}
