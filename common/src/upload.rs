//! アップロード受付
//!
//! ファイル選択・ドラッグ&ドロップのどちらも `UploadControl::submit` に集約する

use tracing::{debug, info};

use crate::error::UploadRejection;
use crate::preview::{PreviewRef, PreviewRegistry};
use crate::types::{FileCandidate, ImageMime, ImagePayload};
use crate::validation::UploadPolicy;

/// 受付済み画像
///
/// 生成後は変更されず、次のアップロードで丸ごと置き換えられる
#[derive(Debug)]
pub struct UploadedImage {
    name: String,
    payload: ImagePayload,
    size: u64,
    preview: PreviewRef,
}

impl UploadedImage {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        self.payload.data()
    }

    pub fn mime(&self) -> ImageMime {
        self.payload.mime()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn preview(&self) -> &PreviewRef {
        &self.preview
    }

    /// アダプタ送信用のデータ（共有クローン）
    pub fn payload(&self) -> ImagePayload {
        self.payload.clone()
    }
}

/// アップロード受付
#[derive(Debug, Clone, Default)]
pub struct UploadControl {
    policy: UploadPolicy,
    previews: PreviewRegistry,
}

impl UploadControl {
    pub fn new(policy: UploadPolicy) -> Self {
        Self {
            policy,
            previews: PreviewRegistry::new(),
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// 候補を検証し、受付可能なら新しいプレビュー参照付きで返す
    pub fn submit(&self, candidate: FileCandidate) -> Result<UploadedImage, UploadRejection> {
        let mime = match self.policy.check(&candidate) {
            Ok(mime) => mime,
            Err(rejection) => {
                debug!(name = %candidate.name, mime = %candidate.mime_type, "upload rejected: {:?}", rejection);
                return Err(rejection);
            }
        };

        let size = candidate.size();
        let preview = self.previews.acquire(&candidate.name);
        info!(name = %candidate.name, %mime, size, "upload accepted");

        Ok(UploadedImage {
            name: candidate.name,
            payload: ImagePayload::new(candidate.bytes, mime),
            size,
            preview,
        })
    }
}
