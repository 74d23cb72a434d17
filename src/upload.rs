use std::path::Path;

use classifier_common::{guess_mime_type, FileCandidate, ImageMime, UploadPolicy, UploadRejection};
use tracing::debug;

/// ファイルを読み込んでアップロード候補にする（既定ポリシー）
pub fn read_candidate(path: &Path) -> Result<FileCandidate, UploadRejection> {
    read_candidate_with(path, &UploadPolicy::default())
}

/// ポリシーで事前検査してから読み込む
///
/// MIMEタイプは拡張子から推定する。形式・サイズはメタデータで判定し、
/// 上限を超えるファイルはメモリに読み込まない。読み込み失敗は空データで続行せずエラーにする。
pub fn read_candidate_with(path: &Path, policy: &UploadPolicy) -> Result<FileCandidate, UploadRejection> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let unreadable = |reason: String| UploadRejection::Unreadable {
        name: name.clone(),
        reason,
    };

    let metadata = std::fs::metadata(path).map_err(|e| unreadable(e.to_string()))?;
    if !metadata.is_file() {
        return Err(unreadable("không phải là tệp".to_string()));
    }

    let mime_type = guess_mime_type(&name);
    if !ImageMime::from_mime_type(&mime_type).is_some_and(|m| policy.accepted.contains(&m)) {
        return Err(UploadRejection::InvalidFormat { mime_type });
    }

    let size = metadata.len();
    if size > policy.max_bytes {
        debug!("skip read {} ({} bytes > {})", path.display(), size, policy.max_bytes);
        return Err(UploadRejection::TooLarge {
            size,
            limit: policy.max_bytes,
        });
    }

    let bytes = std::fs::read(path).map_err(|e| unreadable(e.to_string()))?;

    debug!("read {} ({} bytes)", path.display(), bytes.len());
    Ok(FileCandidate::new(name, mime_type, bytes))
}
