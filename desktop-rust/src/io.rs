use anyhow::{Context, Result};
use eframe::egui;

use classifier_common::{FileCandidate, UploadPolicy, UploadRejection};
use image_classifier::read_candidate_with;

/// プレビュー表示の最大サイズ
const PREVIEW_MAX: (u32, u32) = (640, 480);

pub struct PreviewPixels {
    pub size: [usize; 2],
    pub pixels: Vec<u8>,
}

/// ドロップされたファイルをアップロード候補にする
///
/// ネイティブではパス、Webではバイト列が入っている
pub fn candidate_from_dropped(
    file: &egui::DroppedFile,
    policy: &UploadPolicy,
) -> Result<FileCandidate, UploadRejection> {
    if let Some(path) = &file.path {
        return read_candidate_with(path, policy);
    }

    let Some(bytes) = &file.bytes else {
        return Err(UploadRejection::Unreadable {
            name: file.name.clone(),
            reason: "không có dữ liệu".to_string(),
        });
    };

    let candidate = if file.mime.is_empty() {
        FileCandidate::from_bytes(file.name.clone(), bytes.to_vec())
    } else {
        FileCandidate::new(file.name.clone(), file.mime.clone(), bytes.to_vec())
    };
    Ok(candidate)
}

/// プレビュー用にデコードして縮小
pub fn decode_preview(data: &[u8]) -> Result<PreviewPixels> {
    let image = image::load_from_memory(data).context("decode preview")?;
    let thumb = image.thumbnail(PREVIEW_MAX.0, PREVIEW_MAX.1);
    let size = [thumb.width() as usize, thumb.height() as usize];
    Ok(PreviewPixels {
        size,
        pixels: thumb.to_rgba8().into_raw(),
    })
}
