//! 画像分類の型定義
//!
//! UIとAPIアダプタで共有される型:
//! - ImageMime: 受け付けるMIMEタイプ（JPEG/PNG）
//! - FileCandidate: 検証前のファイル
//! - ImagePayload: アダプタへ渡す画像データ
//! - ClassificationResult: 分類結果（object + confidence）

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;

/// 受付可能な画像形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageMime {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
}

impl ImageMime {
    /// MIMEタイプ文字列から判定（"image/jpg" も JPEG として扱う）
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        match mime_type.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageMime::Jpeg),
            "image/png" => Some(ImageMime::Png),
            _ => None,
        }
    }

    /// 拡張子から判定
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageMime::Jpeg),
            "png" => Some(ImageMime::Png),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ファイル名の拡張子からブラウザの `File.type` 相当のMIMEタイプを推定
///
/// 不明な拡張子は空文字（ブラウザと同じ挙動）
pub fn guess_mime_type(file_name: &str) -> String {
    let ext = file_name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        _ => "",
    }
    .to_string()
}

/// 検証前のアップロード候補
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    /// 申告されたMIMEタイプ（未知の場合は空文字）
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// バイト列から作成（MIMEタイプはファイル名から推定）
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = guess_mime_type(&name);
        Self { name, mime_type, bytes }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// アダプタへ渡す画像データ
///
/// バイト列は `Arc` で共有するため、ワーカースレッドへ渡すクローンは安価
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    data: Arc<[u8]>,
    mime: ImageMime,
}

impl ImagePayload {
    pub fn new(data: impl Into<Arc<[u8]>>, mime: ImageMime) -> Self {
        Self { data: data.into(), mime }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// 分類結果
///
/// `new` を通してのみ生成され、objectは空でなく、confidenceは [0, 1] に収まる
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    object: String,
    confidence: f64,
}

impl ClassificationResult {
    pub fn new(object: impl Into<String>, confidence: f64) -> Result<Self, ClassifyError> {
        let object = object.into();
        if object.trim().is_empty() {
            return Err(ClassifyError::malformed("object is empty"));
        }
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(ClassifyError::malformed(format!(
                "confidence out of range: {}",
                confidence
            )));
        }
        Ok(Self {
            object: object.trim().to_string(),
            confidence,
        })
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}
