mod gemini;

pub use gemini::GeminiClassifier;

use std::sync::Arc;

use async_trait::async_trait;
use classifier_common::{ClassificationResult, ClassifyError, ImagePayload};

/// 画像分類アダプタ
///
/// 1回の呼び出しにつき外部サービスへの送信は1回のみ（リトライなし）
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: &ImagePayload) -> Result<ClassificationResult, ClassifyError>;
}

#[async_trait]
impl<T: Classifier + ?Sized> Classifier for Arc<T> {
    async fn classify(&self, image: &ImagePayload) -> Result<ClassificationResult, ClassifyError> {
        (**self).classify(image).await
    }
}
