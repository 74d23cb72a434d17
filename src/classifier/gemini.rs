//! Gemini API連携
//!
//! 画像1枚をinline_dataとして送信し、responseSchemaで
//! `{ "object": string, "confidence": number }` の形を要求する

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use classifier_common::{
    parse_classification, response_schema, ClassificationResult, ClassifyError, ImagePayload,
    CLASSIFY_PROMPT, RESPONSE_MIME_TYPE,
};

use super::Classifier;
use crate::config::{Config, CredentialProvider, EnvCredentials};
use crate::error::{AppError, Result};

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// 非2xxステータス
#[derive(Debug, thiserror::Error)]
#[error("Gemini API error: {status}: {body}")]
struct ApiStatusError {
    status: reqwest::StatusCode,
    body: String,
}

/// Gemini分類アダプタ
pub struct GeminiClassifier {
    config: Config,
    credentials: Arc<dyn CredentialProvider>,
    http_client: reqwest::Client,
}

impl GeminiClassifier {
    /// タイムアウト等はreqwestの既定値のまま
    pub fn new(config: Config, credentials: impl CredentialProvider + 'static) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(AppError::Config("model is empty".into()));
        }
        if config.api_base.trim().is_empty() {
            return Err(AppError::Config("api_base is empty".into()));
        }

        let http_client = reqwest::Client::builder().build()?;

        Ok(Self {
            config,
            credentials: Arc::new(credentials),
            http_client,
        })
    }

    /// 環境変数の設定・APIキーで作成
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env(), EnvCredentials::default())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    async fn classify(&self, image: &ImagePayload) -> std::result::Result<ClassificationResult, ClassifyError> {
        // ネットワーク呼び出し前にAPIキーを確認
        let api_key = self.credentials.api_key().ok_or(ClassifyError::Configuration)?;

        let request = build_request(image);
        debug!(
            model = %self.config.model,
            mime = %image.mime(),
            size = image.len(),
            "sending classify request"
        );

        let response = self
            .http_client
            .post(self.config.generate_content_url())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("gemini request failed: {}", e);
                ClassifyError::service(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "gemini api returned error status");
            return Err(ClassifyError::service(ApiStatusError { status, body }));
        }

        let body = response.text().await.map_err(ClassifyError::service)?;
        debug!("gemini response: {} bytes", body.len());

        let text = extract_response_text(&body)?;
        parse_classification(&text)
    }
}

/// リクエスト作成（画像 + 指示文 + スキーマ）
fn build_request(image: &ImagePayload) -> GeminiRequest {
    let data = general_purpose::STANDARD.encode(image.data());

    GeminiRequest {
        contents: vec![Content {
            parts: vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime().as_str().to_string(),
                        data,
                    },
                },
                Part::Text {
                    text: CLASSIFY_PROMPT.to_string(),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: RESPONSE_MIME_TYPE.to_string(),
            response_schema: response_schema(),
        },
    }
}

/// レスポンス本文から生成テキストを取り出す
fn extract_response_text(body: &str) -> std::result::Result<String, ClassifyError> {
    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| ClassifyError::malformed(format!("invalid response body: {}", e)))?;

    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| ClassifyError::malformed("no candidates"))?;

    let text: String = candidate
        .content
        .iter()
        .flat_map(|c| c.parts.iter())
        .filter_map(|p| p.text.as_deref())
        .collect();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        return Err(ClassifyError::malformed(format!(
            "empty response (finishReason: {})",
            reason
        )));
    }

    Ok(text)
}
