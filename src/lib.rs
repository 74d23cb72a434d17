//! 画像分類ライブラリ
//!
//! Gemini APIアダプタ、設定、ファイル読み込み、セッションとの結線

pub mod classifier;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod upload;

pub use classifier::{Classifier, GeminiClassifier};
pub use config::{Config, CredentialProvider, EnvCredentials, StaticCredentials};
pub use error::{AppError, Result};
pub use orchestrator::Orchestrator;
pub use upload::{read_candidate, read_candidate_with};
