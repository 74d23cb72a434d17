pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// APIキーを探す環境変数（先頭優先）
pub const API_KEY_VARS: &[&str] = &["API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone)]
pub struct Config {
    pub model: String,
    pub api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            api_base: DEFAULT_API_BASE.into(),
        }
    }
}

impl Config {
    /// 環境変数で上書きした設定を読み込む（GEMINI_MODEL, GEMINI_API_BASE）
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(model) = non_empty_var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Some(base) = non_empty_var("GEMINI_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        config
    }

    pub fn generate_content_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// APIキーの提供元
///
/// 分類のたびに問い合わせる（起動時には検証しない）
pub trait CredentialProvider: Send + Sync {
    fn api_key(&self) -> Option<String>;
}

/// 環境変数からAPIキーを読む
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    vars: Vec<String>,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(API_KEY_VARS.iter().copied())
    }
}

impl EnvCredentials {
    pub fn new<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(Into::into).collect(),
        }
    }
}

impl CredentialProvider for EnvCredentials {
    fn api_key(&self) -> Option<String> {
        self.vars.iter().find_map(|name| non_empty_var(name))
    }
}

/// 固定値のAPIキー（テスト・埋め込み用）
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials(pub Option<String>);

impl StaticCredentials {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Some(key.into()))
    }

    pub fn missing() -> Self {
        Self(None)
    }
}

impl CredentialProvider for StaticCredentials {
    fn api_key(&self) -> Option<String> {
        self.0
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    }
}
