use std::sync::OnceLock;

use anyhow::{Context, Result};

const DEFAULT_UI_ORIGIN: &str = "http://127.0.0.1:8000";
pub const REVIEW_PATH: &str = "/api/review";

/// Where the review service lives relative to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiBase {
    /// No override: requests go to the origin that serves the UI.
    SameOrigin,
    Override(String),
}

impl ApiBase {
    /// Empty or whitespace-only overrides mean "same origin".
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(base) if !base.is_empty() => ApiBase::Override(base.trim_end_matches('/').to_string()),
            _ => ApiBase::SameOrigin,
        }
    }
}

/// Client configuration, loaded from environment variables once per process.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: ApiBase,
    pub ui_origin: String,
}

impl ClientConfig {
    pub fn new(api_base: ApiBase, ui_origin: impl Into<String>) -> Self {
        Self {
            api_base,
            ui_origin: ui_origin.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let api_base = ApiBase::resolve(std::env::var("REVIEW_API_BASE").ok().as_deref());
        let ui_origin =
            std::env::var("REVIEW_UI_ORIGIN").unwrap_or_else(|_| DEFAULT_UI_ORIGIN.to_string());

        reqwest::Url::parse(&ui_origin)
            .with_context(|| format!("REVIEW_UI_ORIGIN '{ui_origin}' is not a valid URL"))?;

        Ok(Self::new(api_base, ui_origin))
    }

    /// Process-wide configuration. Resolved on first use and never re-read.
    pub fn global() -> Result<&'static ClientConfig> {
        static CONFIG: OnceLock<ClientConfig> = OnceLock::new();

        if let Some(config) = CONFIG.get() {
            return Ok(config);
        }
        let config = Self::from_env()?;
        Ok(CONFIG.get_or_init(|| config))
    }

    /// Absolute URL of the review endpoint.
    pub fn review_url(&self) -> String {
        match &self.api_base {
            ApiBase::SameOrigin => format!("{}{REVIEW_PATH}", self.ui_origin),
            ApiBase::Override(base) => format!("{base}{REVIEW_PATH}"),
        }
    }
}
