use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Generative-text providers the insight requester can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AiProvider {
    #[default]
    Gemini,
    OpenAi,
    Ollama,
    Anthropic,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
            Self::Anthropic => "anthropic",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434",
            Self::Anthropic => "https://api.anthropic.com",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.0-flash",
            Self::OpenAi => "gpt-4o-mini",
            Self::Ollama => "llama3.2",
            Self::Anthropic => "claude-sonnet-4-20250514",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        match self {
            Self::Gemini | Self::OpenAi | Self::Anthropic => true,
            Self::Ollama => false,
        }
    }
}

impl FromStr for AiProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(()),
        }
    }
}

/// Where the insight requester sends its prompt.
#[derive(Debug, Clone)]
pub struct AiSettings {
    pub provider: AiProvider,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl AiSettings {
    /// The provider's stock endpoint and model, with no API key.
    pub fn for_provider(provider: AiProvider) -> Self {
        Self {
            provider,
            base_url: provider.default_base_url().to_string(),
            api_key: String::new(),
            model: provider.default_model().to_string(),
        }
    }

    /// Replace the endpoint, key or model with any value that is present and not blank.
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        api_key: Option<String>,
        model: Option<String>,
    ) -> Self {
        let non_blank = |v: Option<String>| v.filter(|v| !v.trim().is_empty());
        if let Some(base_url) = non_blank(base_url) {
            self.base_url = base_url;
        }
        if let Some(api_key) = non_blank(api_key) {
            self.api_key = api_key;
        }
        if let Some(model) = non_blank(model) {
            self.model = model;
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
            && !self.model.is_empty()
            && (!self.provider.requires_api_key() || !self.api_key.is_empty())
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        Self::for_provider(AiProvider::default())
    }
}
