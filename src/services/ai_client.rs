use crate::error::{AppError, AppResult};
use crate::models::{AiProvider, AiSettings, Transaction, TransactionType};
use crate::services::analytics::CategoryTotals;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT_SECS: u64 = 60;

pub const NO_DATA_MESSAGE: &str = "Add some transactions to get AI-powered insights.";
pub const EMPTY_RESPONSE_MESSAGE: &str = "Unable to generate insights at this time.";
pub const OFFLINE_MESSAGE: &str =
    "The AI financial advisor is currently offline. Please try again later.";

/// A service that turns a prompt into generated prose.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> impl Future<Output = AppResult<String>> + Send;
}

/// Numbers handed to the model. Categories include both income and expense.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InsightSummary {
    pub income: f64,
    pub expense: f64,
    pub categories: CategoryTotals,
}

impl InsightSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut summary = Self::default();
        for t in transactions {
            match t.kind {
                TransactionType::Income => summary.income += t.amount,
                TransactionType::Expense => summary.expense += t.amount,
            }
            summary.categories.add(&t.category, t.amount);
        }
        summary
    }
}

pub fn build_insight_prompt(summary: &InsightSummary) -> AppResult<String> {
    let categories = serde_json::to_string(&summary.categories)?;
    Ok(format!(
        r#"Act as a high-end financial advisor. Analyze these spending patterns for the user:
Total Income: {:.2}
Total Expenses: {:.2}
Category Breakdown: {}

Please provide:
1. A professional summary of their financial health.
2. One specific actionable tip to improve savings.
3. A prediction of where they might be in 3 months if this trend continues.
Keep it encouraging but realistic. Format with Markdown."#,
        summary.income, summary.expense, categories
    ))
}

/// Ask the generator for a narrative about `transactions`. Never fails: every
/// error degrades to a fixed message. One attempt, no retries.
pub async fn request_insight<G: TextGenerator>(generator: &G, transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return NO_DATA_MESSAGE.to_string();
    }

    let summary = InsightSummary::from_transactions(transactions);
    let prompt = match build_insight_prompt(&summary) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "Failed to build insight prompt");
            return OFFLINE_MESSAGE.to_string();
        }
    };

    match generator.generate(&prompt).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => EMPTY_RESPONSE_MESSAGE.to_string(),
        Err(e) => {
            warn!(error = %e, "Insight generation failed");
            OFFLINE_MESSAGE.to_string()
        }
    }
}

/// [`request_insight`] against the configured HTTP provider.
pub async fn request_insight_with_settings(
    settings: &AiSettings,
    transactions: &[Transaction],
) -> String {
    if transactions.is_empty() {
        return NO_DATA_MESSAGE.to_string();
    }
    if !settings.is_configured() {
        warn!(provider = settings.provider.as_str(), "AI provider is not configured");
        return OFFLINE_MESSAGE.to_string();
    }
    match HttpTextGenerator::new(settings.clone()) {
        Ok(generator) => request_insight(&generator, transactions).await,
        Err(e) => {
            warn!(error = %e, "Failed to create AI client");
            OFFLINE_MESSAGE.to_string()
        }
    }
}

/// Create an HTTP client with appropriate timeout
fn create_client() -> AppResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))
}

pub struct HttpTextGenerator {
    settings: AiSettings,
    client: Client,
}

impl HttpTextGenerator {
    pub fn new(settings: AiSettings) -> AppResult<Self> {
        Ok(Self {
            settings,
            client: create_client()?,
        })
    }

    fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }
}

impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        debug!(
            provider = self.settings.provider.as_str(),
            model = %self.settings.model,
            "Sending insight request"
        );
        match self.settings.provider {
            AiProvider::Gemini => self.generate_with_gemini(prompt).await,
            AiProvider::OpenAi => self.generate_with_openai_compatible(prompt).await,
            AiProvider::Ollama => self.generate_with_ollama(prompt).await,
            AiProvider::Anthropic => self.generate_with_anthropic(prompt).await,
        }
    }
}

async fn check_status(response: reqwest::Response, provider: &str) -> AppResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Internal(format!(
        "{} returned {}: {}",
        provider, status, body
    )))
}

impl HttpTextGenerator {
    async fn generate_with_gemini(&self, prompt: &str) -> AppResult<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url(),
            self.settings.model
        );

        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }

        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }

        #[derive(Serialize)]
        struct GeminiRequest<'a> {
            contents: Vec<Content<'a>>,
        }

        #[derive(Deserialize)]
        struct GeminiResponse {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: CandidateContent,
        }

        #[derive(Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<CandidatePart>,
        }

        #[derive(Deserialize)]
        struct CandidatePart {
            text: Option<String>,
        }

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Gemini request failed: {}", e)))?;
        let response = check_status(response, "Gemini").await?;

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse Gemini response: {}", e)))?;

        Ok(gemini_response
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default())
    }

    async fn generate_with_openai_compatible(&self, prompt: &str) -> AppResult<String> {
        let url = format!("{}/chat/completions", self.base_url());

        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct OpenAiRequest<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            temperature: f64,
        }

        #[derive(Deserialize)]
        struct OpenAiResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }

        #[derive(Deserialize)]
        struct ChoiceMessage {
            content: Option<String>,
        }

        let request = OpenAiRequest {
            model: &self.settings.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: 0.7,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.settings.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("OpenAI request failed: {}", e)))?;
        let response = check_status(response, "OpenAI API").await?;

        let openai_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse OpenAI response: {}", e)))?;

        Ok(openai_response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default())
    }

    async fn generate_with_ollama(&self, prompt: &str) -> AppResult<String> {
        let url = format!("{}/api/generate", self.base_url());

        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
            stream: bool,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            response: String,
        }

        let request = OllamaRequest {
            model: &self.settings.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Ollama request failed: {}", e)))?;
        let response = check_status(response, "Ollama").await?;

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(ollama_response.response)
    }

    async fn generate_with_anthropic(&self, prompt: &str) -> AppResult<String> {
        let url = format!("{}/v1/messages", self.base_url());

        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct AnthropicRequest<'a> {
            model: &'a str,
            max_tokens: i32,
            messages: Vec<Message<'a>>,
        }

        #[derive(Deserialize)]
        struct AnthropicResponse {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            text: Option<String>,
        }

        let request = AnthropicRequest {
            model: &self.settings.model,
            max_tokens: 1024,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Anthropic request failed: {}", e)))?;
        let response = check_status(response, "Anthropic API").await?;

        let anthropic_response: AnthropicResponse = response.json().await.map_err(|e| {
            AppError::Internal(format!("Failed to parse Anthropic response: {}", e))
        })?;

        Ok(anthropic_response
            .content
            .first()
            .and_then(|c| c.text.clone())
            .unwrap_or_default())
    }
}
