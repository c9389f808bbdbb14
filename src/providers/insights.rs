//! Owner insights from an OpenAI-compatible chat-completion API.
//!
//! The model is asked for one JSON object; anything else is a decode
//! error and the caller shows no insights.

use super::{endpoint, strip_code_fence, InsightsProvider};
use crate::config::InsightsConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::models::NarrativeInsights;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub struct ChatInsightsProvider {
    config: InsightsConfig,
    http_client: reqwest::Client,
}

/// Message in the chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat-completion request.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

/// Chat-completion response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

impl ChatInsightsProvider {
    pub fn new(config: &InsightsConfig) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config: config.clone(),
            http_client,
        })
    }

    /// Send a single prompt and return the assistant's reply.
    async fn complete(&self, api_key: &str, prompt: String) -> ProviderResult<String> {
        let url = endpoint(&self.config.base_url, &["v1", "chat", "completions"])?;

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .http_client
            .post(url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(Duration::from_secs(self.config.timeout_seconds))
                } else {
                    ProviderError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::Decode("response had no choices".to_string()))
    }
}

#[async_trait]
impl InsightsProvider for ChatInsightsProvider {
    async fn get(
        &self,
        make: &str,
        model: &str,
        year: Option<u16>,
    ) -> ProviderResult<Option<NarrativeInsights>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ProviderError::NotConfigured("insights API key"))?;

        let prompt = build_prompt(make, model, year);
        debug!("Requesting insights from {}", self.config.model);
        let reply = self.complete(api_key, prompt).await?;

        let insights = parse_insights(&reply)?;
        if insights.is_none() {
            info!("Model had no insights for {} {}", make, model);
        }
        Ok(insights)
    }
}

fn build_prompt(make: &str, model: &str, year: Option<u16>) -> String {
    let vehicle = match year {
        Some(year) => format!("{} {} {}", year, make, model),
        None => format!("{} {} (recent model years)", make, model),
    };

    format!(
        "Summarize what owners say about the {}.\n\
         Respond with ONE JSON object and nothing else, using exactly these keys:\n\
         {{\"summary\": string, \"pros\": [string], \"cons\": [string], \
         \"commonIssues\": [string], \"reliability\": string, \"ownerSentiment\": \"positive\" | \"mixed\" | \"negative\"}}\n\
         If you know nothing about this vehicle, respond with {{\"summary\": \"\"}}.",
        vehicle
    )
}

/// Parse the model's reply. An empty summary means "nothing to say".
fn parse_insights(reply: &str) -> ProviderResult<Option<NarrativeInsights>> {
    let body = strip_code_fence(reply);
    let insights: NarrativeInsights = serde_json::from_str(body)
        .map_err(|e| ProviderError::Decode(format!("insights were not valid JSON: {}", e)))?;

    if insights.summary.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(insights))
    }
}

const SYSTEM_PROMPT: &str = r#"You are an automotive journalist who has read thousands of owner reviews.
Be concrete and balanced. Never invent statistics.
Only output valid JSON, no explanations or markdown."#;
