use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

pub mod prompts;

use crate::adgroups::KeywordClassifier;
use crate::error::AdSmartError;
use crate::scraper::SiteContent;

const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Chat-completion client for seed keyword generation and keyword
/// categorization. The API key is injected at construction; no ambient
/// environment access.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            api_key: api_key.into(),
            client,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Generate seed keywords from scraped brand and competitor content
    pub async fn generate_seed_keywords(
        &self,
        brand: &SiteContent,
        competitor: &SiteContent,
    ) -> Result<Vec<String>> {
        let prompt = prompts::seed_keywords_prompt(brand, competitor);
        let content = self.chat(&prompt, 0.7, 500).await?;

        let json_str = extract_json_array(&content)
            .ok_or_else(|| AdSmartError::llm("no JSON array in seed keyword response"))?;
        let keywords: Vec<String> = serde_json::from_str(json_str)
            .map_err(|e| AdSmartError::llm(format!("malformed seed keyword array: {e}")))?;

        info!("LLM generated {} seed keywords", keywords.len());
        Ok(keywords)
    }

    async fn chat(&self, prompt: &str, temperature: f64, max_tokens: u32) -> Result<String> {
        debug!("Sending chat completion request ({} chars)", prompt.len());

        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(OPENAI_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdSmartError::HttpRequest {
                url: OPENAI_ENDPOINT.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AdSmartError::llm("chat completion returned no choices"))?;

        Ok(content.trim().to_string())
    }
}

/// `KeywordClassifier` backed by the chat completion API. Any failure or
/// malformed output surfaces as an error; the categorizer repairs it with
/// the rule-based fallback.
pub struct LlmClassifier {
    client: OpenAiClient,
}

impl LlmClassifier {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KeywordClassifier for LlmClassifier {
    async fn classify(&self, keywords: &[String]) -> Result<HashMap<String, Vec<String>>> {
        let prompt = prompts::categorize_prompt(keywords);
        let content = self.client.chat(&prompt, 0.3, 1000).await?;

        let json_str = extract_json_object(&content)
            .ok_or_else(|| AdSmartError::classification("no JSON object in response"))?;
        let categorized: HashMap<String, Vec<String>> = serde_json::from_str(json_str)
            .map_err(|e| AdSmartError::classification(format!("malformed category map: {e}")))?;

        Ok(categorized)
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

/// First bracketed JSON array in a completion that may carry prose around it
fn extract_json_array(content: &str) -> Option<&str> {
    let start = content.find('[')?;
    let end = content.rfind(']')?;
    (end > start).then(|| &content[start..=end])
}

/// First braced JSON object in a completion that may carry prose around it
fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_array_with_surrounding_prose() {
        let content = "Here are the keywords:\n[\"a\", \"b\"]\nHope this helps!";
        let extracted = extract_json_array(content).unwrap();
        let keywords: Vec<String> = serde_json::from_str(extracted).unwrap();
        assert_eq!(keywords, vec!["a", "b"]);
    }

    #[test]
    fn test_extract_json_array_missing() {
        assert!(extract_json_array("no json here").is_none());
        assert!(extract_json_array("] backwards [").is_none());
    }

    #[test]
    fn test_extract_json_object_with_surrounding_prose() {
        let content = "Sure! {\"brand_terms\": [\"acme\"]} Done.";
        let extracted = extract_json_object(content).unwrap();
        let map: HashMap<String, Vec<String>> = serde_json::from_str(extracted).unwrap();
        assert_eq!(map["brand_terms"], vec!["acme"]);
    }

    #[test]
    fn test_extract_json_object_missing() {
        assert!(extract_json_object("nothing structured").is_none());
    }
}
