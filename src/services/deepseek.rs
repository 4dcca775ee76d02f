use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::config::Settings;

/// Thin client for a DeepSeek-compatible chat completion endpoint.
#[derive(Debug, Clone)]
pub(crate) struct AiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AiClient {
    /// `None` when no API key is configured; callers fall back to their
    /// local behavior in that case.
    pub(crate) fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        if !settings.ai().is_configured() {
            return Ok(None);
        }

        let timeout = Duration::from_secs(settings.ai().request_timeout_seconds);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Some(Self {
            client,
            api_key: settings.ai().api_key.clone(),
            base_url: settings.ai().base_url.trim_end_matches('/').to_string(),
            model: settings.ai().model.clone(),
        }))
    }

    /// One chat completion round trip, returning the assistant message text.
    pub(crate) async fn chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ],
            "max_tokens": max_tokens,
            "temperature": 0.2,
        });

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to call AI API")?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            anyhow::bail!("AI API error ({status}): {body}");
        }

        let content = body
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|value| value.as_str())
            .context("Missing AI response content")?;

        Ok(content.to_string())
    }
}

/// Parse the JSON payload out of a model reply. Models wrap JSON in ```
/// fences or chat around it, so after stripping fences we fall back to the
/// outermost brace or bracket block.
pub(crate) fn extract_json(raw: &str) -> Option<Value> {
    let mut text = raw.trim().to_string();

    if text.starts_with("```") {
        text = text.trim_start_matches("```json").trim_start_matches("```").to_string();
        if let Some(end) = text.rfind("```") {
            text.truncate(end);
        }
        text = text.trim().to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(&text) {
        return Some(value);
    }

    static JSON_BLOCK: OnceLock<Regex> = OnceLock::new();
    let pattern = JSON_BLOCK
        .get_or_init(|| Regex::new(r"(?s)(\{.*\}|\[.*\])").expect("valid json block pattern"));
    let captured = pattern.find(&text)?;
    serde_json::from_str(captured.as_str()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_parses_plain_payload() {
        let value = extract_json(r#"{"is_correct": true}"#).unwrap();
        assert_eq!(value["is_correct"], Value::Bool(true));
    }

    #[test]
    fn extract_json_strips_code_fences() {
        let raw = "```json\n{\"feedback\": \"Nice work\"}\n```";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["feedback"], "Nice work");
    }

    #[test]
    fn extract_json_finds_block_inside_chatter() {
        let raw = "Sure! Here is the verdict:\n{\"is_correct\": false, \"feedback\": \"Close\"}\nHope that helps.";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["feedback"], "Close");
    }

    #[test]
    fn extract_json_handles_arrays() {
        let raw = "Here you go: [{\"word\": \"serene\"}]";
        let value = extract_json(raw).unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn extract_json_rejects_garbage() {
        assert!(extract_json("no structured data here").is_none());
    }
}
