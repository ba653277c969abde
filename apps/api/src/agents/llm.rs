use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::errors::{AgentError, AgentResult};
use crate::config::{LlmProvider, LlmSettings};

/// HTTP client for the hosted chat model
///
/// Speaks the OpenAI-compatible chat completions API (xAI) or Gemini's
/// `generateContent`, depending on the configured provider.
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    settings: LlmSettings,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> AgentResult<Self> {
        if settings.api_key.is_empty() {
            return Err(AgentError::ConfigError("empty API key".to_string()));
        }

        let http = Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AgentError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, settings })
    }

    pub fn provider(&self) -> LlmProvider {
        self.settings.provider
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Sends one system + user exchange and returns the model's text
    pub async fn complete(&self, system: &str, user: &str) -> AgentResult<String> {
        let request = match self.settings.provider {
            LlmProvider::Xai => self
                .http
                .post(&self.settings.endpoint)
                .header(header::CONTENT_TYPE, "application/json")
                .bearer_auth(&self.settings.api_key)
                .json(&self.chat_request(system, user)),
            LlmProvider::Google => self
                .http
                .post(format!(
                    "{}/models/{}:generateContent",
                    self.settings.endpoint.trim_end_matches('/'),
                    self.settings.model
                ))
                .query(&[("key", self.settings.api_key.as_str())])
                .json(&self.gemini_request(system, user)),
        };

        let response = request
            .send()
            .await
            .map_err(|e| AgentError::LlmError(format!("request failed: {}", e)))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| AgentError::LlmError(format!("unreadable response ({}): {}", status, e)))?;

        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("no error message");
            return Err(AgentError::LlmError(format!("{}: {}", status, message)));
        }

        match self.settings.provider {
            LlmProvider::Xai => parse_chat_completion(body),
            LlmProvider::Google => parse_gemini(body),
        }
    }

    fn chat_request<'a>(&'a self, system: &'a str, user: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.settings.temperature,
        }
    }

    fn gemini_request(&self, system: &str, user: &str) -> Value {
        serde_json::json!({
            "systemInstruction": { "parts": [{ "text": system }] },
            "contents": [{ "role": "user", "parts": [{ "text": user }] }],
            "generationConfig": { "temperature": self.settings.temperature },
        })
    }
}

fn non_empty(text: Option<String>) -> AgentResult<String> {
    text.map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AgentError::LlmError("model returned an empty completion".to_string()))
}

fn parse_chat_completion(body: Value) -> AgentResult<String> {
    let response: ChatCompletionResponse = serde_json::from_value(body)?;
    non_empty(
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content),
    )
}

fn parse_gemini(body: Value) -> AgentResult<String> {
    let response: GeminiResponse = serde_json::from_value(body)?;
    let text = response
        .candidates
        .into_iter()
        .next()
        .map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        });
    non_empty(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(provider: LlmProvider) -> LlmSettings {
        LlmSettings {
            provider,
            api_key: "test-key".to_string(),
            endpoint: provider.default_endpoint().to_string(),
            model: provider.default_model().to_string(),
            temperature: 0.7,
        }
    }

    #[test]
    fn empty_key_is_a_config_error() {
        let mut settings = settings(LlmProvider::Xai);
        settings.api_key.clear();
        assert!(matches!(
            LlmClient::new(settings),
            Err(AgentError::ConfigError(_))
        ));
    }

    #[test]
    fn chat_request_shape() {
        let client = LlmClient::new(settings(LlmProvider::Xai)).unwrap();
        let request = serde_json::to_value(client.chat_request("be brief", "hello")).unwrap();

        assert_eq!(request["model"], "grok-beta");
        assert_eq!(request["messages"][0]["role"], "system");
        assert_eq!(request["messages"][1]["content"], "hello");
    }

    #[test]
    fn gemini_request_shape() {
        let client = LlmClient::new(settings(LlmProvider::Google)).unwrap();
        let request = client.gemini_request("be brief", "hello");

        assert_eq!(request["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(request["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn parses_chat_completion() {
        let body = json!({"choices": [{"message": {"content": " Mock LLM response "}}]});
        assert_eq!(parse_chat_completion(body).unwrap(), "Mock LLM response");
    }

    #[test]
    fn parses_gemini_parts() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "Hello "}, {"text": "office"}]}}]
        });
        assert_eq!(parse_gemini(body).unwrap(), "Hello office");
    }

    #[test]
    fn empty_completion_is_an_error() {
        assert!(matches!(
            parse_chat_completion(json!({"choices": []})),
            Err(AgentError::LlmError(_))
        ));
        assert!(matches!(
            parse_gemini(json!({"candidates": [{"content": {"parts": []}}]})),
            Err(AgentError::LlmError(_))
        ));
    }
}
