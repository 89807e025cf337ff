//! OpenAI Responses API client.

use prospectus_core::{ConversationMessage, Effort, Error, InferenceProvider, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

fn env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-5-mini";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Build from the environment. A missing `OPENAI_API_KEY` is a caller
    /// error; base URL and model have defaults
    /// (`PROSPECTUS_OPENAI_BASE_URL`, `PROSPECTUS_MODEL` override).
    pub fn from_env(client: reqwest::Client) -> Result<Self> {
        let api_key = env("OPENAI_API_KEY")
            .ok_or_else(|| Error::NotConfigured("missing OPENAI_API_KEY".to_string()))?;
        let base_url =
            env("PROSPECTUS_OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = env("PROSPECTUS_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Ok(Self::new(client, api_key, base_url, model))
    }

    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint_responses(&self) -> String {
        format!("{}/v1/responses", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl InferenceProvider for OpenAiClient {
    async fn invoke(
        &self,
        model: &str,
        instructions: &str,
        history: &[ConversationMessage],
        effort: Effort,
    ) -> Result<String> {
        let req = ResponsesRequest {
            model,
            instructions,
            input: history,
            reasoning: ReasoningHint { effort },
        };
        debug!(model, turns = history.len(), "invoking responses api");

        let resp = self
            .client
            .post(self.endpoint_responses())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::Llm(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Llm(format!("openai responses HTTP {status}")));
        }

        let parsed: ResponsesReply = resp.json().await.map_err(|e| Error::Llm(e.to_string()))?;
        Ok(parsed.output_text())
    }
}

#[derive(Debug, Clone, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a [ConversationMessage],
    reasoning: ReasoningHint,
}

#[derive(Debug, Clone, Serialize)]
struct ReasoningHint {
    effort: Effort,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output: Vec<OutputItem>,
}

impl ResponsesReply {
    /// Concatenated `output_text` parts across message items. Reasoning and
    /// tool items are skipped.
    fn output_text(&self) -> String {
        let mut out = String::new();
        for item in &self.output {
            if item.kind != "message" {
                continue;
            }
            for part in &item.content {
                if part.kind == "output_text" {
                    out.push_str(&part.text);
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<OutputPart>,
}

#[derive(Debug, Clone, Deserialize)]
struct OutputPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}
