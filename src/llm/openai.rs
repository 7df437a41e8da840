// OpenAI-compatible chat completions provider.
//
// Works against any endpoint that speaks the `/chat/completions` wire format
// with `image_url` content parts (OpenAI, most self-hosted gateways).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{ChatRequest, LlmProvider, Role};

/// Default API base for OpenAI-compatible providers.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

pub struct OpenAiCompatProvider {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatProvider {
    pub fn new(api_base: &str, api_key: &str, model: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent("sticker-collector/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.model
    }

    async fn text_chat(&self, request: &ChatRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = build_body(&self.model, request);

        debug!(
            model = %self.model,
            images = request.image_urls.len(),
            "Chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Chat completion request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat completion API returned {}: {}", status, body);
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        completion_text(parsed)
    }
}

fn build_body<'a>(model: &'a str, request: &'a ChatRequest) -> CompletionRequest<'a> {
    let mut messages = Vec::with_capacity(request.contexts.len() + 2);

    if let Some(system) = &request.system_prompt {
        messages.push(WireMessage {
            role: "system",
            content: WireContent::Text(system),
        });
    }

    for turn in &request.contexts {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        messages.push(WireMessage {
            role,
            content: WireContent::Text(&turn.content),
        });
    }

    let content = if request.image_urls.is_empty() {
        WireContent::Text(&request.prompt)
    } else {
        let mut parts = vec![ContentPart::Text {
            text: &request.prompt,
        }];
        parts.extend(request.image_urls.iter().map(|url| ContentPart::ImageUrl {
            image_url: ImageRef { url: url.as_str() },
        }));
        WireContent::Parts(parts)
    };
    messages.push(WireMessage {
        role: "user",
        content,
    });

    CompletionRequest { model, messages }
}

fn completion_text(response: CompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .context("Chat completion returned no content")
}

// --- Wire types ---

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: WireContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageRef<'a> },
}

#[derive(Serialize)]
struct ImageRef<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
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
