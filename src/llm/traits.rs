// LLM provider trait: the swap-ready abstraction over chat completion APIs.
//
// The classifier only needs "send text + images, get text back", so that is
// the whole interface. OpenAiCompatProvider is the bundled implementation;
// hosts can hand in whatever provider they already have configured.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Who said a prior conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prior turn of conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// A single multimodal chat call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    /// The user prompt for this turn.
    pub prompt: String,
    pub system_prompt: Option<String>,
    /// Prior turns, oldest first.
    pub contexts: Vec<ChatTurn>,
    /// Images attached to this turn, by reference.
    pub image_urls: Vec<String>,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short name used in logs (e.g. the model id).
    fn name(&self) -> &str;

    /// Run one chat completion and return the reply text.
    async fn text_chat(&self, request: &ChatRequest) -> Result<String>;
}
