// Sticker classifier: asks a multimodal LLM whether an image is a usable
// reaction sticker and parses its JSON answer into a Verdict.
//
// One provider call per image, no retries. Anything that isn't a clean
// Verdict comes back as StickerError::MalformedResponse so the collector can
// log it and move on.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, StickerError};
use crate::llm::{ChatRequest, LlmProvider};

/// Default bound on a single classification call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// System instruction sent with every classification request.
pub const SYSTEM_PROMPT: &str = "你是一个专业的表情包（Meme/Sticker）鉴定师。";

/// Analysis prompt. Asks for exactly one JSON object shaped like a Verdict.
pub const ANALYZE_PROMPT: &str = r#"
你是一个专业的表情包（Meme/Sticker）鉴定师。
请判断我提供的图片是否是一个适合在聊天中使用的表情包。
你必须以一个严格的 JSON 格式回复，不要包含任何其他说明文字。
JSON 格式如下:
{
  "is_sticker": boolean, // 是否是表情包
  "confidence": float, // 你判断的置信度，范围 0.0 到 1.0
  "emotion": string, // 如果是表情包，它表达的主要情感。例如：高兴, 悲伤, 愤怒, 惊讶, 搞笑, 无语, 赞同, 反对, 吃瓜。如果不是，则为 null。
  "description": string // 如果是表情包，用简短的中文描述图片内容和文字，用于后续搜索。如果不是，则为 null。
}
"#;

/// The classifier's judgement on one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub is_sticker: bool,
    /// 0.0 to 1.0
    pub confidence: f64,
    pub emotion: Option<String>,
    pub description: Option<String>,
}

impl Verdict {
    /// Whether this verdict clears the collection bar. The threshold is
    /// inclusive.
    pub fn is_accepted(&self, min_confidence: f64) -> bool {
        self.is_sticker && self.confidence >= min_confidence
    }
}

/// What the model is asked to emit. `emotion` and `description` may be
/// absent or null; the two judgement fields may not.
#[derive(Deserialize)]
struct RawVerdict {
    is_sticker: bool,
    confidence: f64,
    #[serde(default)]
    emotion: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Parse a raw completion into a Verdict.
///
/// A single Markdown code fence around the JSON is tolerated; anything else
/// that isn't exactly the expected object is rejected.
pub fn parse_verdict(raw: &str) -> Result<Verdict> {
    let body = strip_code_fence(raw);

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| StickerError::malformed(format!("invalid verdict JSON: {e}"), raw))?;

    // serde would happily read a struct from an array; only an object is a verdict
    if !value.is_object() {
        return Err(StickerError::malformed("verdict is not a JSON object", raw));
    }

    let parsed: RawVerdict = serde_json::from_value(value)
        .map_err(|e| StickerError::malformed(format!("verdict has wrong shape: {e}"), raw))?;

    if !parsed.confidence.is_finite() || !(0.0..=1.0).contains(&parsed.confidence) {
        return Err(StickerError::malformed(
            format!("confidence {} is outside 0.0..=1.0", parsed.confidence),
            raw,
        ));
    }

    Ok(Verdict {
        is_sticker: parsed.is_sticker,
        confidence: parsed.confidence,
        emotion: non_blank(parsed.emotion),
        description: non_blank(parsed.description),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Strip one surrounding ``` / ```json fence, if present.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json"), on its own line or glued to the body
    inner
        .trim_start()
        .trim_start_matches(|c: char| c.is_ascii_alphanumeric())
        .trim()
}

/// Classifies images with a borrowed provider.
pub struct StickerClassifier {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl StickerClassifier {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The request sent for one image: fixed prompts, no history, one image.
    pub fn build_request(image_url: &str) -> ChatRequest {
        ChatRequest {
            prompt: ANALYZE_PROMPT.to_string(),
            system_prompt: Some(SYSTEM_PROMPT.to_string()),
            contexts: Vec::new(),
            image_urls: vec![image_url.to_string()],
        }
    }

    /// Ask the provider about one image.
    pub async fn classify(&self, image_url: &str) -> Result<Verdict> {
        let request = Self::build_request(image_url);

        let raw = tokio::time::timeout(self.timeout, self.provider.text_chat(&request))
            .await
            .map_err(|_| StickerError::Timeout(self.timeout))?
            .map_err(|e| StickerError::Provider(format!("{e:#}")))?;

        debug!(
            provider = self.provider.name(),
            url = image_url,
            reply = %crate::output::truncate_chars(&raw, 200),
            "Classifier reply"
        );

        parse_verdict(&raw)
    }
}
