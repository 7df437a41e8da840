// The `send_sticker` tool the LLM can call mid-conversation.
//
// The definition is exported in the OpenAI function-tool format, which most
// hosts accept directly or convert from.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

/// Name the tool is registered under.
pub const SEND_STICKER_TOOL: &str = "send_sticker";

/// A callable tool as advertised to the LLM.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

impl ToolDefinition {
    /// `{"type": "function", "function": {...}}` as used by chat completion APIs.
    pub fn to_openai_tool(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// Arguments of a `send_sticker` call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SendStickerArgs {
    pub emotion: String,
    /// Absent, `null` and `""` all mean no keyword filter
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keywords: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn send_sticker_definition() -> ToolDefinition {
    ToolDefinition {
        name: SEND_STICKER_TOOL,
        description: "根据情感和关键词发送一个合适的表情包。当用户想发表情时调用此工具。",
        parameters: json!({
            "type": "object",
            "properties": {
                "emotion": {
                    "type": "string",
                    "description": "必要参数。表情包需要表达的情感，例如：'高兴', '悲伤', '愤怒', '惊讶', '搞笑', '无语', '赞同'。"
                },
                "keywords": {
                    "type": "string",
                    "description": "可选参数。用于更精确搜索的关键词，描述表情包的内容或文字。",
                    "default": ""
                }
            },
            "required": ["emotion"]
        }),
    }
}

/// Parse the raw JSON arguments of a `send_sticker` call. An empty string
/// or `null` means "no arguments", which fails because `emotion` is required.
pub fn parse_send_sticker_args(raw: &str) -> serde_json::Result<SendStickerArgs> {
    let raw = raw.trim();
    serde_json::from_str(if raw.is_empty() { "null" } else { raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_requires_emotion_only() {
        let def = send_sticker_definition();
        assert_eq!(def.name, "send_sticker");
        assert_eq!(def.parameters["required"], json!(["emotion"]));
        assert_eq!(def.parameters["properties"]["keywords"]["type"], "string");
    }

    #[test]
    fn openai_wrapper_shape() {
        let tool = send_sticker_definition().to_openai_tool();
        assert_eq!(tool["type"], "function");
        assert_eq!(tool["function"]["name"], "send_sticker");
        assert!(tool["function"]["parameters"].is_object());
    }

    #[test]
    fn keywords_default_to_empty() {
        let args = parse_send_sticker_args(r#"{"emotion": "高兴"}"#).unwrap();
        assert_eq!(args.emotion, "高兴");
        assert_eq!(args.keywords, "");

        let args = parse_send_sticker_args(r#"{"emotion": "高兴", "keywords": null}"#).unwrap();
        assert_eq!(args.emotion, "高兴");
        assert_eq!(args.keywords, "");

        let args = parse_send_sticker_args(r#"{"emotion": "搞笑", "keywords": "猫"}"#).unwrap();
        assert_eq!(args.keywords, "猫");
    }

    #[test]
    fn missing_emotion_is_an_error() {
        assert!(parse_send_sticker_args(r#"{"keywords": "猫"}"#).is_err());
        assert!(parse_send_sticker_args(r#"{"emotion": null}"#).is_err());
        assert!(parse_send_sticker_args(r#"{"emotion": "高兴", "keywords": 3}"#).is_err());
        assert!(parse_send_sticker_args("").is_err());
        assert!(parse_send_sticker_args("not json").is_err());
    }
}
