// Sticker Collector: AI-assisted reaction sticker collection for chat bots.
//
// Group-chat images are judged by a multimodal LLM; the ones that look like
// reaction stickers are stored with an emotion label and a description, and
// later handed back by the `send_sticker` tool or the `sticker` commands.

pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod message;
pub mod output;
pub mod pipeline;
pub mod plugin;

pub use error::StickerError;
pub use plugin::StickerCollectorPlugin;
