// LLM access: trait-based abstraction so any multimodal provider can back
// the classifier.

pub mod openai;
pub mod traits;

pub use openai::OpenAiCompatProvider;
pub use traits::{ChatRequest, ChatTurn, LlmProvider, Role};
