// Pipelines: the collection path (messages in, stickers stored) and the
// retrieval path (tool calls and commands in, replies out).

pub mod collect;
pub mod retrieve;

pub use collect::{collect_from_event, CollectOutcome};
