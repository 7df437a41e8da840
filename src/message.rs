// Host message model: the slice of a chat platform event this plugin reads.
//
// Message content is a list of tagged components; the collector only cares
// about the first Image with a usable url. Replies go back to the host as a
// Reply value, which it renders with its own primitives.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// One piece of a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageComponent {
    Plain {
        text: String,
    },
    Image {
        #[serde(default)]
        url: Option<String>,
        /// Platform-local file id, when the platform provides one
        #[serde(default)]
        file: Option<String>,
    },
    At {
        target: String,
    },
    Face {
        id: i64,
    },
    Reply {
        message_id: String,
    },
}

impl MessageComponent {
    pub fn plain(text: impl Into<String>) -> Self {
        MessageComponent::Plain { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        MessageComponent::Image {
            url: Some(url.into()),
            file: None,
        }
    }
}

/// Url of the first image in `components` that actually has one.
pub fn first_image_url(components: &[MessageComponent]) -> Option<&str> {
    components.iter().find_map(|component| match component {
        MessageComponent::Image { url: Some(url), .. } if !url.trim().is_empty() => {
            Some(url.as_str())
        }
        _ => None,
    })
}

/// An inbound message event as delivered by the host.
///
/// Handlers share the event by reference; `stop_event` is the only mutation
/// and it is one-way.
#[derive(Debug, Default)]
pub struct MessageEvent {
    pub platform: String,
    pub group_id: Option<String>,
    pub sender_id: Option<String>,
    pub message: Vec<MessageComponent>,
    stopped: AtomicBool,
}

impl MessageEvent {
    pub fn new(platform: impl Into<String>, message: Vec<MessageComponent>) -> Self {
        Self {
            platform: platform.into(),
            message,
            ..Self::default()
        }
    }

    pub fn in_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn from_sender(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = Some(sender_id.into());
        self
    }

    /// Mark the event fully handled so no later handler reacts to it.
    pub fn stop_event(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// What the plugin sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Plain { text: String },
    Image { url: String },
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Reply::Plain { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Reply::Image { url: url.into() }
    }

    /// The text of a plain reply.
    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Plain { text } => Some(text),
            Reply::Image { .. } => None,
        }
    }
}
