// Plugin context: the single object a host talks to.
//
// Owns the store handle, the runtime-adjustable settings and the slot for
// the currently selected LLM provider. Hosts construct it once (after the
// schema exists) and route group messages, tool calls and commands into it.

pub mod commands;
pub mod tool;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::classifier::DEFAULT_TIMEOUT;
use crate::config::{CollectorSettings, Config};
use crate::db::{SqliteStore, StickerStore};
use crate::llm::{LlmProvider, OpenAiCompatProvider};
use crate::message::{MessageEvent, Reply};
use crate::pipeline::{collect_from_event, retrieve, CollectOutcome};

use commands::{parse_command, StickerCommand, HELP_TEXT, SEARCH_USAGE};
use tool::{parse_send_sticker_args, send_sticker_definition, ToolDefinition, SEND_STICKER_TOOL};

pub struct StickerCollectorPlugin {
    store: Arc<dyn StickerStore>,
    settings: RwLock<CollectorSettings>,
    provider: RwLock<Option<Arc<dyn LlmProvider>>>,
    classify_timeout: Duration,
}

impl StickerCollectorPlugin {
    /// Build a plugin around an already-initialized store.
    pub fn new(store: Arc<dyn StickerStore>, settings: CollectorSettings) -> Self {
        Self {
            store,
            settings: RwLock::new(settings),
            provider: RwLock::new(None),
            classify_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// One-shot startup: open the database (creating the schema) off the
    /// async runtime, then wire up the configured provider.
    ///
    /// The plugin only exists once the schema does, so no query can run
    /// against a missing table.
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db_path = config.db_path();
        let store = tokio::task::spawn_blocking(move || SqliteStore::open(&db_path))
            .await
            .context("Database initialization task failed")??;
        info!(path = %config.db_path().display(), "Sticker database ready");

        let plugin = Self::new(Arc::new(store), config.settings)
            .with_classify_timeout(config.classify_timeout);

        if config.has_provider() {
            let provider =
                OpenAiCompatProvider::new(&config.llm_api_base, &config.llm_api_key, &config.llm_model)?;
            plugin.set_provider(Some(Arc::new(provider)));
        } else {
            warn!("LLM_API_KEY not set; automatic collection is paused until a provider is set");
        }

        info!("Sticker collector loaded");
        Ok(plugin)
    }

    pub fn with_provider(self, provider: Arc<dyn LlmProvider>) -> Self {
        self.set_provider(Some(provider));
        self
    }

    pub fn with_classify_timeout(mut self, timeout: Duration) -> Self {
        self.classify_timeout = timeout;
        self
    }

    /// Select (or clear) the provider used for classification.
    pub fn set_provider(&self, provider: Option<Arc<dyn LlmProvider>>) {
        *self.provider.write() = provider;
    }

    /// The provider currently in use, if any.
    pub fn using_provider(&self) -> Option<Arc<dyn LlmProvider>> {
        self.provider.read().clone()
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> CollectorSettings {
        *self.settings.read()
    }

    pub fn update_settings(&self, update: impl FnOnce(&mut CollectorSettings)) {
        let mut settings = self.settings.write();
        update(&mut *settings);
        info!(
            auto_collect_enabled = settings.auto_collect_enabled,
            min_confidence = settings.min_confidence,
            "Collector settings updated"
        );
    }

    pub fn store(&self) -> &Arc<dyn StickerStore> {
        &self.store
    }

    /// Tools to register with the host's LLM.
    pub fn tool_definitions() -> Vec<ToolDefinition> {
        vec![send_sticker_definition()]
    }

    /// Group message hook: classify the first image and maybe store it.
    pub async fn on_group_message(&self, event: &MessageEvent) -> CollectOutcome {
        collect_from_event(
            event,
            self.settings(),
            self.using_provider(),
            self.store.as_ref(),
            self.classify_timeout,
        )
        .await
    }

    /// The `send_sticker` tool.
    pub async fn send_sticker(&self, emotion: &str, keywords: &str) -> Reply {
        retrieve::send_sticker(self.store.as_ref(), emotion, keywords).await
    }

    /// Dispatch an LLM tool call by name with raw JSON arguments.
    pub async fn call_tool(&self, name: &str, arguments: &str) -> Reply {
        if name != SEND_STICKER_TOOL {
            warn!(tool = name, "Unknown tool called");
            return Reply::plain(format!("未知的工具：{name}"));
        }

        match parse_send_sticker_args(arguments) {
            Ok(args) => self.send_sticker(&args.emotion, &args.keywords).await,
            Err(e) => {
                warn!(error = %e, "Bad send_sticker arguments");
                Reply::plain("表情包请求的参数不正确，需要提供 emotion。")
            }
        }
    }

    /// Handle a chat line if it is a `sticker` command; `None` otherwise.
    pub async fn handle_command(&self, text: &str) -> Option<Reply> {
        let reply = match parse_command(text)? {
            StickerCommand::Search { keyword } => {
                retrieve::search_stickers(self.store.as_ref(), &keyword).await
            }
            StickerCommand::Count => retrieve::count_stickers(self.store.as_ref()).await,
            StickerCommand::MissingKeyword => Reply::plain(SEARCH_USAGE),
            StickerCommand::Help => Reply::plain(HELP_TEXT),
        };
        Some(reply)
    }
}
