use std::env::{self, VarError};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::db::DB_NAME;
use crate::llm::openai::DEFAULT_API_BASE;

/// Default minimum classifier confidence for collecting a sticker.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.8;

/// Default model used when LLM_MODEL is unset.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Collector behaviour that can change while the plugin runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectorSettings {
    /// Classify images from group messages automatically
    pub auto_collect_enabled: bool,
    /// Inclusive confidence threshold for storing a sticker (0.0 to 1.0)
    pub min_confidence: f64,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            auto_collect_enabled: true,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// Secrets come from env vars only. The binary loads a .env file first via
/// dotenvy.
pub struct Config {
    pub settings: CollectorSettings,
    /// Directory holding sticker_collector.db
    pub data_dir: PathBuf,
    /// OpenAI-compatible API base URL
    pub llm_api_base: String,
    /// Empty means "no provider configured"
    pub llm_api_key: String,
    pub llm_model: String,
    /// Upper bound on one classification call
    pub classify_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default; malformed values are errors rather than
    /// silently replaced.
    pub fn load() -> Result<Self> {
        let auto_collect_enabled = match optional_env("STICKER_AUTO_COLLECT")? {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("STICKER_AUTO_COLLECT has invalid value {raw:?}"))?,
            None => true,
        };

        let min_confidence = match optional_env("STICKER_MIN_CONFIDENCE")? {
            Some(raw) => parse_confidence(&raw)
                .with_context(|| format!("STICKER_MIN_CONFIDENCE has invalid value {raw:?}"))?,
            None => DEFAULT_MIN_CONFIDENCE,
        };

        let classify_timeout = match optional_env("LLM_TIMEOUT_SECS")? {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("LLM_TIMEOUT_SECS has invalid value {raw:?}"))?;
                if secs == 0 {
                    anyhow::bail!("LLM_TIMEOUT_SECS must be at least 1");
                }
                Duration::from_secs(secs)
            }
            None => crate::classifier::DEFAULT_TIMEOUT,
        };

        let data_dir = optional_env("STICKER_DATA_DIR")?
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Ok(Self {
            settings: CollectorSettings {
                auto_collect_enabled,
                min_confidence,
            },
            data_dir,
            llm_api_base: optional_env("LLM_API_BASE")?
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            llm_api_key: optional_env("LLM_API_KEY")?.unwrap_or_default(),
            llm_model: optional_env("LLM_MODEL")?.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            classify_timeout,
        })
    }

    /// Full path of the sticker database.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_NAME)
    }

    /// Whether an LLM provider can be built from this configuration.
    pub fn has_provider(&self) -> bool {
        !self.llm_api_key.trim().is_empty()
    }

    /// Check that the LLM API key is configured.
    /// Call this before any operation that must reach the classifier.
    pub fn require_provider(&self) -> Result<()> {
        if !self.has_provider() {
            anyhow::bail!(
                "LLM_API_KEY not set. Add it to your .env file \
                 (and LLM_API_BASE / LLM_MODEL for non-OpenAI endpoints)."
            );
        }
        Ok(())
    }
}

/// Platform data directory, falling back to ./data.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("sticker-collector"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// Read an env var; unset is `None`, a non-UTF-8 value is an error.
fn optional_env(name: &str) -> Result<Option<String>> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(e @ VarError::NotUnicode(_)) => {
            Err(e).with_context(|| format!("{name} is not valid UTF-8"))
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("expected true/false"),
    }
}

fn parse_confidence(raw: &str) -> Result<f64> {
    let value: f64 = raw.trim().parse().context("expected a number")?;
    if !(0.0..=1.0).contains(&value) {
        anyhow::bail!("expected a value between 0.0 and 1.0");
    }
    Ok(value)
}
