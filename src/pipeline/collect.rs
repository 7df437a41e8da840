// Collection pipeline: group message -> classifier -> store.
//
// Runs on every group message. Cheap preconditions short-circuit first
// (feature flag, image present, provider available); after that exactly one
// classification happens and the event is always marked handled, whatever
// the outcome. Nothing here returns an error: failures are logged and
// reported as an outcome value.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::classifier::{StickerClassifier, Verdict};
use crate::config::CollectorSettings;
use crate::db::models::NewSticker;
use crate::db::traits::StickerStore;
use crate::error::{Result, StickerError};
use crate::llm::LlmProvider;
use crate::message::{first_image_url, MessageEvent};
use crate::output::truncate_chars;

/// What happened to one inbound message.
#[derive(Debug)]
pub enum CollectOutcome {
    /// auto_collect_enabled is off
    Disabled,
    /// No image with a usable url in the message
    NoImage,
    /// No LLM provider to ask
    ProviderUnavailable,
    /// A new sticker row was written
    Stored { url: String },
    /// Accepted, but the url was already stored
    Duplicate { url: String },
    /// The verdict didn't clear the bar
    Rejected { url: String, verdict: Verdict },
    /// Classification or storage failed; already logged
    Failed { url: String, error: StickerError },
}

impl CollectOutcome {
    /// Whether the classifier was consulted for this message.
    pub fn was_classified(&self) -> bool {
        !matches!(
            self,
            CollectOutcome::Disabled | CollectOutcome::NoImage | CollectOutcome::ProviderUnavailable
        )
    }
}

/// Marks the event handled when dropped, so every exit path after the
/// preconditions (including a panic unwinding through the classifier)
/// suppresses other handlers.
struct HandledGuard<'a>(&'a MessageEvent);

impl Drop for HandledGuard<'_> {
    fn drop(&mut self) {
        self.0.stop_event();
    }
}

/// Try to collect a sticker from one group message.
pub async fn collect_from_event(
    event: &MessageEvent,
    settings: CollectorSettings,
    provider: Option<Arc<dyn LlmProvider>>,
    store: &dyn StickerStore,
    classify_timeout: Duration,
) -> CollectOutcome {
    if !settings.auto_collect_enabled {
        return CollectOutcome::Disabled;
    }

    let Some(url) = first_image_url(&event.message) else {
        return CollectOutcome::NoImage;
    };

    let Some(provider) = provider else {
        warn!("No LLM provider is configured; cannot classify images");
        return CollectOutcome::ProviderUnavailable;
    };

    let _handled = HandledGuard(event);

    info!(url, "Image detected, sending to classifier");

    let classifier = StickerClassifier::new(provider).with_timeout(classify_timeout);
    match classify_and_store(&classifier, event, url, settings.min_confidence, store).await {
        Ok(outcome) => outcome,
        Err(error) => {
            log_failure(url, &error);
            CollectOutcome::Failed {
                url: url.to_string(),
                error,
            }
        }
    }
}

async fn classify_and_store(
    classifier: &StickerClassifier,
    event: &MessageEvent,
    url: &str,
    min_confidence: f64,
    store: &dyn StickerStore,
) -> Result<CollectOutcome> {
    let verdict = classifier.classify(url).await?;

    if !verdict.is_accepted(min_confidence) {
        info!(
            url,
            is_sticker = verdict.is_sticker,
            confidence = verdict.confidence,
            min_confidence,
            "Image rejected"
        );
        return Ok(CollectOutcome::Rejected {
            url: url.to_string(),
            verdict,
        });
    }

    let sticker = sticker_from_verdict(event, url, &verdict)?;
    if store.insert_if_new(&sticker).await? {
        info!(
            url,
            emotion = %sticker.emotion,
            description = %sticker.description,
            "Sticker collected"
        );
        Ok(CollectOutcome::Stored {
            url: url.to_string(),
        })
    } else {
        info!(url, "Sticker already collected");
        Ok(CollectOutcome::Duplicate {
            url: url.to_string(),
        })
    }
}

/// Build the row for an accepted verdict, with provenance from the event.
fn sticker_from_verdict(event: &MessageEvent, url: &str, verdict: &Verdict) -> Result<NewSticker> {
    let (Some(emotion), Some(description)) = (&verdict.emotion, &verdict.description) else {
        return Err(StickerError::malformed(
            "accepted verdict without emotion or description",
            "",
        ));
    };

    Ok(NewSticker {
        url: url.to_string(),
        emotion: emotion.clone(),
        description: description.clone(),
        source_platform: Some(event.platform.clone()).filter(|p| !p.is_empty()),
        source_group_id: event.group_id.clone(),
        source_sender_id: event.sender_id.clone(),
    })
}

fn log_failure(url: &str, error: &StickerError) {
    match error {
        StickerError::MalformedResponse { reason, raw } => warn!(
            url,
            reason = %reason,
            raw = %truncate_chars(raw, 200),
            "Classifier reply was not a valid verdict"
        ),
        StickerError::StorageFault(e) => error!(url, error = %e, "Failed to store sticker"),
        other => warn!(url, error = %other, "Classification failed"),
    }
}
