// Store trait: the async interface the pipelines talk to.
//
// SqliteStore is the only implementor in this crate; hosts with their own
// persistence can plug in another one. All methods are async so a blocking
// rusqlite connection behind a mutex and a natively async backend both fit.

use async_trait::async_trait;

use super::models::{NewSticker, Sticker};
use crate::error::Result;

#[async_trait]
pub trait StickerStore: Send + Sync {
    /// Insert a sticker unless its url already exists. Returns `true` if a
    /// new row was written.
    async fn insert_if_new(&self, sticker: &NewSticker) -> Result<bool>;

    /// Total number of stored stickers.
    async fn count(&self) -> Result<u64>;

    /// One random sticker whose emotion contains `emotion` and, if given,
    /// whose description contains `keywords`.
    async fn find_random(&self, emotion: &str, keywords: Option<&str>) -> Result<Option<Sticker>>;

    /// Up to five stickers whose emotion or description contains `keyword`.
    async fn search(&self, keyword: &str) -> Result<Vec<Sticker>>;
}
