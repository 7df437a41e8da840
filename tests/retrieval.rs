// Retrieval tests: commands and the send_sticker tool against a real
// (in-memory) store, plus a store that always faults.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use sticker_collector::config::CollectorSettings;
use sticker_collector::db::models::{NewSticker, Sticker};
use sticker_collector::db::{SqliteStore, StickerStore};
use sticker_collector::message::Reply;
use sticker_collector::pipeline::retrieve::{
    self, COUNT_ERROR_REPLY, DATABASE_ERROR_REPLY, SEARCH_ERROR_REPLY,
};
use sticker_collector::{StickerCollectorPlugin, StickerError};

async fn plugin_with(stickers: &[(&str, &str, &str)]) -> StickerCollectorPlugin {
    let store = SqliteStore::open_in_memory().unwrap();
    for (url, emotion, description) in stickers {
        store
            .insert_if_new(&NewSticker::new(*url, *emotion, *description))
            .await
            .unwrap();
    }
    StickerCollectorPlugin::new(Arc::new(store), CollectorSettings::default())
}

fn text(reply: Reply) -> String {
    match reply {
        Reply::Plain { text } => text,
        other => panic!("expected a plain reply, got {other:?}"),
    }
}

// ============================================================
// Commands
// ============================================================

#[tokio::test]
async fn empty_store_counts_zero_and_finds_nothing() {
    let plugin = plugin_with(&[]).await;

    let count = text(plugin.handle_command("/sticker count").await.unwrap());
    assert!(count.contains('0'), "count reply was {count:?}");

    let search = text(plugin.handle_command("/sticker search 猫").await.unwrap());
    assert_eq!(search, "未找到关于“猫”的表情。");
}

#[tokio::test]
async fn count_reports_stored_total() {
    let plugin = plugin_with(&[("u1", "高兴", "a"), ("u2", "悲伤", "b")]).await;
    let count = text(plugin.handle_command("sticker count").await.unwrap());
    assert_eq!(count, "我的表情包仓库里现在有 2 个表情啦！");
}

#[tokio::test]
async fn search_matches_emotion_or_description_case_insensitively() {
    let plugin = plugin_with(&[
        ("u1", "Happy", "dancing cat"),
        ("u2", "sad", "CAT in the rain"),
        ("u3", "catty", "smirk"),
        ("u4", "angry", "dog"),
    ])
    .await;

    let reply = text(plugin.handle_command("/sticker search CAT").await.unwrap());
    assert!(reply.starts_with("找到关于“CAT”的 3 个表情："));
    assert!(reply.contains("[情感: Happy] dancing cat"));
    assert!(reply.contains("[情感: sad] CAT in the rain"));
    assert!(reply.contains("[情感: catty] smirk"));
    assert!(!reply.contains("dog"));
}

#[tokio::test]
async fn search_returns_at_most_five() {
    let rows: Vec<(String, String)> = (0..9)
        .map(|i| (format!("http://x/{i}.png"), format!("猫咪{i}")))
        .collect();
    let borrowed: Vec<(&str, &str, &str)> = rows
        .iter()
        .map(|(url, description)| (url.as_str(), "搞笑", description.as_str()))
        .collect();
    let plugin = plugin_with(&borrowed).await;

    let hits = plugin.store().search("猫咪").await.unwrap();
    assert_eq!(hits.len(), 5);

    let reply = text(plugin.handle_command("/sticker search 猫咪").await.unwrap());
    assert!(reply.starts_with("找到关于“猫咪”的 5 个表情："));
    assert_eq!(reply.lines().count(), 6);
}

#[tokio::test]
async fn direct_search_keeps_the_keyword_verbatim() {
    let plugin = plugin_with(&[
        ("u1", "搞笑", "dancing  cat"),
        ("u2", "搞笑", "dancing cat"),
    ])
    .await;

    let reply = text(retrieve::search_stickers(plugin.store().as_ref(), "dancing  cat").await);
    assert!(reply.starts_with("找到关于“dancing  cat”的 1 个表情："));
    assert!(reply.contains("[情感: 搞笑] dancing  cat"));
}

#[tokio::test]
async fn command_usage_and_help() {
    let plugin = plugin_with(&[]).await;

    let usage = text(plugin.handle_command("/sticker search").await.unwrap());
    assert!(usage.contains("/sticker search"));

    let help = text(plugin.handle_command("/sticker").await.unwrap());
    assert!(help.contains("/sticker count"));

    assert!(plugin.handle_command("just chatting").await.is_none());
}

// ============================================================
// send_sticker tool
// ============================================================

#[tokio::test]
async fn random_pick_never_crosses_emotions() {
    let plugin = plugin_with(&[
        ("http://x/happy-1.png", "高兴", "比心"),
        ("http://x/happy-2.png", "高兴", "转圈"),
        ("http://x/sad.png", "悲伤", "哭泣"),
    ])
    .await;

    let mut seen = HashSet::new();
    for _ in 0..100 {
        match plugin.send_sticker("高兴", "").await {
            Reply::Image { url } => {
                assert_ne!(url, "http://x/sad.png");
                seen.insert(url);
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }
    // Both happy stickers should show up over 100 uniform draws
    assert_eq!(seen.len(), 2);
}

#[tokio::test]
async fn keywords_narrow_the_pick() {
    let plugin = plugin_with(&[
        ("http://x/1.png", "搞笑", "猫咪摆pose"),
        ("http://x/2.png", "搞笑", "狗狗歪头"),
    ])
    .await;

    for _ in 0..20 {
        assert_eq!(
            plugin.send_sticker("搞笑", "狗狗").await,
            Reply::image("http://x/2.png")
        );
    }
}

#[tokio::test]
async fn no_match_apologizes_with_the_query() {
    let plugin = plugin_with(&[("http://x/1.png", "搞笑", "猫咪摆pose")]).await;

    let reply = text(plugin.send_sticker("愤怒", "").await);
    assert_eq!(reply, "抱歉，我还没存有关于“愤怒”的表情包。");

    let reply = text(plugin.send_sticker("搞笑", "兔子").await);
    assert_eq!(reply, "抱歉，我还没存有关于“搞笑 兔子”的表情包。");
}

#[tokio::test]
async fn tool_dispatch_handles_bad_input() {
    let plugin = plugin_with(&[("http://x/1.png", "搞笑", "猫咪摆pose")]).await;

    let reply = plugin
        .call_tool("send_sticker", r#"{"emotion": "搞笑", "keywords": "猫咪"}"#)
        .await;
    assert_eq!(reply, Reply::image("http://x/1.png"));

    let reply = plugin
        .call_tool("send_sticker", r#"{"emotion": "搞笑", "keywords": null}"#)
        .await;
    assert_eq!(reply, Reply::image("http://x/1.png"));

    let reply = text(plugin.call_tool("send_sticker", r#"{"keywords": "猫"}"#).await);
    assert!(reply.contains("emotion"));

    let reply = text(plugin.call_tool("send_gif", "{}").await);
    assert!(reply.contains("send_gif"));
}

#[test]
fn tool_definitions_expose_send_sticker() {
    let tools = StickerCollectorPlugin::tool_definitions();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "send_sticker");
}

// ============================================================
// Storage faults become replies
// ============================================================

struct BrokenStore;

fn fault() -> StickerError {
    StickerError::StorageFault(rusqlite::Error::InvalidQuery)
}

#[async_trait]
impl StickerStore for BrokenStore {
    async fn insert_if_new(&self, _sticker: &NewSticker) -> sticker_collector::error::Result<bool> {
        Err(fault())
    }

    async fn count(&self) -> sticker_collector::error::Result<u64> {
        Err(fault())
    }

    async fn find_random(
        &self,
        _emotion: &str,
        _keywords: Option<&str>,
    ) -> sticker_collector::error::Result<Option<Sticker>> {
        Err(fault())
    }

    async fn search(&self, _keyword: &str) -> sticker_collector::error::Result<Vec<Sticker>> {
        Err(fault())
    }
}

#[tokio::test]
async fn storage_faults_turn_into_polite_replies() {
    let plugin = StickerCollectorPlugin::new(Arc::new(BrokenStore), CollectorSettings::default());

    assert_eq!(
        plugin.send_sticker("高兴", "").await,
        Reply::plain(DATABASE_ERROR_REPLY)
    );
    assert_eq!(
        plugin.handle_command("/sticker search 猫").await,
        Some(Reply::plain(SEARCH_ERROR_REPLY))
    );
    assert_eq!(
        plugin.handle_command("/sticker count").await,
        Some(Reply::plain(COUNT_ERROR_REPLY))
    );
}
