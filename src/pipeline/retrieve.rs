// Retrieval pipeline: turns store lookups into chat replies.
//
// Every function here always produces a Reply. Storage faults are logged and
// replaced with a short apology; they never reach the host.

use tracing::{error, info, warn};

use crate::db::models::Sticker;
use crate::db::traits::StickerStore;
use crate::message::Reply;

pub const DATABASE_ERROR_REPLY: &str = "哎呀，我的表情包数据库出错了！";
pub const SEARCH_ERROR_REPLY: &str = "搜索时出错。";
pub const COUNT_ERROR_REPLY: &str = "统计时出错。";

/// Send a random sticker matching `emotion` (and `keywords`, if not blank).
pub async fn send_sticker(store: &dyn StickerStore, emotion: &str, keywords: &str) -> Reply {
    let emotion = emotion.trim();
    let keywords = keywords.trim();
    info!(emotion, keywords, "Sticker requested");

    let keyword_filter = Some(keywords).filter(|k| !k.is_empty());
    match store.find_random(emotion, keyword_filter).await {
        Ok(Some(sticker)) => {
            info!(url = %sticker.url, "Sticker found");
            Reply::image(sticker.url)
        }
        Ok(None) => {
            warn!(emotion, keywords, "No matching sticker stored");
            Reply::plain(not_found_reply(emotion, keywords))
        }
        Err(e) => {
            error!(error = %e, "Failed to look up sticker");
            Reply::plain(DATABASE_ERROR_REPLY)
        }
    }
}

/// `sticker search <keyword>`
pub async fn search_stickers(store: &dyn StickerStore, keyword: &str) -> Reply {
    let keyword = keyword.trim();
    match store.search(keyword).await {
        Ok(hits) if hits.is_empty() => Reply::plain(format!("未找到关于“{keyword}”的表情。")),
        Ok(hits) => Reply::plain(format_search_results(keyword, &hits)),
        Err(e) => {
            error!(error = %e, keyword, "Sticker search failed");
            Reply::plain(SEARCH_ERROR_REPLY)
        }
    }
}

/// `sticker count`
pub async fn count_stickers(store: &dyn StickerStore) -> Reply {
    match store.count().await {
        Ok(count) => Reply::plain(format!("我的表情包仓库里现在有 {count} 个表情啦！")),
        Err(e) => {
            error!(error = %e, "Sticker count failed");
            Reply::plain(COUNT_ERROR_REPLY)
        }
    }
}

fn not_found_reply(emotion: &str, keywords: &str) -> String {
    let query = if keywords.is_empty() {
        emotion.to_string()
    } else {
        format!("{emotion} {keywords}")
    };
    format!("抱歉，我还没存有关于“{query}”的表情包。")
}

fn format_search_results(keyword: &str, hits: &[Sticker]) -> String {
    let mut text = format!("找到关于“{keyword}”的 {} 个表情：", hits.len());
    for sticker in hits {
        text.push_str(&format!(
            "\n- [情感: {}] {}",
            sticker.emotion, sticker.description
        ));
    }
    text
}
