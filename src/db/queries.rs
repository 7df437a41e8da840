// Database queries: every SQL statement touching `stickers`.
//
// Functions take a borrowed Connection and return rusqlite results; the
// store wrapper converts faults into StickerError::StorageFault.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{NewSticker, Sticker};

/// Maximum rows returned by `search`.
pub const SEARCH_LIMIT: usize = 5;

const STICKER_COLUMNS: &str = "id, url, emotion, description, source_platform, \
     source_group_id, source_sender_id, created_at";

/// Insert a sticker unless its url is already stored.
///
/// Returns `true` when a row was written. A duplicate url is not an error:
/// the UNIQUE constraint turns the insert into a no-op, which also settles
/// concurrent inserts of the same url.
pub fn insert_if_new(conn: &Connection, sticker: &NewSticker) -> rusqlite::Result<bool> {
    let written = conn.execute(
        "INSERT OR IGNORE INTO stickers
            (url, emotion, description, source_platform, source_group_id, source_sender_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            sticker.url,
            sticker.emotion,
            sticker.description,
            sticker.source_platform,
            sticker.source_group_id,
            sticker.source_sender_id,
        ],
    )?;
    Ok(written > 0)
}

/// Total number of stored stickers.
pub fn count(conn: &Connection) -> rusqlite::Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM stickers", [], |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

/// Pick one sticker at random whose emotion contains `emotion` and, when
/// given, whose description contains `keywords`.
///
/// Blank keywords are treated as "no description filter".
pub fn find_random(
    conn: &Connection,
    emotion: &str,
    keywords: Option<&str>,
) -> rusqlite::Result<Option<Sticker>> {
    let emotion_pattern = contains_pattern(emotion);
    let keyword_pattern = keywords
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(contains_pattern);

    let sql = format!(
        "SELECT {STICKER_COLUMNS} FROM stickers
         WHERE emotion LIKE ?1 ESCAPE '\\'
           AND (?2 IS NULL OR description LIKE ?2 ESCAPE '\\')
         ORDER BY RANDOM()
         LIMIT 1"
    );
    conn.query_row(&sql, params![emotion_pattern, keyword_pattern], sticker_from_row)
        .optional()
}

/// Stickers whose emotion or description contains `keyword`, newest first,
/// capped at SEARCH_LIMIT.
pub fn search(conn: &Connection, keyword: &str) -> rusqlite::Result<Vec<Sticker>> {
    let pattern = contains_pattern(keyword);
    let sql = format!(
        "SELECT {STICKER_COLUMNS} FROM stickers
         WHERE emotion LIKE ?1 ESCAPE '\\' OR description LIKE ?1 ESCAPE '\\'
         ORDER BY id DESC
         LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![pattern, SEARCH_LIMIT as i64], sticker_from_row)?;
    let stickers = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(stickers)
}

/// Look up a sticker by its url.
pub fn get_by_url(conn: &Connection, url: &str) -> rusqlite::Result<Option<Sticker>> {
    let sql = format!("SELECT {STICKER_COLUMNS} FROM stickers WHERE url = ?1");
    conn.query_row(&sql, params![url], sticker_from_row)
        .optional()
}

fn sticker_from_row(row: &Row<'_>) -> rusqlite::Result<Sticker> {
    Ok(Sticker {
        id: row.get(0)?,
        url: row.get(1)?,
        emotion: row.get(2)?,
        description: row.get(3)?,
        source_platform: row.get(4)?,
        source_group_id: row.get(5)?,
        source_sender_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Build a `%needle%` LIKE pattern, escaping wildcards so user input
/// matches literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
