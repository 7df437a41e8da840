// SqliteStore: rusqlite backend implementing the StickerStore trait.
//
// The Connection is wrapped in tokio::sync::Mutex. Trait methods lock the
// mutex, do synchronous rusqlite work, and return; the lock is never held
// across an unrelated .await.

use std::path::Path;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{NewSticker, Sticker};
use super::traits::StickerStore;
use crate::error::Result;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file and make sure the schema exists.
    pub fn open(db_path: &Path) -> AnyResult<Self> {
        let conn = super::initialize(db_path)?;
        Ok(Self::new(conn))
    }

    /// A throwaway in-memory store with the schema applied.
    pub fn open_in_memory() -> AnyResult<Self> {
        let conn = Connection::open_in_memory()?;
        super::schema::create_tables(&conn)?;
        Ok(Self::new(conn))
    }

    /// Wrap an already-opened connection. The caller is responsible for the
    /// schema; prefer `open` or `open_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Number of tables in the database.
    pub async fn table_count(&self) -> AnyResult<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    /// Look up a stored sticker by url.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Sticker>> {
        let conn = self.conn.lock().await;
        Ok(super::queries::get_by_url(&conn, url)?)
    }
}

#[async_trait]
impl StickerStore for SqliteStore {
    async fn insert_if_new(&self, sticker: &NewSticker) -> Result<bool> {
        let conn = self.conn.lock().await;
        Ok(super::queries::insert_if_new(&conn, sticker)?)
    }

    async fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().await;
        Ok(super::queries::count(&conn)?)
    }

    async fn find_random(&self, emotion: &str, keywords: Option<&str>) -> Result<Option<Sticker>> {
        let conn = self.conn.lock().await;
        Ok(super::queries::find_random(&conn, emotion, keywords)?)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Sticker>> {
        let conn = self.conn.lock().await;
        Ok(super::queries::search(&conn, keyword)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StickerError;

    #[tokio::test]
    async fn trait_insert_and_count() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.count().await.unwrap(), 0);

        let sticker = NewSticker::new("http://x/1.png", "高兴", "比心");
        assert!(store.insert_if_new(&sticker).await.unwrap());
        assert!(!store.insert_if_new(&sticker).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn trait_find_random_and_search() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_if_new(&NewSticker::new("http://x/1.png", "无语", "黑人问号"))
            .await
            .unwrap();

        let hit = store.find_random("无语", None).await.unwrap().unwrap();
        assert_eq!(hit.url, "http://x/1.png");
        assert_eq!(store.search("问号").await.unwrap().len(), 1);
        assert!(store.get_by_url("http://x/1.png").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn missing_table_is_a_storage_fault() {
        // A bare connection without the schema
        let store = SqliteStore::new(Connection::open_in_memory().unwrap());
        let err = store.count().await.unwrap_err();
        assert!(matches!(err, StickerError::StorageFault(_)));
    }

    #[tokio::test]
    async fn open_creates_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(crate::db::DB_NAME);

        let store = SqliteStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.table_count().await.unwrap(), 2);

        store
            .insert_if_new(&NewSticker::new("http://x/1.png", "赞同", "点赞"))
            .await
            .unwrap();
        drop(store);

        // Reopening keeps the data and doesn't re-run migrations destructively
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
    }
}
