use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use libsql::params;

use super::models::{Target, TargetDraft, i64_to_timestamp, timestamp_to_i64};
use crate::pool::{LibsqlManager, LibsqlPool};

/// Source of the target list.
///
/// The scheduler re-reads it every cycle and the HTTP layer edits it, so it
/// is abstracted behind a trait rather than a concrete connection type.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Every target, enabled or not; the prober filters on the flag.
    async fn list_targets(&self) -> Result<Vec<Target>>;

    async fn get_target(&self, id: i64) -> Result<Option<Target>>;

    async fn create_target(&self, draft: &TargetDraft) -> Result<Target>;

    /// Returns the updated row, or `None` when no such target exists.
    async fn update_target(&self, id: i64, draft: &TargetDraft) -> Result<Option<Target>>;

    /// Returns `false` when no such target exists.
    async fn delete_target(&self, id: i64) -> Result<bool>;
}

/// libsql-backed target store over a pooled connection.
pub struct TargetRepository {
    pool: LibsqlPool,
}

impl TargetRepository {
    pub fn new(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>> {
        Ok(self.pool.get().await?)
    }
}

fn row_to_target(row: &libsql::Row) -> Result<Target> {
    Ok(Target {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        enabled: row.get::<i64>(3)? != 0,
        created_at: i64_to_timestamp(row.get(4)?),
        updated_at: i64_to_timestamp(row.get(5)?),
    })
}

#[async_trait]
impl TargetStore for TargetRepository {
    async fn list_targets(&self) -> Result<Vec<Target>> {
        let conn = self.conn().await?;
        let mut stmt = conn
            .prepare("SELECT id, name, url, enabled, created_at, updated_at FROM targets ORDER BY id")
            .await?;

        let mut rows = stmt.query(()).await?;
        let mut targets = Vec::new();

        while let Some(row) = rows.next().await? {
            targets.push(row_to_target(&row)?);
        }

        Ok(targets)
    }

    async fn get_target(&self, id: i64) -> Result<Option<Target>> {
        let conn = self.conn().await?;
        let mut stmt = conn
            .prepare("SELECT id, name, url, enabled, created_at, updated_at FROM targets WHERE id = ?")
            .await?;

        let mut rows = stmt.query(params![id]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_target(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_target(&self, draft: &TargetDraft) -> Result<Target> {
        let conn = self.conn().await?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO targets (name, url, enabled, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            params![
                draft.name.clone(),
                draft.url.clone(),
                if draft.enabled { 1 } else { 0 },
                timestamp_to_i64(now),
                timestamp_to_i64(now)
            ],
        )
        .await?;

        Ok(Target {
            id: conn.last_insert_rowid(),
            name: draft.name.clone(),
            url: draft.url.clone(),
            enabled: draft.enabled,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_target(&self, id: i64, draft: &TargetDraft) -> Result<Option<Target>> {
        let conn = self.conn().await?;

        let changed = conn
            .execute(
                "UPDATE targets SET name = ?, url = ?, enabled = ?, updated_at = ? WHERE id = ?",
                params![
                    draft.name.clone(),
                    draft.url.clone(),
                    if draft.enabled { 1 } else { 0 },
                    timestamp_to_i64(Utc::now()),
                    id
                ],
            )
            .await?;

        if changed == 0 {
            return Ok(None);
        }

        self.get_target(id).await
    }

    async fn delete_target(&self, id: i64) -> Result<bool> {
        let conn = self.conn().await?;
        let deleted = conn.execute("DELETE FROM targets WHERE id = ?", params![id]).await?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The tempdir is returned so it outlives the pool; dropping it deletes
    /// the database file.
    async fn create_test_store() -> (TargetRepository, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = libsql::Builder::new_local(dir.path().join("test.db")).build().await.unwrap();
        let pool = LibsqlPool::builder(LibsqlManager::new(db)).build().unwrap();

        let conn = pool.get().await.unwrap();
        crate::database::initialize_database(&conn).await.unwrap();

        (TargetRepository::new(pool), dir)
    }

    fn draft(name: &str, url: &str, enabled: bool) -> TargetDraft {
        TargetDraft { name: name.into(), url: url.into(), enabled }
    }

    #[tokio::test]
    async fn create_then_list_roundtrips() {
        let (store, _dir) = create_test_store().await;

        let created = store.create_target(&draft("web", "http://web/", true)).await.unwrap();
        let listed = store.list_targets().await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].name, "web");
        assert_eq!(listed[0].url, "http://web/");
        assert!(listed[0].enabled);
    }

    #[tokio::test]
    async fn list_includes_disabled_targets() {
        let (store, _dir) = create_test_store().await;

        store.create_target(&draft("on", "http://on/", true)).await.unwrap();
        store.create_target(&draft("off", "http://off/", false)).await.unwrap();

        let listed = store.list_targets().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed.iter().filter(|t| t.enabled).count(), 1);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let (store, _dir) = create_test_store().await;

        assert!(store.get_target(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_rewrites_the_row() {
        let (store, _dir) = create_test_store().await;
        let created = store.create_target(&draft("web", "http://web/", true)).await.unwrap();

        let updated = store
            .update_target(created.id, &draft("web-2", "http://web-2/", false))
            .await
            .unwrap()
            .expect("target should exist");

        assert_eq!(updated.name, "web-2");
        assert_eq!(updated.url, "http://web-2/");
        assert!(!updated.enabled);
    }

    #[tokio::test]
    async fn update_missing_returns_none() {
        let (store, _dir) = create_test_store().await;

        let updated = store.update_target(42, &draft("x", "http://x/", true)).await.unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let (store, _dir) = create_test_store().await;
        let created = store.create_target(&draft("web", "http://web/", true)).await.unwrap();

        assert!(store.delete_target(created.id).await.unwrap());
        assert!(store.get_target(created.id).await.unwrap().is_none());
        assert!(!store.delete_target(created.id).await.unwrap());
    }
}
