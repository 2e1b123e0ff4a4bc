use axum::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Per-session key-value blob storage backing the shopping cart.
///
/// The cart only writes back when it was actually mutated, so `save` is the
/// persistence half of the dirty-flag protocol.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> anyhow::Result<Option<serde_json::Value>>;
    async fn save(&self, id: Uuid, data: serde_json::Value) -> anyhow::Result<()>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgSessionStore {
    db: PgPool,
}

impl PgSessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn load(&self, id: Uuid) -> anyhow::Result<Option<serde_json::Value>> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as(r#"SELECT data FROM cart_sessions WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.db)
                .await?;
        Ok(row.map(|(data,)| data))
    }

    async fn save(&self, id: Uuid, data: serde_json::Value) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cart_sessions (id, data, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(id)
        .bind(data)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM cart_sessions WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// In-process store used by tests and `AppState::fake`.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<HashMap<Uuid, serde_json::Value>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: Uuid) -> anyhow::Result<Option<serde_json::Value>> {
        Ok(self.inner.lock().unwrap().get(&id).cloned())
    }

    async fn save(&self, id: Uuid, data: serde_json::Value) -> anyhow::Result<()> {
        self.inner.lock().unwrap().insert(id, data);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        self.inner.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemorySessionStore::default();
        let sid = Uuid::new_v4();

        assert!(store.load(sid).await.unwrap().is_none());

        store.save(sid, json!({"a": 1})).await.unwrap();
        assert_eq!(store.load(sid).await.unwrap(), Some(json!({"a": 1})));

        store.save(sid, json!({"a": 2})).await.unwrap();
        assert_eq!(store.load(sid).await.unwrap(), Some(json!({"a": 2})));

        store.delete(sid).await.unwrap();
        assert!(store.load(sid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_session_is_noop() {
        let store = MemorySessionStore::default();
        store.delete(Uuid::new_v4()).await.unwrap();
    }
}
