use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{LookupRequest, TokenRecord, TokenStore, TokenWriter};
use crate::error::StoreResult;

/// In-process token store keyed by `(table, token)`.
///
/// Consistency is irrelevant here: every read sees the latest write.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    records: RwLock<HashMap<(String, String), TokenRecord>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn lookup(&self, request: &LookupRequest<'_>) -> StoreResult<Option<TokenRecord>> {
        let key = (request.table.to_string(), request.token.as_str().to_string());
        Ok(self.records.read().await.get(&key).cloned())
    }
}

#[async_trait]
impl TokenWriter for MemoryTokenStore {
    async fn put_record(&self, table: &str, token: &str, record: &TokenRecord) -> StoreResult<()> {
        self.records
            .write()
            .await
            .insert((table.to_string(), token.to_string()), record.clone());
        Ok(())
    }

    async fn delete_record(&self, table: &str, token: &str) -> StoreResult<()> {
        self.records
            .write()
            .await
            .remove(&(table.to_string(), token.to_string()));
        Ok(())
    }
}
