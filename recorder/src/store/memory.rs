use async_trait::async_trait;
use roastlog_core::{default_bean_list, normalize_bean_list, sort_newest_first, RoastingRecord};
use tokio::sync::RwLock;

use super::{upsert, BeanListStore, RecordRepository};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<RoastingRecord>>,
    beans: RwLock<Option<Vec<String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<RoastingRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            beans: RwLock::new(None),
        }
    }
}

#[async_trait]
impl RecordRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<RoastingRecord>, StoreError> {
        let mut records = self.records.read().await.clone();
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<RoastingRecord>, StoreError> {
        Ok(self.records.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn save(&self, record: RoastingRecord, replacing: Option<&str>) -> Result<(), StoreError> {
        upsert(&mut *self.records.write().await, record, replacing);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }
}

#[async_trait]
impl BeanListStore for InMemoryStore {
    async fn load(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .beans
            .read()
            .await
            .clone()
            .unwrap_or_else(default_bean_list))
    }

    async fn save(&self, beans: &[String]) -> Result<(), StoreError> {
        *self.beans.write().await = Some(normalize_bean_list(beans));
        Ok(())
    }
}
