//! Persistence collaborators
//!
//! The recorder only talks to these traits. Two implementations ship with
//! the crate: an in-memory store for tests and embedding, and a JSON file
//! store for the command-line host.

use async_trait::async_trait;
use roastlog_core::RoastingRecord;

use crate::error::StoreError;

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;

#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// All records, newest roast first
    async fn list(&self) -> Result<Vec<RoastingRecord>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<RoastingRecord>, StoreError>;

    /// Insert or replace by id. When an edited record was saved under a new
    /// id, `replacing` names the old one so it is removed.
    async fn save(&self, record: RoastingRecord, replacing: Option<&str>) -> Result<(), StoreError>;

    /// Returns `false` when no record had the id
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait BeanListStore: Send + Sync {
    /// Saved bean list, or the default list when none was saved
    async fn load(&self) -> Result<Vec<String>, StoreError>;

    async fn save(&self, beans: &[String]) -> Result<(), StoreError>;
}

/// Upsert shared by the implementations
pub(crate) fn upsert(records: &mut Vec<RoastingRecord>, record: RoastingRecord, replacing: Option<&str>) {
    if let Some(old_id) = replacing.filter(|old| *old != record.id) {
        records.retain(|r| r.id != old_id);
    }
    match records.iter_mut().find(|r| r.id == record.id) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}
