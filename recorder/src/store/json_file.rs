use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use roastlog_core::{default_bean_list, normalize_bean_list, sort_newest_first, RoastingRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use super::{upsert, BeanListStore, RecordRepository};
use crate::error::StoreError;

const RECORDS_FILE: &str = "records.json";
const BEANS_FILE: &str = "beans.json";

/// Records and bean list kept as pretty-printed JSON files in one directory.
///
/// Writes go to a temporary file that is renamed over the target, and a
/// mutex serializes read-modify-write cycles within the process.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn records_path(&self) -> PathBuf {
        self.dir.join(RECORDS_FILE)
    }

    pub fn beans_path(&self) -> PathBuf {
        self.dir.join(BEANS_FILE)
    }

    async fn read_records(&self) -> Result<Vec<RoastingRecord>, StoreError> {
        Ok(read_json(&self.records_path()).await?.unwrap_or_default())
    }

    async fn write_records(&self, records: &[RoastingRecord]) -> Result<(), StoreError> {
        write_json(&self.dir, &self.records_path(), &records).await
    }
}

/// `None` when the file does not exist yet
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })
}

async fn write_json<T: Serialize + ?Sized>(dir: &Path, path: &Path, value: &T) -> Result<(), StoreError> {
    let io_error = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let body = serde_json::to_vec_pretty(value)?;
    tokio::fs::create_dir_all(dir).await.map_err(io_error)?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await.map_err(io_error)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_error)?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

#[async_trait]
impl RecordRepository for JsonFileStore {
    async fn list(&self) -> Result<Vec<RoastingRecord>, StoreError> {
        let mut records = self.read_records().await?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<RoastingRecord>, StoreError> {
        Ok(self.read_records().await?.into_iter().find(|r| r.id == id))
    }

    async fn save(&self, record: RoastingRecord, replacing: Option<&str>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_records().await?;
        upsert(&mut records, record, replacing);
        self.write_records(&records).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_records().await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write_records(&records).await?;
        Ok(true)
    }
}

#[async_trait]
impl BeanListStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<String>, StoreError> {
        let beans: Option<Vec<String>> = read_json(&self.beans_path()).await?;
        Ok(beans.unwrap_or_else(default_bean_list))
    }

    async fn save(&self, beans: &[String]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        write_json(&self.dir, &self.beans_path(), &normalize_bean_list(beans)).await
    }
}
