//! Persistence collaborator tests
//!
//! Covers both the in-memory and the JSON file store:
//! - upsert and replace-on-edit semantics
//! - newest-first listing
//! - bean list defaults and normalization

use chrono::{FixedOffset, NaiveDate, TimeZone};
use proptest::prelude::*;
use roastlog_core::{
    default_bean_list, CheckpointPolicy, RoastForm, RoastSession, RoastingRecord, SessionAssembler,
};
use roastlog_recorder::{BeanListStore, InMemoryStore, JsonFileStore, RecordRepository, StoreError};
use rust_decimal::Decimal;

// Helper to build a saved record with the given id and roast date
fn record(id: &str, day: u32) -> RoastingRecord {
    let now = FixedOffset::east_opt(9 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 5, day, 10, 0, 0)
        .unwrap();

    let mut session = RoastSession::new(CheckpointPolicy::Overwrite);
    session.start(0);
    session.mark_temperature(150, 240_000).unwrap();
    session.discharge(600_000).unwrap();

    let mut form = RoastForm::default();
    form.record_id = id.to_string();
    form.set_bean_name("Kenya AA");
    form.set_green_weight(Decimal::from(150));

    SessionAssembler::new(now).assemble(&form, &session).unwrap()
}

// ============================================================================
// In-memory store
// ============================================================================

#[cfg(test)]
mod memory_tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_get() {
        let store = InMemoryStore::new();
        RecordRepository::save(&store, record("a", 1), None).await.unwrap();

        let loaded = RecordRepository::get(&store, "a").await.unwrap().unwrap();
        assert_eq!(loaded.bean_name, "Kenya AA");
        assert!(RecordRepository::get(&store, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_same_id_replaces() {
        let store = InMemoryStore::new();
        RecordRepository::save(&store, record("a", 1), None).await.unwrap();

        let mut edited = record("a", 1);
        edited.memo = Some("second pass".to_string());
        RecordRepository::save(&store, edited, Some("a")).await.unwrap();

        let all = RecordRepository::list(&store).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].memo.as_deref(), Some("second pass"));
    }

    #[tokio::test]
    async fn test_save_under_new_id_removes_old() {
        let store = InMemoryStore::new();
        RecordRepository::save(&store, record("old", 1), None).await.unwrap();
        RecordRepository::save(&store, record("new", 1), Some("old")).await.unwrap();

        let ids: Vec<_> = RecordRepository::list(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["new".to_string()]);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = InMemoryStore::with_records(vec![record("a", 1), record("c", 3), record("b", 2)]);
        let dates: Vec<_> = RecordRepository::list(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.date)
            .collect();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryStore::with_records(vec![record("a", 1)]);
        assert!(RecordRepository::delete(&store, "a").await.unwrap());
        assert!(!RecordRepository::delete(&store, "a").await.unwrap());
    }

    #[tokio::test]
    async fn test_bean_list_defaults_then_saved() {
        let store = InMemoryStore::new();
        assert_eq!(BeanListStore::load(&store).await.unwrap(), default_bean_list());

        let beans = vec![" Yemen Mocha ".to_string(), "".to_string()];
        BeanListStore::save(&store, &beans).await.unwrap();
        assert_eq!(BeanListStore::load(&store).await.unwrap(), vec!["Yemen Mocha".to_string()]);
    }
}

// ============================================================================
// JSON file store
// ============================================================================

#[cfg(test)]
mod json_file_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_files_are_empty_and_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));

        assert!(RecordRepository::list(&store).await.unwrap().is_empty());
        assert_eq!(BeanListStore::load(&store).await.unwrap(), default_bean_list());
    }

    #[tokio::test]
    async fn test_records_survive_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        RecordRepository::save(&store, record("a", 1), None).await.unwrap();
        RecordRepository::save(&store, record("b", 2), None).await.unwrap();

        let reopened = JsonFileStore::new(dir.path());
        let records = RecordRepository::list(&reopened).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "b");
        assert_eq!(records[1], record("a", 1));
    }

    #[tokio::test]
    async fn test_file_uses_record_json_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        RecordRepository::save(&store, record("a", 1), None).await.unwrap();

        let raw = std::fs::read_to_string(store.records_path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["beanName"], "Kenya AA");
        assert_eq!(json[0]["temps"]["end"], "10:00");
        assert_eq!(json[0]["totalTime"], "10:00");
    }

    #[tokio::test]
    async fn test_delete_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        RecordRepository::save(&store, record("a", 1), None).await.unwrap();

        assert!(RecordRepository::delete(&store, "a").await.unwrap());
        assert!(!RecordRepository::delete(&store, "a").await.unwrap());
        assert!(RecordRepository::list(&JsonFileStore::new(dir.path())).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(store.records_path(), "{not json").unwrap();

        let error = RecordRepository::list(&store).await.unwrap_err();
        assert!(matches!(error, StoreError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_bean_list_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let beans = vec!["Kenya AA".to_string(), "Kenya AA".to_string(), "Panama Geisha".to_string()];
        BeanListStore::save(&store, &beans).await.unwrap();

        let loaded = BeanListStore::load(&JsonFileStore::new(dir.path())).await.unwrap();
        assert_eq!(loaded, vec!["Kenya AA".to_string(), "Panama Geisha".to_string()]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: after any sequence of saves, ids in the store are unique
    #[test]
    fn prop_saved_ids_are_unique(ids in prop::collection::vec(0u8..5, 1..20)) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let store = InMemoryStore::new();
            for id in &ids {
                RecordRepository::save(&store, record(&id.to_string(), 1), None).await.unwrap();
            }
            let mut stored: Vec<_> = RecordRepository::list(&store).await.unwrap().into_iter().map(|r| r.id).collect();
            let count = stored.len();
            stored.sort();
            stored.dedup();
            prop_assert_eq!(stored.len(), count);
            Ok(())
        })?;
    }
}
