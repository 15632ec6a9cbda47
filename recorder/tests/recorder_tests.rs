//! Roast recorder service tests
//!
//! Drives the service with a hand-set time source and tokio's paused clock:
//! - tick task publishes live views while running and stops on pause
//! - save hands the record to the repository and starts a blank roast
//! - a failed save keeps the session for a retry
//! - editing a saved roast replaces it on save

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone};
use roastlog_core::{
    CheckpointLabel, CheckpointPolicy, ManualTimeSource, PhaseState, RecordOutcome, RoastStage,
    RoastTime, RoastingRecord,
};
use roastlog_recorder::config::RecorderConfig;
use roastlog_recorder::{
    InMemoryStore, LiveView, RecordRepository, RecorderError, RoastRecorder, StoreError,
};
use rust_decimal::Decimal;
use tokio::sync::watch;

fn now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(9 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 1, 8, 30, 0)
        .unwrap()
}

fn t(secs: u32) -> RoastTime {
    RoastTime::from_secs(secs)
}

fn recorder_with(
    policy: CheckpointPolicy,
    records: Arc<dyn RecordRepository>,
) -> (RoastRecorder, ManualTimeSource) {
    let source = ManualTimeSource::new(0);
    let config = RecorderConfig {
        checkpoint_policy: policy,
        ..RecorderConfig::default()
    };
    let recorder = RoastRecorder::new(
        &config,
        records,
        Arc::new(InMemoryStore::new()),
        Arc::new(source.clone()),
    );
    (recorder, source)
}

fn recorder() -> (RoastRecorder, ManualTimeSource, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let (recorder, source) = recorder_with(CheckpointPolicy::Overwrite, store.clone());
    (recorder, source, store)
}

async fn fill_form(recorder: &RoastRecorder) {
    recorder
        .update_form(|form| {
            form.set_bean_name("Colombia Supremo");
            form.set_green_weight(Decimal::from(500));
        })
        .await;
}

/// Wait until a published view satisfies `done`
async fn wait_for<F>(rx: &mut watch::Receiver<LiveView>, done: F) -> LiveView
where
    F: Fn(&LiveView) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let view = rx.borrow_and_update();
                if done(&view) {
                    return view.clone();
                }
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .unwrap()
}

/// Repository whose writes always fail
struct FailingRepository;

#[async_trait]
impl RecordRepository for FailingRepository {
    async fn list(&self) -> Result<Vec<RoastingRecord>, StoreError> {
        Ok(Vec::new())
    }

    async fn get(&self, _id: &str) -> Result<Option<RoastingRecord>, StoreError> {
        Ok(None)
    }

    async fn save(&self, _record: RoastingRecord, _replacing: Option<&str>) -> Result<(), StoreError> {
        Err(StoreError::Io {
            path: "records.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        })
    }

    async fn delete(&self, _id: &str) -> Result<bool, StoreError> {
        Ok(false)
    }
}

// ============================================================================
// Timer and tick task
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_tick_task_publishes_elapsed_time() {
    let (recorder, source, _) = recorder();
    let mut rx = recorder.subscribe();

    assert!(recorder.start().await);
    source.advance_secs(3);

    let view = wait_for(&mut rx, |v| v.metrics.elapsed == t(3)).await;
    assert!(view.metrics.running);

    recorder.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_pause_freezes_published_time() {
    let (recorder, source, _) = recorder();
    recorder.start().await;
    source.advance_secs(10);
    assert!(recorder.pause().await);
    assert!(!recorder.pause().await);

    source.advance_secs(30);
    tokio::time::sleep(Duration::from_millis(500)).await;

    let view = recorder.view().await;
    assert_eq!(view.metrics.elapsed, t(10));
    assert!(!view.metrics.running);
}

#[tokio::test(start_paused = true)]
async fn test_maillard_goes_live_then_frozen() {
    let (recorder, source, _) = recorder();
    let mut rx = recorder.subscribe();
    recorder.start().await;

    source.advance_secs(300);
    recorder.mark_temperature(150).await.unwrap();
    source.advance_secs(60);
    let live = wait_for(&mut rx, |v| v.metrics.elapsed == t(360)).await;
    assert_eq!(live.metrics.maillard.state, PhaseState::Live);
    assert_eq!(live.metrics.maillard.duration, Some(t(60)));

    source.advance_secs(120);
    recorder.mark_temperature(180).await.unwrap();
    source.advance_secs(30);
    let frozen = wait_for(&mut rx, |v| v.metrics.elapsed == t(510)).await;
    assert_eq!(frozen.metrics.maillard.state, PhaseState::Frozen);
    assert_eq!(frozen.metrics.maillard.duration, Some(t(180)));
    assert_eq!(frozen.stage, RoastStage::CrackSoon);

    recorder.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_reset_clears_session_but_keeps_form() {
    let (recorder, source, _) = recorder();
    fill_form(&recorder).await;
    recorder.start().await;
    source.advance_secs(200);
    recorder.mark_temperature(150).await.unwrap();
    recorder.mark_first_crack().await;

    recorder.reset().await;

    let view = recorder.view().await;
    assert_eq!(view.metrics.elapsed, RoastTime::ZERO);
    assert!(!view.metrics.running);
    assert_eq!(view.metrics.maillard.state, PhaseState::NotStarted);
    assert_eq!(view.stage, RoastStage::Ready);
    assert_eq!(recorder.form().await.bean_name(), "Colombia Supremo");
}

#[tokio::test(start_paused = true)]
async fn test_dropping_running_recorder_stops_tick_task() {
    let (recorder, source, _) = recorder();
    let mut rx = recorder.subscribe();

    assert!(recorder.start().await);
    rx.borrow_and_update();
    drop(recorder);

    source.advance_secs(42);
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(rx.borrow().metrics.elapsed, RoastTime::ZERO);
    assert!(rx.changed().await.is_err());
}

// ============================================================================
// Checkpoints
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_toggle_policy_cancels_checkpoint() {
    let store = Arc::new(InMemoryStore::new());
    let (recorder, source) = recorder_with(CheckpointPolicy::Toggle, store);
    recorder.start().await;
    source.advance_secs(100);

    assert_eq!(recorder.mark_temperature(150).await.unwrap(), RecordOutcome::Recorded);
    assert_eq!(
        recorder.mark_temperature(150).await.unwrap(),
        RecordOutcome::Removed { previous: t(100) }
    );
    recorder.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_discharge_stops_timer_and_rejects_more_checkpoints() {
    let (recorder, source, _) = recorder();
    recorder.start().await;
    source.advance_secs(600);
    recorder.mark_temperature(183).await.unwrap();
    source.advance_secs(120);

    assert_eq!(recorder.discharge().await.unwrap(), t(720));
    let view = recorder.view().await;
    assert!(view.finalized);
    assert!(!view.metrics.running);
    assert_eq!(view.metrics.dtr, Some(Decimal::new(1667, 2)));

    let error = recorder.mark_temperature(190).await.unwrap_err();
    assert_eq!(error.notice().code, "ROAST_DISCHARGED");
    assert!(!recorder.start().await);
}

// ============================================================================
// Saving and editing
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_save_persists_and_starts_blank_roast() {
    let (recorder, source, store) = recorder();
    fill_form(&recorder).await;
    recorder.start().await;
    source.advance_secs(600);
    recorder.mark_temperature(183).await.unwrap();
    source.advance_secs(120);
    recorder.discharge().await.unwrap();

    let record = recorder.save(now()).await.unwrap();
    assert_eq!(record.id, "20240601-083000");
    assert_eq!(record.roasted_weight, Some(Decimal::from(425)));
    assert_eq!(record.yield_percent, Some(Decimal::from(85)));
    assert_eq!(record.dtr, Some(Decimal::new(1667, 2)));
    assert_eq!(record.final_temp, Some(183));

    assert_eq!(store.list().await.unwrap(), vec![record]);

    let view = recorder.view().await;
    assert_eq!(view.metrics.elapsed, RoastTime::ZERO);
    assert!(!view.finalized);
    assert_eq!(recorder.form().await.bean_name(), "");
}

#[tokio::test(start_paused = true)]
async fn test_save_validation_error_keeps_session() {
    let (recorder, source, store) = recorder();
    recorder.start().await;
    source.advance_secs(90);
    recorder.mark_temperature(150).await.unwrap();

    let error = recorder.save(now()).await.unwrap_err();
    assert!(matches!(error, RecorderError::Validation { ref field, .. } if field == "bean_name"));
    assert!(store.list().await.unwrap().is_empty());

    let view = recorder.view().await;
    assert!(view.metrics.running);
    assert_eq!(view.metrics.maillard.state, PhaseState::Live);
    recorder.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_save_keeps_session_for_retry() {
    let (recorder, source) = recorder_with(CheckpointPolicy::Overwrite, Arc::new(FailingRepository));
    fill_form(&recorder).await;
    recorder.start().await;
    source.advance_secs(300);
    recorder.discharge().await.unwrap();

    let error = recorder.save(now()).await.unwrap_err();
    assert!(matches!(error, RecorderError::Persistence(_)));
    assert_eq!(error.notice().code, "PERSISTENCE_ERROR");

    let view = recorder.view().await;
    assert!(view.finalized);
    assert_eq!(view.metrics.total_time, t(300));
    assert_eq!(recorder.form().await.bean_name(), "Colombia Supremo");
}

#[tokio::test(start_paused = true)]
async fn test_edit_round_trip_replaces_record() {
    let (recorder, source, store) = recorder();
    fill_form(&recorder).await;
    recorder.start().await;
    source.advance_secs(240);
    recorder.mark_temperature(150).await.unwrap();
    source.advance_secs(480);
    recorder.discharge().await.unwrap();
    let original = recorder.save(now()).await.unwrap();

    recorder.load_for_edit(&original.id).await.unwrap();
    let view = recorder.view().await;
    assert_eq!(view.editing.as_deref(), Some(original.id.as_str()));
    assert!(view.finalized);
    assert_eq!(view.metrics.elapsed, t(720));
    // a saved roasted weight counts as a manual entry
    assert!(recorder.form().await.is_roasted_overridden());

    recorder
        .update_form(|form| {
            form.record_id = "renamed".to_string();
            form.memo = Some("edited".to_string());
        })
        .await;
    let later = now() + chrono::Duration::hours(1);
    let edited = recorder.save(later).await.unwrap();

    let records = store.list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "renamed");
    assert_eq!(records[0].memo.as_deref(), Some("edited"));
    assert_eq!(edited.created_at, original.created_at);
    assert!(edited.updated_at > original.updated_at);
    assert_eq!(
        edited.temps.get(&CheckpointLabel::Degrees(150)),
        original.temps.get(&CheckpointLabel::Degrees(150))
    );
}

#[tokio::test]
async fn test_delete_and_load_missing_record() {
    let (recorder, _, _) = recorder();
    assert!(matches!(recorder.delete("nope").await, Err(RecorderError::NotFound(_))));
    assert!(matches!(recorder.load_for_edit("nope").await, Err(RecorderError::NotFound(_))));
}

// ============================================================================
// Bean list
// ============================================================================

#[tokio::test]
async fn test_add_bean_selects_it_in_form() {
    let (recorder, _, _) = recorder();
    let added = recorder.add_bean("  Yemen Mocha ").await.unwrap();
    assert_eq!(added.as_deref(), Some("Yemen Mocha"));
    assert!(recorder.bean_list().await.unwrap().contains(&"Yemen Mocha".to_string()));

    let form = recorder.form().await;
    assert_eq!(form.bean_name(), "Yemen Mocha");
    assert_eq!(form.bean_origin.as_deref(), Some("Yemen"));

    assert_eq!(recorder.add_bean("   ").await.unwrap(), None);
}
