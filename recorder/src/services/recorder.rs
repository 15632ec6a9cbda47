//! Live roast recording service
//!
//! Owns the one active session and its form. User actions and the tick task
//! serialize on a single mutex; persistence is awaited outside it so the
//! timer keeps running while a save is in flight.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use roastlog_core::{
    add_bean, CheckpointPolicy, MetricsSnapshot, RecordOutcome, RoastForm, RoastSession,
    RoastStage, RoastTime, RoastingRecord, SessionAssembler, TimeSource,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::RecorderConfig;
use crate::error::{RecorderError, RecorderResult};
use crate::store::{BeanListStore, RecordRepository};

/// What the recorder shows at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveView {
    pub metrics: MetricsSnapshot,
    pub stage: RoastStage,
    pub finalized: bool,
    pub roasted_weight: Option<Decimal>,
    /// Id of the record being edited, `None` for a new roast
    pub editing: Option<String>,
}

/// Saved record a session was loaded from
#[derive(Debug, Clone)]
struct EditTarget {
    id: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
struct ActiveRoast {
    session: RoastSession,
    form: RoastForm,
    editing: Option<EditTarget>,
}

impl ActiveRoast {
    fn fresh(policy: CheckpointPolicy, yield_ratio: Decimal) -> Self {
        Self {
            session: RoastSession::new(policy),
            form: RoastForm::new(yield_ratio),
            editing: None,
        }
    }

    fn view(&self) -> LiveView {
        LiveView {
            metrics: self.session.metrics(self.form.weights()),
            stage: self.session.stage(),
            finalized: self.session.is_finalized(),
            roasted_weight: self.form.roasted_weight(),
            editing: self.editing.as_ref().map(|e| e.id.clone()),
        }
    }
}

#[derive(Clone)]
pub struct RoastRecorder {
    active: Arc<Mutex<ActiveRoast>>,
    records: Arc<dyn RecordRepository>,
    beans: Arc<dyn BeanListStore>,
    clock: Arc<dyn TimeSource>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    views: Arc<watch::Sender<LiveView>>,
    tick_interval: Duration,
    policy: CheckpointPolicy,
    yield_ratio: Decimal,
}

impl RoastRecorder {
    pub fn new(
        config: &RecorderConfig,
        records: Arc<dyn RecordRepository>,
        beans: Arc<dyn BeanListStore>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        let active = ActiveRoast::fresh(config.checkpoint_policy, config.default_yield_ratio);
        let (views, _) = watch::channel(active.view());

        Self {
            active: Arc::new(Mutex::new(active)),
            records,
            beans,
            clock,
            ticker: Arc::new(Mutex::new(None)),
            views: Arc::new(views),
            tick_interval: config.tick_interval(),
            policy: config.checkpoint_policy,
            yield_ratio: config.default_yield_ratio,
        }
    }

    /// Live views, published on every tick and every action
    pub fn subscribe(&self) -> watch::Receiver<LiveView> {
        self.views.subscribe()
    }

    pub async fn view(&self) -> LiveView {
        let mut active = self.active.lock().await;
        active.session.tick(self.clock.now_ms());
        active.view()
    }

    pub async fn form(&self) -> RoastForm {
        self.active.lock().await.form.clone()
    }

    // ========================================================================
    // Timer
    // ========================================================================

    pub async fn start(&self) -> bool {
        let started = {
            let mut active = self.active.lock().await;
            let started = active.session.start(self.clock.now_ms());
            self.views.send_replace(active.view());
            started
        };
        if started {
            self.spawn_ticker().await;
        }
        started
    }

    pub async fn pause(&self) -> bool {
        self.cancel_ticker().await;
        let mut active = self.active.lock().await;
        let paused = active.session.pause(self.clock.now_ms());
        self.views.send_replace(active.view());
        paused
    }

    /// Clear the timer and checkpoints; the form is kept
    pub async fn reset(&self) {
        self.cancel_ticker().await;
        let mut active = self.active.lock().await;
        active.session.reset();
        self.views.send_replace(active.view());
    }

    // ========================================================================
    // Marks
    // ========================================================================

    pub async fn mark_temperature(&self, degrees: u16) -> RecorderResult<RecordOutcome> {
        let mut active = self.active.lock().await;
        let outcome = active.session.mark_temperature(degrees, self.clock.now_ms())?;
        self.views.send_replace(active.view());
        Ok(outcome)
    }

    /// Record discharge and stop the timer
    pub async fn discharge(&self) -> RecorderResult<RoastTime> {
        let time = {
            let mut active = self.active.lock().await;
            let time = active.session.discharge(self.clock.now_ms())?;
            self.views.send_replace(active.view());
            time
        };
        self.cancel_ticker().await;
        Ok(time)
    }

    pub async fn mark_first_crack(&self) -> RoastTime {
        let mut active = self.active.lock().await;
        let time = active.session.mark_first_crack(self.clock.now_ms());
        self.views.send_replace(active.view());
        time
    }

    pub async fn mark_second_crack(&self) -> RoastTime {
        let mut active = self.active.lock().await;
        let time = active.session.mark_second_crack(self.clock.now_ms());
        self.views.send_replace(active.view());
        time
    }

    // ========================================================================
    // Form
    // ========================================================================

    /// Apply a change to the form and publish the resulting view
    pub async fn update_form<F>(&self, change: F)
    where
        F: FnOnce(&mut RoastForm),
    {
        let mut active = self.active.lock().await;
        change(&mut active.form);
        self.views.send_replace(active.view());
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Assemble and persist the current roast, then start a blank one.
    ///
    /// On a persistence failure the session and form are left untouched so
    /// the save can be retried.
    pub async fn save(&self, now: DateTime<FixedOffset>) -> RecorderResult<RoastingRecord> {
        let (record, replacing) = {
            let mut active = self.active.lock().await;
            active.session.tick(self.clock.now_ms());

            let mut assembler = SessionAssembler::new(now);
            if let Some(target) = &active.editing {
                assembler = assembler.editing(target.created_at);
            }
            let record = assembler.assemble(&active.form, &active.session)?;
            (record, active.editing.as_ref().map(|e| e.id.clone()))
        };

        if let Err(e) = self.records.save(record.clone(), replacing.as_deref()).await {
            tracing::error!("Failed to save record {}: {}", record.id, e);
            return Err(e.into());
        }
        tracing::info!("Saved record {} ({})", record.id, record.bean_name);

        self.replace_active(ActiveRoast::fresh(self.policy, self.yield_ratio))
            .await;
        Ok(record)
    }

    pub async fn list_records(&self) -> RecorderResult<Vec<RoastingRecord>> {
        Ok(self.records.list().await?)
    }

    pub async fn delete(&self, id: &str) -> RecorderResult<()> {
        if !self.records.delete(id).await? {
            return Err(RecorderError::NotFound(id.to_string()));
        }
        tracing::info!("Deleted record {}", id);
        Ok(())
    }

    /// Replace the active roast with a saved record opened for editing
    pub async fn load_for_edit(&self, id: &str) -> RecorderResult<()> {
        let record = self
            .records
            .get(id)
            .await?
            .ok_or_else(|| RecorderError::NotFound(id.to_string()))?;

        let active = ActiveRoast {
            session: RoastSession::from_record(&record, self.policy),
            form: RoastForm::from_record(&record, self.yield_ratio),
            editing: Some(EditTarget {
                id: record.id.clone(),
                created_at: record.created_at,
            }),
        };
        self.replace_active(active).await;
        tracing::info!("Editing record {}", id);
        Ok(())
    }

    /// Drop the active roast (new or edited) and start a blank one
    pub async fn new_session(&self) {
        self.replace_active(ActiveRoast::fresh(self.policy, self.yield_ratio))
            .await;
    }

    async fn replace_active(&self, replacement: ActiveRoast) {
        self.cancel_ticker().await;
        let mut active = self.active.lock().await;
        *active = replacement;
        self.views.send_replace(active.view());
    }

    // ========================================================================
    // Bean list
    // ========================================================================

    pub async fn bean_list(&self) -> RecorderResult<Vec<String>> {
        Ok(self.beans.load().await?)
    }

    /// Add a custom bean, persist the list and select the bean in the form
    pub async fn add_bean(&self, name: &str) -> RecorderResult<Option<String>> {
        let mut beans = self.beans.load().await?;
        let Some(added) = add_bean(&mut beans, name) else {
            return Ok(None);
        };
        self.beans.save(&beans).await?;
        self.update_form(|form| form.set_bean_name(&added)).await;
        Ok(Some(added))
    }

    pub async fn replace_bean_list(&self, beans: Vec<String>) -> RecorderResult<()> {
        self.beans.save(&beans).await?;
        Ok(())
    }

    // ========================================================================
    // Tick task
    // ========================================================================

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        // weak handles: dropping the last recorder clone ends the task
        let active = Arc::downgrade(&self.active);
        let views = Arc::downgrade(&self.views);
        let clock = self.clock.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;

                let (Some(active), Some(views)) = (active.upgrade(), views.upgrade()) else {
                    break;
                };
                let mut guard = active.lock().await;
                if !guard.session.is_running() {
                    break;
                }
                guard.session.tick(clock.now_ms());
                views.send_replace(guard.view());
            }
            tracing::debug!("Tick task stopped");
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    /// Stop the tick task; the session itself is left as it is
    pub async fn shutdown(&self) {
        self.cancel_ticker().await;
    }
}
