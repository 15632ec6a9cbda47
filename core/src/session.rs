//! Active roast session
//!
//! A session owns the clock, the checkpoint store and the crack marks of one
//! roast. Every action takes the current millisecond reading so the caller
//! decides where time comes from.

use serde::{Deserialize, Serialize};

use crate::checkpoint::{CheckpointPolicy, CheckpointStore, RecordOutcome};
use crate::clock::RoastClock;
use crate::error::CheckpointError;
use crate::metrics::{MetricsSnapshot, Weights, DEVELOP_STARTS, MAILLARD_END, MAILLARD_START};
use crate::models::RoastingRecord;
use crate::types::{CheckpointLabel, RoastTime};

/// Where the roast is, as announced to the user after each checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoastStage {
    #[default]
    Ready,
    MaillardZone,
    CrackSoon,
    Development,
    Complete,
}

impl RoastStage {
    /// Stage entered by recording `label`, if it announces one
    pub fn entered_by(label: CheckpointLabel) -> Option<Self> {
        match label {
            CheckpointLabel::End => Some(RoastStage::Complete),
            l if l == MAILLARD_START => Some(RoastStage::MaillardZone),
            l if l == MAILLARD_END => Some(RoastStage::CrackSoon),
            l if DEVELOP_STARTS.contains(&l) => Some(RoastStage::Development),
            _ => None,
        }
    }

    /// Furthest stage reached by the checkpoints still in `store`
    pub fn reached(store: &CheckpointStore) -> Self {
        if store.is_finalized() {
            RoastStage::Complete
        } else if DEVELOP_STARTS.iter().any(|l| store.contains(*l)) {
            RoastStage::Development
        } else if store.contains(MAILLARD_END) {
            RoastStage::CrackSoon
        } else if store.contains(MAILLARD_START) {
            RoastStage::MaillardZone
        } else {
            RoastStage::Ready
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoastStage::Ready => "ready",
            RoastStage::MaillardZone => "maillard_zone",
            RoastStage::CrackSoon => "crack_soon",
            RoastStage::Development => "development",
            RoastStage::Complete => "complete",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RoastStage::Ready => "Ready",
            RoastStage::MaillardZone => "Maillard Zone",
            RoastStage::CrackSoon => "First crack soon!",
            RoastStage::Development => "CP - Development Zone started",
            RoastStage::Complete => "Roast complete!",
        }
    }

    pub fn message_ko(&self) -> &'static str {
        match self {
            RoastStage::Ready => "준비",
            RoastStage::MaillardZone => "메일라드 구간",
            RoastStage::CrackSoon => "곧 크랙 시작!",
            RoastStage::Development => "CP - Development Zone 시작",
            RoastStage::Complete => "로스팅 완료!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoastSession {
    clock: RoastClock,
    checkpoints: CheckpointStore,
    first_crack: Option<RoastTime>,
    second_crack: Option<RoastTime>,
    stage: RoastStage,
}

impl RoastSession {
    pub fn new(policy: CheckpointPolicy) -> Self {
        Self {
            clock: RoastClock::new(),
            checkpoints: CheckpointStore::new(policy),
            first_crack: None,
            second_crack: None,
            stage: RoastStage::Ready,
        }
    }

    /// Reopen a saved roast for editing.
    ///
    /// Checkpoints are copied as saved and the paused clock holds the
    /// record's total time.
    pub fn from_record(record: &RoastingRecord, policy: CheckpointPolicy) -> Self {
        let checkpoints =
            CheckpointStore::from_entries(policy, record.temps.clone(), record.final_temp);
        let stage = RoastStage::reached(&checkpoints);

        Self {
            clock: RoastClock::with_elapsed(record.total_time.as_secs()),
            checkpoints,
            first_crack: record.first_crack_time,
            second_crack: record.second_crack_time,
            stage,
        }
    }

    // ========================================================================
    // Clock control
    // ========================================================================

    /// Start or resume the timer. A discharged roast cannot be restarted.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.checkpoints.is_finalized() {
            tracing::warn!("Start ignored: roast already discharged");
            return false;
        }
        let started = self.clock.start(now_ms);
        if started {
            tracing::info!("Roast timer started at {}", self.elapsed());
        }
        started
    }

    pub fn pause(&mut self, now_ms: u64) -> bool {
        let paused = self.clock.pause(now_ms);
        if paused {
            tracing::info!("Roast timer paused at {}", self.elapsed());
        }
        paused
    }

    /// Back to a blank session: timer, checkpoints and crack marks cleared
    pub fn reset(&mut self) {
        self.clock.reset();
        self.checkpoints.clear();
        self.first_crack = None;
        self.second_crack = None;
        self.stage = RoastStage::Ready;
        tracing::info!("Roast session reset");
    }

    pub fn tick(&mut self, now_ms: u64) -> RoastTime {
        RoastTime::from_secs(self.clock.tick(now_ms))
    }

    // ========================================================================
    // Marks
    // ========================================================================

    /// Record a temperature checkpoint at the current elapsed time
    pub fn mark_temperature(
        &mut self,
        degrees: u16,
        now_ms: u64,
    ) -> Result<RecordOutcome, CheckpointError> {
        let time = self.tick(now_ms);
        let label = CheckpointLabel::Degrees(degrees);

        let outcome = match self.checkpoints.record(label, time) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Checkpoint {} rejected: {}", label, e);
                return Err(e);
            }
        };

        match outcome {
            RecordOutcome::Removed { previous } => {
                tracing::debug!("Checkpoint {} at {} cancelled", label, previous);
                self.stage = RoastStage::reached(&self.checkpoints);
            }
            _ => {
                tracing::debug!("Checkpoint {} recorded at {}", label, time);
                if let Some(stage) = RoastStage::entered_by(label) {
                    self.stage = stage;
                }
            }
        }
        Ok(outcome)
    }

    /// Record discharge: stops the timer and finalizes the checkpoints
    pub fn discharge(&mut self, now_ms: u64) -> Result<RoastTime, CheckpointError> {
        if self.checkpoints.is_finalized() {
            tracing::warn!("Discharge rejected: roast already discharged");
            return Err(CheckpointError::AlreadyFinalized);
        }

        self.clock.pause(now_ms);
        let time = self.elapsed();
        self.checkpoints.finalize(time)?;
        self.stage = RoastStage::Complete;

        tracing::info!(
            "Roast discharged at {} (final temp: {:?})",
            time,
            self.checkpoints.last_marked_temperature()
        );
        Ok(time)
    }

    pub fn mark_first_crack(&mut self, now_ms: u64) -> RoastTime {
        let time = self.tick(now_ms);
        self.first_crack = Some(time);
        tracing::debug!("First crack marked at {}", time);
        time
    }

    pub fn mark_second_crack(&mut self, now_ms: u64) -> RoastTime {
        let time = self.tick(now_ms);
        self.second_crack = Some(time);
        tracing::debug!("Second crack marked at {}", time);
        time
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn elapsed(&self) -> RoastTime {
        RoastTime::from_secs(self.clock.elapsed_seconds())
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn is_finalized(&self) -> bool {
        self.checkpoints.is_finalized()
    }

    /// Discharge time once recorded, current elapsed time before
    pub fn total_time(&self) -> RoastTime {
        self.checkpoints.end().unwrap_or_else(|| self.elapsed())
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    pub fn clock(&self) -> &RoastClock {
        &self.clock
    }

    pub fn stage(&self) -> RoastStage {
        self.stage
    }

    pub fn first_crack(&self) -> Option<RoastTime> {
        self.first_crack
    }

    pub fn second_crack(&self) -> Option<RoastTime> {
        self.second_crack
    }

    pub fn last_marked_temperature(&self) -> Option<u16> {
        self.checkpoints.last_marked_temperature()
    }

    pub fn metrics(&self, weights: Weights) -> MetricsSnapshot {
        MetricsSnapshot::compute(
            &self.checkpoints,
            self.elapsed(),
            self.is_running(),
            self.first_crack,
            weights,
        )
    }
}

impl Default for RoastSession {
    fn default() -> Self {
        Self::new(CheckpointPolicy::default())
    }
}
