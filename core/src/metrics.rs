//! Derived roast metrics
//!
//! Every calculator is a pure function of the checkpoint store, the current
//! elapsed time and the weights. `None` means "not computable yet" and is
//! shown as a placeholder, never as zero.
//!
//! - Maillard: 150° → 180°
//! - Development: 182° (or 183° when 182° was skipped) → discharge
//! - DTR: development time as a percentage of total roast time
//! - Yield: roasted weight as a percentage of green weight

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::checkpoint::CheckpointStore;
use crate::types::{CheckpointLabel, RoastTime};

pub const MAILLARD_START: CheckpointLabel = CheckpointLabel::Degrees(150);
pub const MAILLARD_END: CheckpointLabel = CheckpointLabel::Degrees(180);

/// Development starts at the first of these that was recorded, in this order
pub const DEVELOP_STARTS: [CheckpointLabel; 2] =
    [CheckpointLabel::Degrees(182), CheckpointLabel::Degrees(183)];

/// Roasted/green ratio assumed until the roasted weight is entered (85%)
pub const DEFAULT_YIELD_RATIO: Decimal = Decimal::from_parts(85, 0, 0, false, 2);

/// Round to two decimal places, halves away from zero
fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `part / whole × 100`, two decimals; undefined when `whole` is zero
pub fn percent_of(part: RoastTime, whole: RoastTime) -> Option<Decimal> {
    if whole.as_secs() == 0 {
        return None;
    }
    let part = Decimal::from(part.as_secs()) * Decimal::ONE_HUNDRED;
    Some(round2(part / Decimal::from(whole.as_secs())))
}

// ============================================================================
// Maillard
// ============================================================================

/// Exact Maillard duration once both 150° and 180° are recorded
pub fn maillard_duration(store: &CheckpointStore) -> Option<RoastTime> {
    let start = store.get(MAILLARD_START)?;
    store.get(MAILLARD_END)?.since(start)
}

/// In-progress Maillard estimate: after 150°, before 180°, while running
pub fn live_maillard_duration(
    store: &CheckpointStore,
    elapsed: RoastTime,
    running: bool,
) -> Option<RoastTime> {
    if !running || store.contains(MAILLARD_END) {
        return None;
    }
    let start = store.get(MAILLARD_START)?;
    elapsed.since(start).filter(|d| d.as_secs() > 0)
}

/// Maillard duration as a percentage of `reference` elapsed time
pub fn maillard_percent(duration: Option<RoastTime>, reference: RoastTime) -> Option<Decimal> {
    percent_of(duration?, reference)
}

// ============================================================================
// Development
// ============================================================================

/// Time of the first development checkpoint (182° wins over 183°)
pub fn develop_start(store: &CheckpointStore) -> Option<RoastTime> {
    DEVELOP_STARTS.iter().find_map(|label| store.get(*label))
}

/// Exact development duration once discharge is recorded
pub fn develop_duration(store: &CheckpointStore) -> Option<RoastTime> {
    let start = develop_start(store)?;
    store.end()?.since(start)
}

/// In-progress development time: after the start checkpoint, before discharge, while running
pub fn live_develop_duration(
    store: &CheckpointStore,
    elapsed: RoastTime,
    running: bool,
) -> Option<RoastTime> {
    if !running || store.is_finalized() {
        return None;
    }
    elapsed.since(develop_start(store)?)
}

/// Development Time Ratio against the total roast time
pub fn dtr(develop: Option<RoastTime>, total: Option<RoastTime>) -> Option<Decimal> {
    percent_of(develop?, total?)
}

/// Development Time Ratio against the current elapsed time
pub fn current_dtr(develop: Option<RoastTime>, elapsed: RoastTime) -> Option<Decimal> {
    percent_of(develop?, elapsed)
}

/// First crack to discharge; undefined if either is missing or out of order
pub fn first_crack_to_discharge(
    first_crack: Option<RoastTime>,
    end: Option<RoastTime>,
) -> Option<RoastTime> {
    end?.since(first_crack?)
}

// ============================================================================
// Weights
// ============================================================================

/// Roasted weight as a percentage of green weight
pub fn yield_percent(green: Option<Decimal>, roasted: Option<Decimal>) -> Option<Decimal> {
    let green = green.filter(|g| *g > Decimal::ZERO)?;
    let roasted = roasted.filter(|r| *r > Decimal::ZERO)?;
    Some(round2(roasted * Decimal::ONE_HUNDRED / green))
}

/// Default roasted weight for a green weight, rounded to whole grams
pub fn auto_roasted_weight(green: Decimal, ratio: Decimal) -> Option<Decimal> {
    if green <= Decimal::ZERO {
        return None;
    }
    Some((green * ratio).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

/// Green and roasted weights in grams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weights {
    pub green: Option<Decimal>,
    pub roasted: Option<Decimal>,
}

// ============================================================================
// Live / frozen phases
// ============================================================================

/// Display state of a timed phase (Maillard or Development)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseState {
    /// Start checkpoint not recorded
    NotStarted,
    /// Started, not ended, clock running: value follows the clock
    Live,
    /// Ended (exact value) or clock paused mid-phase
    Frozen,
}

impl PhaseState {
    pub fn of(start: Option<RoastTime>, end: Option<RoastTime>, running: bool) -> Self {
        match (start, end) {
            (None, _) => PhaseState::NotStarted,
            (Some(_), Some(_)) => PhaseState::Frozen,
            (Some(_), None) if running => PhaseState::Live,
            (Some(_), None) => PhaseState::Frozen,
        }
    }
}

/// The phases tracked live during a roast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Maillard,
    Develop,
}

impl Phase {
    pub fn start(&self, store: &CheckpointStore) -> Option<RoastTime> {
        match self {
            Phase::Maillard => store.get(MAILLARD_START),
            Phase::Develop => develop_start(store),
        }
    }

    pub fn end(&self, store: &CheckpointStore) -> Option<RoastTime> {
        match self {
            Phase::Maillard => store.get(MAILLARD_END),
            Phase::Develop => store.end(),
        }
    }

    /// Current reading of the phase.
    ///
    /// Percentages use the discharge time once the roast is finalized and
    /// the current elapsed time before that.
    pub fn reading(&self, store: &CheckpointStore, elapsed: RoastTime, running: bool) -> PhaseReading {
        let start = self.start(store);
        let end = self.end(store);
        let state = PhaseState::of(start, end, running);

        let duration = match state {
            PhaseState::NotStarted => None,
            PhaseState::Frozen if end.is_some() => match self {
                Phase::Maillard => maillard_duration(store),
                Phase::Develop => develop_duration(store),
            },
            // paused mid-phase: the clock is frozen, so the in-progress value holds
            PhaseState::Live | PhaseState::Frozen => match self {
                Phase::Maillard => live_maillard_duration(store, elapsed, true),
                Phase::Develop => live_develop_duration(store, elapsed, true),
            },
        };

        let reference = store.end().unwrap_or(elapsed);
        PhaseReading {
            state,
            duration,
            percent: duration.and_then(|d| percent_of(d, reference)),
        }
    }
}

/// Duration and share of total time for one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseReading {
    pub state: PhaseState,
    pub duration: Option<RoastTime>,
    pub percent: Option<Decimal>,
}

/// Everything the recorder shows for a session at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub elapsed: RoastTime,
    pub running: bool,
    /// Discharge time if recorded, else current elapsed
    pub total_time: RoastTime,
    pub maillard: PhaseReading,
    pub develop: PhaseReading,
    /// Final DTR after discharge, current DTR before
    pub dtr: Option<Decimal>,
    #[serde(rename = "yield")]
    pub yield_percent: Option<Decimal>,
    pub first_crack_to_discharge: Option<RoastTime>,
}

impl MetricsSnapshot {
    pub fn compute(
        store: &CheckpointStore,
        elapsed: RoastTime,
        running: bool,
        first_crack: Option<RoastTime>,
        weights: Weights,
    ) -> Self {
        let maillard = Phase::Maillard.reading(store, elapsed, running);
        let develop = Phase::Develop.reading(store, elapsed, running);

        let dtr = if store.is_finalized() {
            dtr(develop_duration(store), store.end())
        } else {
            current_dtr(develop.duration, elapsed)
        };

        Self {
            elapsed,
            running,
            total_time: store.end().unwrap_or(elapsed),
            maillard,
            develop,
            dtr,
            yield_percent: yield_percent(weights.green, weights.roasted),
            first_crack_to_discharge: first_crack_to_discharge(first_crack, store.end()),
        }
    }
}
