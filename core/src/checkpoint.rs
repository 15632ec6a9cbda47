//! Checkpoint store: label → elapsed time for one roast

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CheckpointError;
use crate::types::{CheckpointLabel, RoastTime};

/// What happens when a label that already has a time is recorded again.
///
/// A store uses one policy for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointPolicy {
    /// Replace the stored time with the new one
    #[default]
    Overwrite,
    /// Remove the stored time (the second press cancels the first)
    Toggle,
}

impl CheckpointPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointPolicy::Overwrite => "overwrite",
            CheckpointPolicy::Toggle => "toggle",
        }
    }

}

/// Effect of a successful `record` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    Overwritten { previous: RoastTime },
    Removed { previous: RoastTime },
}

/// Checkpoints of one roast session.
///
/// Once the `end` checkpoint exists the store is finalized and rejects
/// further temperature checkpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointStore {
    policy: CheckpointPolicy,
    entries: BTreeMap<CheckpointLabel, RoastTime>,
    last_clicked: Option<u16>,
    last_marked_temperature: Option<u16>,
}

impl CheckpointStore {
    pub fn new(policy: CheckpointPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Rebuild a store from saved checkpoints, copied verbatim.
    ///
    /// The store comes back finalized when the entries include `end`.
    pub fn from_entries(
        policy: CheckpointPolicy,
        entries: BTreeMap<CheckpointLabel, RoastTime>,
        last_marked_temperature: Option<u16>,
    ) -> Self {
        Self {
            policy,
            entries,
            last_clicked: last_marked_temperature,
            last_marked_temperature,
        }
    }

    pub fn policy(&self) -> CheckpointPolicy {
        self.policy
    }

    pub fn is_finalized(&self) -> bool {
        self.entries.contains_key(&CheckpointLabel::End)
    }

    /// Record a checkpoint according to the store's policy.
    ///
    /// Recording `end` finalizes the store.
    pub fn record(
        &mut self,
        label: CheckpointLabel,
        time: RoastTime,
    ) -> Result<RecordOutcome, CheckpointError> {
        let degrees = match label {
            CheckpointLabel::End => {
                self.finalize(time)?;
                return Ok(RecordOutcome::Recorded);
            }
            CheckpointLabel::Degrees(0) => return Err(CheckpointError::ZeroDegrees),
            CheckpointLabel::Degrees(d) => d,
        };

        if self.is_finalized() {
            return Err(CheckpointError::Finalized { label });
        }

        let outcome = match (self.policy, self.entries.get(&label).copied()) {
            (CheckpointPolicy::Toggle, Some(previous)) => {
                self.entries.remove(&label);
                if self.last_clicked == Some(degrees) {
                    self.last_clicked = None;
                }
                return Ok(RecordOutcome::Removed { previous });
            }
            (CheckpointPolicy::Overwrite, Some(previous)) => RecordOutcome::Overwritten { previous },
            (_, None) => RecordOutcome::Recorded,
        };

        self.entries.insert(label, time);
        self.last_clicked = Some(degrees);
        Ok(outcome)
    }

    /// Record the discharge checkpoint and capture the final temperature
    pub fn finalize(&mut self, time: RoastTime) -> Result<(), CheckpointError> {
        if self.is_finalized() {
            return Err(CheckpointError::AlreadyFinalized);
        }

        self.last_marked_temperature = self
            .last_clicked
            .filter(|d| self.entries.contains_key(&CheckpointLabel::Degrees(*d)))
            .or_else(|| self.latest_degrees_before(time));
        self.entries.insert(CheckpointLabel::End, time);
        Ok(())
    }

    /// Temperature with the latest time strictly before `end`
    fn latest_degrees_before(&self, end: RoastTime) -> Option<u16> {
        self.entries
            .iter()
            .filter_map(|(label, time)| label.degrees().map(|d| (*time, d)))
            .filter(|(time, _)| *time < end)
            .max()
            .map(|(_, d)| d)
    }

    pub fn get(&self, label: CheckpointLabel) -> Option<RoastTime> {
        self.entries.get(&label).copied()
    }

    pub fn contains(&self, label: CheckpointLabel) -> bool {
        self.entries.contains_key(&label)
    }

    /// Time of the discharge checkpoint
    pub fn end(&self) -> Option<RoastTime> {
        self.get(CheckpointLabel::End)
    }

    /// Temperature captured when the roast was finalized
    pub fn last_marked_temperature(&self) -> Option<u16> {
        self.last_marked_temperature
    }

    /// Most recently recorded temperature that is still in the store
    pub fn last_clicked(&self) -> Option<u16> {
        self.last_clicked
    }

    /// Checkpoints with temperatures ascending and `end` last
    pub fn sorted_entries(&self) -> impl Iterator<Item = (CheckpointLabel, RoastTime)> + '_ {
        self.entries.iter().map(|(label, time)| (*label, *time))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owned copy of the entries, as stored on a record
    pub fn to_map(&self) -> BTreeMap<CheckpointLabel, RoastTime> {
        self.entries.clone()
    }

    /// Remove every checkpoint; the policy is kept
    pub fn clear(&mut self) {
        *self = Self::new(self.policy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(secs: u32) -> RoastTime {
        RoastTime::from_secs(secs)
    }

    fn deg(d: u16) -> CheckpointLabel {
        CheckpointLabel::Degrees(d)
    }

    #[test]
    fn test_record_and_get() {
        let mut store = CheckpointStore::new(CheckpointPolicy::Overwrite);
        assert_eq!(store.record(deg(150), t(300)), Ok(RecordOutcome::Recorded));
        assert_eq!(store.get(deg(150)), Some(t(300)));
        assert_eq!(store.get(deg(180)), None);
    }

    #[test]
    fn test_overwrite_policy_replaces_time() {
        let mut store = CheckpointStore::new(CheckpointPolicy::Overwrite);
        store.record(deg(150), t(300)).unwrap();
        assert_eq!(
            store.record(deg(150), t(310)),
            Ok(RecordOutcome::Overwritten { previous: t(300) })
        );
        assert_eq!(store.get(deg(150)), Some(t(310)));
    }

    #[test]
    fn test_toggle_policy_removes_on_second_record() {
        let mut store = CheckpointStore::new(CheckpointPolicy::Toggle);
        store.record(deg(150), t(300)).unwrap();
        assert_eq!(
            store.record(deg(150), t(320)),
            Ok(RecordOutcome::Removed { previous: t(300) })
        );
        assert!(!store.contains(deg(150)));
        assert_eq!(store.last_clicked(), None);
    }

    #[test]
    fn test_finalized_store_rejects_degrees() {
        let mut store = CheckpointStore::new(CheckpointPolicy::Overwrite);
        store.record(deg(150), t(300)).unwrap();
        store.finalize(t(700)).unwrap();
        assert_eq!(
            store.record(deg(190), t(710)),
            Err(CheckpointError::Finalized { label: deg(190) })
        );
        assert!(!store.contains(deg(190)));
    }

    #[test]
    fn test_zero_degrees_rejected() {
        let mut store = CheckpointStore::new(CheckpointPolicy::Overwrite);
        assert_eq!(store.record(deg(0), t(10)), Err(CheckpointError::ZeroDegrees));
        assert!(store.is_empty());
    }

    #[test]
    fn test_finalize_twice_is_rejected() {
        let mut store = CheckpointStore::new(CheckpointPolicy::Overwrite);
        store.finalize(t(700)).unwrap();
        assert_eq!(store.finalize(t(720)), Err(CheckpointError::AlreadyFinalized));
        assert_eq!(store.end(), Some(t(700)));
    }

    #[test]
    fn test_record_end_finalizes() {
        let mut store = CheckpointStore::new(CheckpointPolicy::Toggle);
        store.record(CheckpointLabel::End, t(600)).unwrap();
        assert!(store.is_finalized());
    }

    #[test]
    fn test_finalize_captures_last_clicked_temperature() {
        let mut store = CheckpointStore::new(CheckpointPolicy::Overwrite);
        store.record(deg(190), t(650)).unwrap();
        // clicked out of order: 185 is the last press even though 190 is later
        store.record(deg(185), t(640)).unwrap();
        store.finalize(t(700)).unwrap();
        assert_eq!(store.last_marked_temperature(), Some(185));
    }

    #[test]
    fn test_finalize_falls_back_to_latest_time_when_last_click_cancelled() {
        let mut store = CheckpointStore::new(CheckpointPolicy::Toggle);
        store.record(deg(180), t(500)).unwrap();
        store.record(deg(183), t(560)).unwrap();
        store.record(deg(190), t(620)).unwrap();
        store.record(deg(190), t(630)).unwrap();
        store.finalize(t(700)).unwrap();
        assert_eq!(store.last_marked_temperature(), Some(183));
    }

    #[test]
    fn test_finalize_fallback_ignores_same_second_as_end() {
        let mut store = CheckpointStore::new(CheckpointPolicy::Toggle);
        store.record(deg(185), t(640)).unwrap();
        store.record(deg(195), t(700)).unwrap();
        store.record(deg(200), t(705)).unwrap();
        store.record(deg(200), t(706)).unwrap();
        store.finalize(t(700)).unwrap();
        assert_eq!(store.last_marked_temperature(), Some(185));
    }

    #[test]
    fn test_finalize_without_temperatures() {
        let mut store = CheckpointStore::new(CheckpointPolicy::Overwrite);
        store.finalize(t(30)).unwrap();
        assert_eq!(store.last_marked_temperature(), None);
    }

    #[test]
    fn test_sorted_entries_numeric_then_end() {
        let mut store = CheckpointStore::new(CheckpointPolicy::Overwrite);
        store.record(deg(183), t(600)).unwrap();
        store.record(deg(100), t(60)).unwrap();
        store.record(deg(1000), t(650)).unwrap();
        store.finalize(t(700)).unwrap();

        let labels: Vec<_> = store.sorted_entries().map(|(label, _)| label).collect();
        assert_eq!(labels, vec![deg(100), deg(183), deg(1000), CheckpointLabel::End]);

        // restartable
        assert_eq!(store.sorted_entries().count(), 4);
    }

    #[test]
    fn test_from_entries_with_end_is_finalized() {
        let mut entries = BTreeMap::new();
        entries.insert(deg(183), t(600));
        entries.insert(CheckpointLabel::End, t(720));
        let mut store = CheckpointStore::from_entries(CheckpointPolicy::Overwrite, entries, Some(183));
        assert!(store.is_finalized());
        assert_eq!(store.last_marked_temperature(), Some(183));
        assert!(store.record(deg(190), t(730)).is_err());
    }

    #[test]
    fn test_clear_keeps_policy() {
        let mut store = CheckpointStore::new(CheckpointPolicy::Toggle);
        store.record(deg(150), t(300)).unwrap();
        store.finalize(t(400)).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert!(!store.is_finalized());
        assert_eq!(store.policy(), CheckpointPolicy::Toggle);
    }
}
