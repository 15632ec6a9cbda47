//! Saved roast records

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CheckpointLabel, RoastTime};

/// A finished (or abandoned and saved) roast.
///
/// Records are immutable: editing loads one into a new session and saving
/// produces a replacement record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoastingRecord {
    pub id: String,
    pub date: NaiveDate,
    /// Roast start time of day (HH:MM)
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hh_mm")]
    pub time: Option<NaiveTime>,
    pub bean_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bean_origin: Option<String>,
    /// Grams
    pub green_weight: Decimal,
    /// Grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roasted_weight: Option<Decimal>,
    #[serde(rename = "yield", default, skip_serializing_if = "Option::is_none")]
    pub yield_percent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan1: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heater: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan2: Option<Decimal>,
    /// Checkpoint label → elapsed time
    #[serde(default)]
    pub temps: BTreeMap<CheckpointLabel, RoastTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_crack_time: Option<RoastTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_crack_time: Option<RoastTime>,
    /// Last temperature marked before discharge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_temp: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maillard_time: Option<RoastTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maillard_percent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub develop_time: Option<RoastTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub develop_percent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtr: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_crack_to_discharge: Option<RoastTime>,
    pub total_time: RoastTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cupping_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoastingRecord {
    /// Checkpoints in display order: temperatures ascending, `end` last
    pub fn sorted_temps(&self) -> impl Iterator<Item = (CheckpointLabel, RoastTime)> + '_ {
        self.temps.iter().map(|(label, time)| (*label, *time))
    }

    /// Newest-first ordering by roast date, then time of day
    pub fn cmp_newest_first(&self, other: &Self) -> Ordering {
        (other.date, other.time).cmp(&(self.date, self.time))
    }
}

/// Sort records for the list view, newest roast first
pub fn sort_newest_first(records: &mut [RoastingRecord]) {
    records.sort_by(|a, b| a.cmp_newest_first(b));
}

/// `HH:MM` encoding for an optional time of day
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.collect_str(&t.format(FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveTime::parse_from_str(s, FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
                .map(Some)
                .map_err(de::Error::custom),
        }
    }
}
