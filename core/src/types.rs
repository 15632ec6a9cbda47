//! Common types used across the roast log

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{LabelParseError, TimeParseError};

/// Placeholder shown for a duration that cannot be computed yet
pub const UNDEFINED_TIME: &str = "--:--";

/// Placeholder shown for a percentage that cannot be computed yet
pub const UNDEFINED_PERCENT: &str = "--";

/// Temperature buttons offered by the recorder: 10° steps up to 180°, then 1° steps
pub const TEMP_BUTTONS: &[u16] = &[
    100, 110, 120, 130, 140, 150, 160, 170, 180, 181, 182, 183, 184, 185, 186, 187, 188, 189, 190,
    191, 192, 193, 194, 195,
];

/// Elapsed roast time in whole seconds.
///
/// Displayed and serialized as `MM:SS`. Minutes are zero padded to two digits
/// and simply grow past two digits for roasts longer than an hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RoastTime(u32);

impl RoastTime {
    pub const ZERO: RoastTime = RoastTime(0);

    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn as_secs(&self) -> u32 {
        self.0
    }

    /// Duration from `earlier` to `self`, undefined when `earlier` is later
    pub fn since(self, earlier: RoastTime) -> Option<RoastTime> {
        self.0.checked_sub(earlier.0).map(RoastTime)
    }
}

impl From<u32> for RoastTime {
    fn from(secs: u32) -> Self {
        Self(secs)
    }
}

impl fmt::Display for RoastTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_time(self.0))
    }
}

impl FromStr for RoastTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time(s).map(RoastTime)
    }
}

impl Serialize for RoastTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RoastTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Format seconds as `MM:SS`
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Parse `MM:SS` into total seconds
///
/// Minutes may have any number of digits; seconds must be 0-59.
pub fn parse_time(s: &str) -> Result<u32, TimeParseError> {
    let (minutes, seconds) = s
        .trim()
        .split_once(':')
        .ok_or_else(|| TimeParseError::MissingSeparator(s.to_string()))?;

    if minutes.is_empty() || !minutes.chars().all(|c| c.is_ascii_digit()) {
        return Err(TimeParseError::InvalidMinutes(minutes.to_string()));
    }
    if seconds.is_empty() || seconds.len() > 2 || !seconds.chars().all(|c| c.is_ascii_digit()) {
        return Err(TimeParseError::InvalidSeconds(seconds.to_string()));
    }

    let minutes: u32 = minutes
        .parse()
        .map_err(|_| TimeParseError::InvalidMinutes(minutes.to_string()))?;
    let seconds: u32 = seconds
        .parse()
        .map_err(|_| TimeParseError::InvalidSeconds(seconds.to_string()))?;

    if seconds > 59 {
        return Err(TimeParseError::SecondsOutOfRange(seconds));
    }

    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(|| TimeParseError::InvalidMinutes(s.to_string()))
}

/// Format an optional duration, falling back to the `--:--` placeholder
pub fn display_time(time: Option<RoastTime>) -> String {
    time.map(|t| t.to_string())
        .unwrap_or_else(|| UNDEFINED_TIME.to_string())
}

/// Format an optional percentage with two decimals, falling back to `--`
pub fn display_percent(percent: Option<Decimal>) -> String {
    percent
        .map(|p| format!("{:.2}%", p))
        .unwrap_or_else(|| UNDEFINED_PERCENT.to_string())
}

/// Label of a checkpoint: a temperature in degrees or the discharge sentinel.
///
/// The derived ordering puts every temperature (ascending) before `End`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckpointLabel {
    Degrees(u16),
    End,
}

impl CheckpointLabel {
    pub const END_KEY: &'static str = "end";

    /// Temperature value, `None` for the discharge sentinel
    pub fn degrees(&self) -> Option<u16> {
        match self {
            CheckpointLabel::Degrees(d) => Some(*d),
            CheckpointLabel::End => None,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, CheckpointLabel::End)
    }
}

impl From<u16> for CheckpointLabel {
    fn from(degrees: u16) -> Self {
        CheckpointLabel::Degrees(degrees)
    }
}

impl fmt::Display for CheckpointLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointLabel::Degrees(d) => write!(f, "{}", d),
            CheckpointLabel::End => write!(f, "{}", Self::END_KEY),
        }
    }
}

impl FromStr for CheckpointLabel {
    type Err = LabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(Self::END_KEY) {
            return Ok(CheckpointLabel::End);
        }
        match s.parse::<u16>() {
            Ok(0) => Err(LabelParseError::ZeroDegrees),
            Ok(d) => Ok(CheckpointLabel::Degrees(d)),
            Err(_) => Err(LabelParseError::Unrecognized(s.to_string())),
        }
    }
}

impl Serialize for CheckpointLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CheckpointLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
