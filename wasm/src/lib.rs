//! WebAssembly bindings for the roast session engine
//!
//! Provides the browser recorder with:
//! - A session handle (timer, checkpoints, crack marks, form)
//! - Time formatting and parsing
//! - Yield and roasted weight helpers
//! - Record assembly and newest-first sorting
//!
//! Every timed method takes the caller's millisecond reading (`Date.now()`
//! in the browser), so the engine never reads a clock itself.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use roastlog_core::{
    add_preset, auto_roasted_weight, default_bean_list, default_presets, display_time,
    sort_newest_first, AssemblyError, CheckpointError, CheckpointPolicy, MetricsSnapshot, RecordOutcome, RoastForm,
    RoastSession, RoastStage, RoastTime, RoasterPreset, RoasterSettings, RoastingRecord, SessionAssembler,
    DEFAULT_YIELD_RATIO,
};

/// Error description handed to JavaScript
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Notice {
    code: &'static str,
    message_en: String,
    message_ko: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl From<&CheckpointError> for Notice {
    fn from(error: &CheckpointError) -> Self {
        let message_ko = match error {
            CheckpointError::Finalized { label } => {
                format!("이미 배출되었습니다. {}°는 기록되지 않았습니다.", label)
            }
            CheckpointError::AlreadyFinalized => "이미 배출되었습니다.".to_string(),
            CheckpointError::ZeroDegrees => "온도는 0보다 커야 합니다.".to_string(),
        };
        Notice {
            code: "CHECKPOINT_REJECTED",
            message_en: error.to_string(),
            message_ko,
            field: None,
        }
    }
}

impl From<&AssemblyError> for Notice {
    fn from(error: &AssemblyError) -> Self {
        match error {
            AssemblyError::Validation {
                field,
                message,
                message_ko,
            } => Notice {
                code: "VALIDATION_ERROR",
                message_en: message.clone(),
                message_ko: message_ko.clone(),
                field: Some(field.clone()),
            },
        }
    }
}

impl Notice {
    fn invalid_input(message: String) -> Self {
        Notice {
            code: "INVALID_INPUT",
            message_en: message,
            message_ko: "입력값이 올바르지 않습니다.".to_string(),
            field: None,
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message_en.clone())
    }
}

/// Log a rejected action to the browser console and turn it into a JS error
fn reject(notice: Notice) -> JsValue {
    let json = notice.to_json();
    web_sys::console::warn_1(&JsValue::from_str(&json));
    JsValue::from_str(&json)
}

/// Live view returned by [`RoastRecorderHandle::view_json`]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LiveView<'a> {
    metrics: MetricsSnapshot,
    stage: RoastStage,
    stage_message: &'static str,
    stage_message_ko: &'static str,
    finalized: bool,
    roasted_weight: Option<Decimal>,
    editing: Option<&'a str>,
}

fn decimal(value: f64) -> Option<Decimal> {
    Decimal::try_from(value).ok()
}

fn outcome_name(outcome: RecordOutcome) -> &'static str {
    match outcome {
        RecordOutcome::Recorded => "recorded",
        RecordOutcome::Overwritten { .. } => "overwritten",
        RecordOutcome::Removed { .. } => "removed",
    }
}

fn assembly_time(now_ms: f64, utc_offset_minutes: i32) -> Result<DateTime<FixedOffset>, Notice> {
    let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
        .ok_or_else(|| Notice::invalid_input(format!("Invalid UTC offset: {}", utc_offset_minutes)))?;
    Utc.timestamp_millis_opt(now_ms as i64)
        .single()
        .map(|utc| utc.with_timezone(&offset))
        .ok_or_else(|| Notice::invalid_input(format!("Invalid timestamp: {}", now_ms)))
}

/// One roast being recorded in the browser
#[wasm_bindgen]
pub struct RoastRecorderHandle {
    session: RoastSession,
    form: RoastForm,
    policy: CheckpointPolicy,
    presets: Vec<RoasterPreset>,
    editing: Option<(String, DateTime<Utc>)>,
}

impl RoastRecorderHandle {
    fn with_policy(policy: CheckpointPolicy) -> Self {
        Self {
            session: RoastSession::new(policy),
            form: RoastForm::new(DEFAULT_YIELD_RATIO),
            policy,
            presets: default_presets(),
            editing: None,
        }
    }

    fn mark(&mut self, degrees: u16, now_ms: f64) -> Result<RecordOutcome, Notice> {
        self.session
            .mark_temperature(degrees, now_ms as u64)
            .map_err(|e| Notice::from(&e))
    }

    fn finish(&mut self, now_ms: f64) -> Result<String, Notice> {
        self.session
            .discharge(now_ms as u64)
            .map(|t| t.to_string())
            .map_err(|e| Notice::from(&e))
    }

    fn view(&self) -> LiveView<'_> {
        let stage = self.session.stage();
        LiveView {
            metrics: self.session.metrics(self.form.weights()),
            stage,
            stage_message: stage.message(),
            stage_message_ko: stage.message_ko(),
            finalized: self.session.is_finalized(),
            roasted_weight: self.form.roasted_weight(),
            editing: self.editing.as_ref().map(|(id, _)| id.as_str()),
        }
    }

    fn assemble(&self, now: DateTime<FixedOffset>) -> Result<RoastingRecord, Notice> {
        let mut assembler = SessionAssembler::new(now);
        if let Some((_, created_at)) = &self.editing {
            assembler = assembler.editing(*created_at);
        }
        assembler
            .assemble(&self.form, &self.session)
            .map_err(|e| Notice::from(&e))
    }

    fn load(&mut self, record: &RoastingRecord) {
        self.session = RoastSession::from_record(record, self.policy);
        self.form = RoastForm::from_record(record, DEFAULT_YIELD_RATIO);
        self.editing = Some((record.id.clone(), record.created_at));
    }

    fn set_schedule(&mut self, date: &str, time: &str) -> Result<(), Notice> {
        self.form.date = match date.trim() {
            "" => None,
            d => Some(
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .map_err(|e| Notice::invalid_input(format!("Invalid date {}: {}", d, e)))?,
            ),
        };
        self.form.time = match time.trim() {
            "" => None,
            t => Some(
                NaiveTime::parse_from_str(t, "%H:%M")
                    .map_err(|e| Notice::invalid_input(format!("Invalid time {}: {}", t, e)))?,
            ),
        };
        Ok(())
    }
}

#[wasm_bindgen]
impl RoastRecorderHandle {
    /// New handle; `toggle` makes a second press on a temperature cancel it
    #[wasm_bindgen(constructor)]
    pub fn new(toggle: bool) -> Self {
        let policy = if toggle {
            CheckpointPolicy::Toggle
        } else {
            CheckpointPolicy::Overwrite
        };
        Self::with_policy(policy)
    }

    pub fn start(&mut self, now_ms: f64) -> bool {
        self.session.start(now_ms as u64)
    }

    pub fn pause(&mut self, now_ms: f64) -> bool {
        self.session.pause(now_ms as u64)
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Advance the timer; returns the elapsed time as `MM:SS`
    pub fn tick(&mut self, now_ms: f64) -> String {
        self.session.tick(now_ms as u64).to_string()
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    /// Record a temperature; returns "recorded", "overwritten" or "removed"
    pub fn mark_temperature(&mut self, degrees: u16, now_ms: f64) -> Result<String, JsValue> {
        self.mark(degrees, now_ms)
            .map(|o| outcome_name(o).to_string())
            .map_err(reject)
    }

    /// Record discharge; returns the discharge time as `MM:SS`
    pub fn discharge(&mut self, now_ms: f64) -> Result<String, JsValue> {
        self.finish(now_ms).map_err(reject)
    }

    pub fn mark_first_crack(&mut self, now_ms: f64) -> String {
        self.session.mark_first_crack(now_ms as u64).to_string()
    }

    pub fn mark_second_crack(&mut self, now_ms: f64) -> String {
        self.session.mark_second_crack(now_ms as u64).to_string()
    }

    pub fn set_bean_name(&mut self, name: &str) {
        self.form.set_bean_name(name);
    }

    pub fn set_green_weight(&mut self, grams: f64) {
        self.form.set_green_weight(decimal(grams).unwrap_or(Decimal::ZERO));
    }

    pub fn set_roasted_weight(&mut self, grams: f64) {
        if let Some(grams) = decimal(grams) {
            self.form.set_roasted_weight(grams);
        }
    }

    pub fn clear_roasted_override(&mut self) {
        self.form.clear_roasted_override();
    }

    pub fn set_settings(&mut self, fan1: Option<f64>, heater: Option<f64>, fan2: Option<f64>) {
        self.form.settings = RoasterSettings {
            fan1: fan1.and_then(decimal),
            heater: heater.and_then(decimal),
            fan2: fan2.and_then(decimal),
        };
    }

    /// Apply one of the handle's presets by position
    pub fn apply_preset(&mut self, index: usize) -> bool {
        match self.presets.get(index) {
            Some(preset) => {
                self.form.apply_preset(preset);
                true
            }
            None => false,
        }
    }

    /// Append a preset with standard settings; returns its name
    pub fn add_preset(&mut self) -> String {
        let preset = add_preset(&mut self.presets);
        preset.name.clone()
    }

    pub fn presets_json(&self) -> String {
        serde_json::to_string(&self.presets).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn set_notes(&mut self, notes: Option<String>, cupping_notes: Option<String>, memo: Option<String>) {
        self.form.notes = notes;
        self.form.cupping_notes = cupping_notes;
        self.form.memo = memo;
    }

    pub fn set_record_id(&mut self, id: &str) {
        self.form.record_id = id.to_string();
    }

    /// Roast date (`YYYY-MM-DD`) and start time (`HH:MM`); blanks clear them
    pub fn set_date_time(&mut self, date: &str, time: &str) -> Result<(), JsValue> {
        self.set_schedule(date, time).map_err(reject)
    }

    pub fn stage_message(&self, korean: bool) -> String {
        let stage = self.session.stage();
        if korean {
            stage.message_ko().to_string()
        } else {
            stage.message().to_string()
        }
    }

    /// Current metrics, stage and roasted weight as JSON
    pub fn view_json(&mut self, now_ms: f64) -> Result<String, JsValue> {
        self.session.tick(now_ms as u64);
        serde_json::to_string(&self.view()).map_err(|e| reject(Notice::invalid_input(e.to_string())))
    }

    /// Assemble the record as JSON. `utc_offset_minutes` is the local offset
    /// (`-new Date().getTimezoneOffset()`).
    pub fn record_json(&mut self, now_ms: f64, utc_offset_minutes: i32) -> Result<String, JsValue> {
        self.session.tick(now_ms as u64);
        let now = assembly_time(now_ms, utc_offset_minutes).map_err(reject)?;
        let record = self.assemble(now).map_err(reject)?;
        serde_json::to_string(&record).map_err(|e| reject(Notice::invalid_input(e.to_string())))
    }

    /// Clear the session and form after the record was stored
    pub fn start_new(&mut self) {
        let presets = std::mem::take(&mut self.presets);
        *self = Self::with_policy(self.policy);
        self.presets = presets;
    }

    /// Open a saved record (JSON) for editing
    pub fn load_record(&mut self, record_json: &str) -> Result<(), JsValue> {
        let record: RoastingRecord = serde_json::from_str(record_json)
            .map_err(|e| reject(Notice::invalid_input(format!("Invalid record JSON: {}", e))))?;
        self.load(&record);
        Ok(())
    }
}

/// Format whole seconds as `MM:SS`
#[wasm_bindgen]
pub fn format_time(seconds: u32) -> String {
    roastlog_core::format_time(seconds)
}

/// Parse `MM:SS` into whole seconds
#[wasm_bindgen]
pub fn parse_time(text: &str) -> Result<u32, JsValue> {
    roastlog_core::parse_time(text).map_err(|e| reject(Notice::invalid_input(e.to_string())))
}

/// Duration in seconds as `MM:SS`, or the placeholder when undefined
#[wasm_bindgen]
pub fn display_duration(seconds: Option<u32>) -> String {
    display_time(seconds.map(RoastTime::from_secs))
}

/// Roasted weight as a percentage of green weight, two decimals
#[wasm_bindgen]
pub fn yield_percent(green: f64, roasted: f64) -> Option<f64> {
    roastlog_core::yield_percent(decimal(green), decimal(roasted)).and_then(|y| y.to_f64())
}

/// Default roasted weight for a green weight (85%, whole grams)
#[wasm_bindgen]
pub fn default_roasted_weight(green: f64) -> Option<f64> {
    auto_roasted_weight(decimal(green)?, DEFAULT_YIELD_RATIO).and_then(|w| w.to_f64())
}

#[wasm_bindgen]
pub fn default_beans_json() -> String {
    serde_json::to_string(&default_bean_list()).unwrap_or_else(|_| "[]".to_string())
}

#[wasm_bindgen]
pub fn default_presets_json() -> String {
    serde_json::to_string(&default_presets()).unwrap_or_else(|_| "[]".to_string())
}

fn sort_records(records_json: &str) -> Result<String, Notice> {
    let mut records: Vec<RoastingRecord> = serde_json::from_str(records_json)
        .map_err(|e| Notice::invalid_input(format!("Invalid records JSON: {}", e)))?;
    sort_newest_first(&mut records);
    serde_json::to_string(&records).map_err(|e| Notice::invalid_input(e.to_string()))
}

/// Sort a JSON array of records newest first
#[wasm_bindgen]
pub fn sort_records_json(records_json: &str) -> Result<String, JsValue> {
    sort_records(records_json).map_err(reject)
}
