//! Turns the live session plus the form into an immutable record

use chrono::{DateTime, FixedOffset, Utc};
use validator::Validate;

use crate::error::AssemblyError;
use crate::form::RoastForm;
use crate::metrics::{
    develop_duration, dtr, first_crack_to_discharge, maillard_duration, percent_of, yield_percent,
};
use crate::models::{bean_origin, RoastingRecord};
use crate::session::RoastSession;
use crate::validation::to_assembly_error;

/// Record id format used when the form leaves the id blank
pub const RECORD_ID_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Builds records at a fixed instant.
///
/// `now` carries the user's local offset so generated ids and default dates
/// follow the local calendar.
#[derive(Debug, Clone, Copy)]
pub struct SessionAssembler {
    now: DateTime<FixedOffset>,
    created_at: Option<DateTime<Utc>>,
}

impl SessionAssembler {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now,
            created_at: None,
        }
    }

    /// Keep the creation time of the record being edited
    pub fn editing(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn record_id(&self, form: &RoastForm) -> String {
        match form.record_id.trim() {
            "" => self.now.format(RECORD_ID_FORMAT).to_string(),
            id => id.to_string(),
        }
    }

    pub fn assemble(
        &self,
        form: &RoastForm,
        session: &RoastSession,
    ) -> Result<RoastingRecord, AssemblyError> {
        form.validate().map_err(|e| {
            let error = to_assembly_error(&e);
            tracing::debug!("Record not assembled: {}", error);
            error
        })?;

        let weights = form.weights();
        let store = session.checkpoints();
        let total_time = session.total_time();

        // saved metrics are the exact ones; live estimates are display-only
        let maillard_time = maillard_duration(store);
        let develop_time = develop_duration(store);

        let bean_name = form.bean_name().trim().to_string();
        let origin = form
            .bean_origin
            .clone()
            .filter(|o| !o.trim().is_empty())
            .or_else(|| bean_origin(&bean_name));
        let now_utc = self.now.with_timezone(&Utc);

        Ok(RoastingRecord {
            id: self.record_id(form),
            date: form.date.unwrap_or_else(|| self.now.date_naive()),
            time: form.time,
            bean_name,
            bean_origin: origin,
            green_weight: form.green_weight(),
            roasted_weight: weights.roasted,
            yield_percent: yield_percent(weights.green, weights.roasted),
            fan1: form.settings.fan1,
            heater: form.settings.heater,
            fan2: form.settings.fan2,
            temps: store.to_map(),
            first_crack_time: session.first_crack(),
            second_crack_time: session.second_crack(),
            final_temp: session.last_marked_temperature(),
            maillard_time,
            maillard_percent: maillard_time.and_then(|d| percent_of(d, total_time)),
            develop_time,
            develop_percent: develop_time.and_then(|d| percent_of(d, total_time)),
            dtr: dtr(develop_time, store.end()),
            first_crack_to_discharge: first_crack_to_discharge(session.first_crack(), store.end()),
            total_time,
            notes: non_blank(&form.notes),
            cupping_notes: non_blank(&form.cupping_notes),
            memo: non_blank(&form.memo),
            created_at: self.created_at.unwrap_or(now_utc),
            updated_at: now_utc,
        })
    }
}

fn non_blank(text: &Option<String>) -> Option<String> {
    text.clone().filter(|t| !t.trim().is_empty())
}
