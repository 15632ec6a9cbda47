//! User-entered roast details
//!
//! The form carries everything the user types or picks around a roast
//! (bean, weights, roaster settings, notes). Weight handling follows one
//! rule: until the user enters a roasted weight by hand, it tracks the green
//! weight at the default yield ratio.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use validator::Validate;

use crate::metrics::{auto_roasted_weight, Weights, DEFAULT_YIELD_RATIO};
use crate::models::{bean_origin, RoasterPreset, RoasterSettings, RoastingRecord};
use crate::validation::{validate_bean_name, validate_green_weight, MAX_NOTE_LENGTH};

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct RoastForm {
    /// User-supplied record id; blank means "derive one when saving"
    pub record_id: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    #[validate(custom = "validate_bean_name")]
    bean_name: String,
    pub bean_origin: Option<String>,
    #[validate(custom = "validate_green_weight")]
    green_weight: Decimal,
    roasted_weight: Option<Decimal>,
    roasted_overridden: bool,
    yield_ratio: Decimal,
    pub settings: RoasterSettings,
    #[validate(length(max = "MAX_NOTE_LENGTH"))]
    pub notes: Option<String>,
    #[validate(length(max = "MAX_NOTE_LENGTH"))]
    pub cupping_notes: Option<String>,
    #[validate(length(max = "MAX_NOTE_LENGTH"))]
    pub memo: Option<String>,
}

impl Default for RoastForm {
    fn default() -> Self {
        Self::new(DEFAULT_YIELD_RATIO)
    }
}

impl RoastForm {
    /// Empty form using `yield_ratio` for the automatic roasted weight
    pub fn new(yield_ratio: Decimal) -> Self {
        Self {
            record_id: String::new(),
            date: None,
            time: None,
            bean_name: String::new(),
            bean_origin: None,
            green_weight: Decimal::ZERO,
            roasted_weight: None,
            roasted_overridden: false,
            yield_ratio,
            settings: RoasterSettings::standard(),
            notes: None,
            cupping_notes: None,
            memo: None,
        }
    }

    /// Form prefilled from a saved record for editing.
    ///
    /// A saved roasted weight counts as a manual entry and is kept.
    pub fn from_record(record: &RoastingRecord, yield_ratio: Decimal) -> Self {
        Self {
            record_id: record.id.clone(),
            date: Some(record.date),
            time: record.time,
            bean_name: record.bean_name.clone(),
            bean_origin: record.bean_origin.clone(),
            green_weight: record.green_weight,
            roasted_weight: record.roasted_weight,
            roasted_overridden: record.roasted_weight.is_some(),
            yield_ratio,
            settings: RoasterSettings {
                fan1: record.fan1,
                heater: record.heater,
                fan2: record.fan2,
            },
            notes: record.notes.clone(),
            cupping_notes: record.cupping_notes.clone(),
            memo: record.memo.clone(),
        }
    }

    pub fn bean_name(&self) -> &str {
        &self.bean_name
    }

    /// Set the bean and derive its origin from the first word of the name
    pub fn set_bean_name(&mut self, name: &str) {
        self.bean_name = name.trim().to_string();
        self.bean_origin = bean_origin(&self.bean_name);
    }

    pub fn green_weight(&self) -> Decimal {
        self.green_weight
    }

    pub fn roasted_weight(&self) -> Option<Decimal> {
        self.roasted_weight
    }

    pub fn is_roasted_overridden(&self) -> bool {
        self.roasted_overridden
    }

    pub fn yield_ratio(&self) -> Decimal {
        self.yield_ratio
    }

    /// Set the green weight; the roasted weight follows unless entered by hand
    pub fn set_green_weight(&mut self, grams: Decimal) {
        self.green_weight = grams;
        if !self.roasted_overridden {
            self.roasted_weight = auto_roasted_weight(grams, self.yield_ratio);
        }
    }

    /// Enter the roasted weight by hand; later green weight changes keep it
    pub fn set_roasted_weight(&mut self, grams: Decimal) {
        self.roasted_weight = Some(grams);
        self.roasted_overridden = true;
    }

    /// Drop the manual roasted weight and go back to the automatic one
    pub fn clear_roasted_override(&mut self) {
        self.roasted_overridden = false;
        self.roasted_weight = auto_roasted_weight(self.green_weight, self.yield_ratio);
    }

    pub fn weights(&self) -> Weights {
        Weights {
            green: Some(self.green_weight).filter(|g| *g > Decimal::ZERO),
            roasted: self.roasted_weight,
        }
    }

    pub fn apply_preset(&mut self, preset: &RoasterPreset) {
        self.settings = preset.settings;
    }
}
