//! Roaster settings presets

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Initial fan and heater settings of the roaster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoasterSettings {
    pub fan1: Option<Decimal>,
    pub heater: Option<Decimal>,
    pub fan2: Option<Decimal>,
}

impl RoasterSettings {
    pub fn new(fan1: Decimal, heater: Decimal, fan2: Decimal) -> Self {
        Self {
            fan1: Some(fan1),
            heater: Some(heater),
            fan2: Some(fan2),
        }
    }

    /// Settings a new roast starts with (FAN1 75, heater 90, FAN2 2.5)
    pub fn standard() -> Self {
        Self::new(Decimal::from(75), Decimal::from(90), Decimal::new(25, 1))
    }
}

/// Named set of roaster settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoasterPreset {
    pub name: String,
    #[serde(flatten)]
    pub settings: RoasterSettings,
}

impl RoasterPreset {
    pub fn new(name: impl Into<String>, settings: RoasterSettings) -> Self {
        Self {
            name: name.into(),
            settings,
        }
    }
}

/// The three presets available out of the box
pub fn default_presets() -> Vec<RoasterPreset> {
    vec![
        RoasterPreset::new("Preset 1", RoasterSettings::standard()),
        RoasterPreset::new(
            "Preset 2",
            RoasterSettings::new(Decimal::from(80), Decimal::from(85), Decimal::new(30, 1)),
        ),
        RoasterPreset::new(
            "Preset 3",
            RoasterSettings::new(Decimal::from(70), Decimal::from(95), Decimal::new(20, 1)),
        ),
    ]
}

/// Append a preset with standard settings, named after its position
pub fn add_preset(presets: &mut Vec<RoasterPreset>) -> &RoasterPreset {
    let name = format!("Preset {}", presets.len() + 1);
    presets.push(RoasterPreset::new(name, RoasterSettings::standard()));
    &presets[presets.len() - 1]
}
