use serde::{Deserialize, Serialize};

use super::ConsumerClass;

/// Per-scenario network parameters supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectParams {
    /// Rated transformer power (kVA)
    #[serde(default)]
    pub trafo_kva: f64,

    /// Load profile name, selects the voltage-drop ceiling
    #[serde(default)]
    pub profile: String,

    /// Normative diversity table name
    #[serde(default)]
    pub normative_table: String,

    /// Diversity table column; automatic class selection happens before the engine
    #[serde(default, alias = "manualClass")]
    pub consumer_class: ConsumerClass,

    /// Offset half of each node's solar kVA against its diversified demand in the drop pass
    #[serde(default, alias = "includeGdInQt")]
    pub offset_solar_in_drop: bool,

    /// Energy price used to monetize losses (per kWh)
    #[serde(default, alias = "energyPriceBrlKwh", skip_serializing_if = "Option::is_none")]
    pub energy_price_per_kwh: Option<f64>,
}

impl Default for ProjectParams {
    fn default() -> Self {
        Self {
            trafo_kva: 75.0,
            profile: "Massivos".to_string(),
            normative_table: "PRODIST".to_string(),
            consumer_class: ConsumerClass::A,
            offset_solar_in_drop: false,
            energy_price_per_kwh: None,
        }
    }
}

impl ProjectParams {
    /// Caller price override when it is a positive finite number.
    pub fn energy_price_override(&self) -> Option<f64> {
        self.energy_price_per_kwh
            .filter(|price| price.is_finite() && *price > 0.0)
    }
}

/// Planning profile limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadProfile {
    /// Maximum accumulated voltage drop (%)
    #[serde(alias = "cqtMax")]
    pub drop_ceiling_pct: f64,

    /// Maximum transformer loading (%)
    #[serde(default, alias = "loadMax")]
    pub loading_ceiling_pct: f64,
}

/// Monte Carlo seed as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seed {
    Number(i64),
    Text(String),
}

impl From<i64> for Seed {
    fn from(n: i64) -> Self {
        Seed::Number(n)
    }
}

impl From<&str> for Seed {
    fn from(s: &str) -> Self {
        Seed::Text(s.to_string())
    }
}
