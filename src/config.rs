use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::{DiversityTable, LoadProfile};

/// Engine constants, normative tables and planning profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Id of the transformer node every tree hangs from
    pub root_id: String,
    pub physics: PhysicsConfig,
    pub sustainability: SustainabilityConfig,
    pub optimizer: OptimizerConfig,
    pub monte_carlo: MonteCarloConfig,
    pub profiles: BTreeMap<String, LoadProfile>,
    pub default_profile: String,
    pub diversity_tables: BTreeMap<String, DiversityTable>,
    pub default_table: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Line-to-line voltage (kV)
    pub nominal_voltage_kv: f64,
    /// Share of peak demand present at midday
    pub day_load_factor: f64,
    /// Reverse currents above this count toward the network maximum (A)
    pub reverse_current_threshold_a: f64,
    /// Reverse flow is flagged above this current (A)
    pub reverse_flow_alarm_a: f64,
    /// Maximum admissible solar voltage rise (%)
    pub rise_ceiling_pct: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            nominal_voltage_kv: 0.380,
            day_load_factor: 0.30,
            reverse_current_threshold_a: 0.1,
            reverse_flow_alarm_a: 0.5,
            rise_ceiling_pct: 5.0,
        }
    }
}

impl PhysicsConfig {
    /// Three-phase current (A) for an apparent power (kVA)
    pub fn amps_for_kva(&self, kva: f64) -> f64 {
        kva / (3.0_f64.sqrt() * self.nominal_voltage_kv)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SustainabilityConfig {
    pub energy_price_per_kwh: f64,
    pub co2_kg_per_kwh: f64,
    /// Ratio of average to peak losses
    pub load_loss_factor: f64,
    pub annual_hours: f64,
    /// CO2 absorbed by one tree per year (kg)
    pub tree_co2_kg_per_year: f64,
    /// Share of losses recoverable by reconductoring
    pub mitigation_fraction: f64,
    pub projection_years: f64,
    /// Coarse self-consumption estimate when any solar is installed (%)
    pub self_consumption_rate_pct: f64,
}

impl Default for SustainabilityConfig {
    fn default() -> Self {
        Self {
            energy_price_per_kwh: 0.85,
            co2_kg_per_kwh: 0.126,
            load_loss_factor: 0.25,
            annual_hours: 8760.0,
            tree_co2_kg_per_year: 20.0,
            mitigation_fraction: 0.40,
            projection_years: 10.0,
            self_consumption_rate_pct: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub max_iterations: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self { max_iterations: 15 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub min_iterations: usize,
    pub max_iterations: usize,
    pub default_iterations: usize,
    pub histogram_bins: usize,
    /// Drop ceiling used when the profile is unknown (%)
    pub fallback_drop_ceiling_pct: f64,
    /// Uniform relative spread applied to residential counts
    pub residential_spread: f64,
    /// Spread for lighting and point-customer counts
    pub count_spread: f64,
    pub point_kva_spread: f64,
    pub solar_spread: f64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            min_iterations: 10,
            max_iterations: 20_000,
            default_iterations: 1000,
            histogram_bins: 20,
            fallback_drop_ceiling_pct: 6.0,
            residential_spread: 0.15,
            count_spread: 0.20,
            point_kva_spread: 0.25,
            solar_spread: 0.30,
        }
    }
}

impl MonteCarloConfig {
    pub fn clamp_iterations(&self, requested: usize) -> usize {
        requested.clamp(self.min_iterations, self.max_iterations)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let profiles = BTreeMap::from([
            (
                "Urbano Padrão".to_string(),
                LoadProfile { drop_ceiling_pct: 5.0, loading_ceiling_pct: 100.0 },
            ),
            (
                "Rural".to_string(),
                LoadProfile { drop_ceiling_pct: 10.0, loading_ceiling_pct: 100.0 },
            ),
            (
                "Massivos".to_string(),
                LoadProfile { drop_ceiling_pct: 6.0, loading_ceiling_pct: 120.0 },
            ),
        ]);
        let diversity_tables = BTreeMap::from([
            ("PRODIST".to_string(), DiversityTable::prodist()),
            ("ABNT".to_string(), DiversityTable::abnt()),
        ]);

        Self {
            root_id: "TRAFO".to_string(),
            physics: PhysicsConfig::default(),
            sustainability: SustainabilityConfig::default(),
            optimizer: OptimizerConfig::default(),
            monte_carlo: MonteCarloConfig::default(),
            profiles,
            default_profile: "Massivos".to_string(),
            diversity_tables,
            default_table: "PRODIST".to_string(),
        }
    }
}

impl EngineConfig {
    /// Built-in defaults, overridden by `config/default.toml` and `LVGRID__*` variables.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config/default.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("LVGRID__").split("__"));
        Ok(figment.extract()?)
    }

    /// Profile by name, falling back to the default profile.
    pub fn profile(&self, name: &str) -> Option<&LoadProfile> {
        self.profiles
            .get(name)
            .or_else(|| self.profiles.get(&self.default_profile))
    }

    /// Voltage-drop ceiling for a profile name (%)
    pub fn drop_ceiling_pct(&self, profile: &str) -> f64 {
        self.profile(profile)
            .map(|p| p.drop_ceiling_pct)
            .unwrap_or(self.monte_carlo.fallback_drop_ceiling_pct)
    }

    /// Diversity table by name, falling back to the default table.
    pub fn diversity_table(&self, name: &str) -> Option<&DiversityTable> {
        self.diversity_tables
            .get(name)
            .or_else(|| self.diversity_tables.get(&self.default_table))
    }
}
