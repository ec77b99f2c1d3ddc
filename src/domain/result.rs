use serde::{Deserialize, Serialize};
use std::fmt;

use super::Node;

/// A node together with everything the engine derives for it.
///
/// Derived fields are recomputed from scratch on every pass. Nodes not connected to the
/// root keep all of them at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedNode {
    #[serde(flatten)]
    pub node: Node,

    /// Everything fed through this node, own loads included (kVA)
    pub subtree_total_kva: f64,
    /// Solar generation at and below this node (kVA)
    pub subtree_total_solar_kva: f64,
    /// Diversified residential demand of this node (kVA)
    pub node_distributed_kva: f64,
    /// Public lighting plus point loads of this node (kVA)
    pub node_concentrated_kva: f64,
    pub node_solar_kva: f64,

    /// Current through the incoming segment (A)
    pub calculated_load_amps: f64,
    /// Voltage drop from the transformer to this node (%)
    pub accumulated_voltage_drop_pct: f64,
    /// Joule loss of the incoming segment (W)
    pub joule_loss_watts: f64,
    /// Voltage rise from reverse solar flow (%)
    pub solar_voltage_rise_pct: f64,
    /// Midday net current, negative under reverse flow (A)
    pub net_daytime_current_amps: f64,
    /// Incoming segment current above the cable's ampacity
    pub overloaded: bool,
}

impl ComputedNode {
    /// Wrap an input node with zeroed derived fields.
    pub fn detached(node: Node) -> Self {
        Self {
            node,
            subtree_total_kva: 0.0,
            subtree_total_solar_kva: 0.0,
            node_distributed_kva: 0.0,
            node_concentrated_kva: 0.0,
            node_solar_kva: 0.0,
            calculated_load_amps: 0.0,
            accumulated_voltage_drop_pct: 0.0,
            joule_loss_watts: 0.0,
            solar_voltage_rise_pct: 0.0,
            net_daytime_current_amps: 0.0,
            overloaded: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }

    /// Loads of this node alone
    pub fn local_kva(&self) -> f64 {
        self.node_distributed_kva + self.node_concentrated_kva
    }
}

/// Network-wide loading figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_load_kva: f64,
    pub diversified_load_kva: f64,
    pub point_load_kva: f64,
    pub illumination_load_kva: f64,
    /// Root load over rated transformer power (%), zero without a rating
    pub transformer_occupancy_pct: f64,
    pub max_voltage_drop_pct: f64,
    pub total_customers: u32,
    pub diversity_factor: f64,
}

/// Loss cost and emissions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SustainabilityMetrics {
    pub annual_energy_loss_kwh: f64,
    pub annual_financial_loss: f64,
    pub annual_co2_kg: f64,
    pub potential_savings_10y: f64,
    pub potential_co2_prevented_10y_kg: f64,
    pub trees_equivalent: f64,
}

/// Distributed generation impact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GdImpactMetrics {
    pub total_installed_kva: f64,
    pub max_voltage_rise_pct: f64,
    pub has_reverse_flow: bool,
    pub reverse_flow_amps: f64,
    pub self_consumption_rate_pct: f64,
}

/// Output of one calculate pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineResult {
    pub scenario_id: String,
    /// In input order, orphans included
    pub nodes: Vec<ComputedNode>,
    pub kpis: Kpis,
    pub sustainability: SustainabilityMetrics,
    pub gd_impact: GdImpactMetrics,
    pub warnings: Vec<String>,
}

impl EngineResult {
    pub fn node(&self, id: &str) -> Option<&ComputedNode> {
        self.nodes.iter().find(|n| n.node.id == id)
    }

    pub fn has_overload(&self) -> bool {
        self.nodes.iter().any(|n| n.overloaded)
    }
}

impl fmt::Display for EngineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EngineResult {{ scenario: {}, nodes: {}, load: {:.2}kVA, occupancy: {:.1}%, max drop: {:.2}%, losses: {:.0}kWh/yr, warnings: {} }}",
            self.scenario_id,
            self.nodes.len(),
            self.kpis.total_load_kva,
            self.kpis.transformer_occupancy_pct,
            self.kpis.max_voltage_drop_pct,
            self.sustainability.annual_energy_loss_kwh,
            self.warnings.len()
        )
    }
}

/// One histogram bin of peak voltage drop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    /// Upper edge of the bin (%)
    pub x: f64,
    /// Iterations falling in the bin
    pub y: u32,
}

/// Monte Carlo risk summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloResult {
    /// In [0, 1], higher is more stable
    pub stability_index: f64,
    /// Fraction of failing iterations
    pub failure_risk: f64,
    pub avg_peak_drop_pct: f64,
    pub p95_peak_drop_pct: f64,
    pub distribution: Vec<HistogramBin>,
    /// Iterations actually run after clamping
    pub iterations: usize,
    /// 32-bit seed the run was derived from
    pub seed: u32,
}
