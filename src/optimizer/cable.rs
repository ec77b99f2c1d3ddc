use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info};

use crate::domain::{CableCatalog, ComputedNode, IlluminationCatalog, Node, ProjectParams};
use crate::power_flow::{CalcResult, LvNetworkEngine};

/// Why a segment needs a larger cable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Violation {
    Ampacity,
    VoltageDrop,
    VoltageRise,
}

/// Ceilings a segment must respect after optimization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentLimits {
    pub drop_ceiling_pct: f64,
    pub rise_ceiling_pct: f64,
}

impl SegmentLimits {
    /// First violated limit, checked in ampacity, drop, rise order.
    ///
    /// A cable missing from the catalog counts as zero ampacity.
    pub fn violation(&self, computed: &ComputedNode, cables: &CableCatalog) -> Option<Violation> {
        let ampacity = cables
            .get(&computed.node.cable_id)
            .map(|c| c.ampacity)
            .unwrap_or(0.0);

        if computed.calculated_load_amps > ampacity {
            Some(Violation::Ampacity)
        } else if computed.accumulated_voltage_drop_pct > self.drop_ceiling_pct {
            Some(Violation::VoltageDrop)
        } else if computed.solar_voltage_rise_pct > self.rise_ceiling_pct {
            Some(Violation::VoltageRise)
        } else {
            None
        }
    }
}

/// Final state of an optimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationOutcome {
    pub nodes: Vec<Node>,
    /// Calculate passes performed
    pub iterations: usize,
    /// Cable upgrades applied across all passes
    pub upgrades: usize,
    /// The last pass issued no upgrade
    pub converged: bool,
}

/// Next cable up the ampacity ladder; an unknown cable moves to the smallest one.
fn next_cable<'a>(ladder: &[&'a str], current: &str) -> Option<&'a str> {
    match ladder.iter().position(|id| *id == current) {
        Some(pos) => ladder.get(pos + 1).copied(),
        None => ladder.first().copied(),
    }
}

/// Local search over cable sizes.
///
/// Each pass runs a full calculation and moves every violating segment one step up the
/// ampacity ladder. Stops after a pass without upgrades or at the iteration cap, whichever
/// comes first; residual violations are left for the caller to detect.
pub fn optimize_cables(
    engine: &LvNetworkEngine,
    scenario_id: &str,
    nodes: &[Node],
    params: &ProjectParams,
    cables: &CableCatalog,
    illumination: &IlluminationCatalog,
) -> CalcResult<OptimizationOutcome> {
    let config = engine.config();
    let tree = engine.build_tree(nodes)?;
    let ladder = cables.ampacity_ladder();
    let limits = SegmentLimits {
        drop_ceiling_pct: config.drop_ceiling_pct(&params.profile),
        rise_ceiling_pct: config.physics.rise_ceiling_pct,
    };

    let mut current = nodes.to_vec();
    let mut iterations = 0;
    let mut upgrades = 0;
    let mut converged = false;

    while iterations < config.optimizer.max_iterations {
        let result = engine.evaluate(&tree, scenario_id, &current, params, cables, illumination)?;
        iterations += 1;

        let mut changed = 0;
        for (i, (node, computed)) in current.iter_mut().zip(&result.nodes).enumerate() {
            if i == tree.root() {
                continue;
            }
            let Some(violation) = limits.violation(computed, cables) else {
                continue;
            };
            if let Some(next) = next_cable(&ladder, &node.cable_id) {
                debug!(node = %node.id, %violation, from = %node.cable_id, to = next, "cable upgrade");
                node.cable_id = next.to_string();
                changed += 1;
            }
        }

        upgrades += changed;
        if changed == 0 {
            converged = true;
            break;
        }
    }

    info!(scenario = scenario_id, iterations, upgrades, converged, "cable optimization finished");

    Ok(OptimizationOutcome {
        nodes: current,
        iterations,
        upgrades,
        converged,
    })
}
