use tracing::debug;

use super::{CalcResult, EngineError, NetworkTree, NodeLoads};
use crate::config::PhysicsConfig;
use crate::domain::{CableCatalog, Node};

/// Electrical state of a node and its incoming segment
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SegmentState {
    pub amps: f64,
    pub drop_pct: f64,
    pub rise_pct: f64,
    pub joule_loss_w: f64,
    pub net_daytime_amps: f64,
    pub overloaded: bool,
}

/// Network-wide figures collected during the top-down pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhysicsSummary {
    pub total_joule_loss_w: f64,
    pub max_voltage_rise_pct: f64,
    pub max_reverse_amps: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PhysicsOutcome {
    pub segments: Vec<SegmentState>,
    pub summary: PhysicsSummary,
    pub warnings: Vec<String>,
}

/// Moment seen by a segment (kVA).
///
/// Downstream and concentrated loads sit at the far end of the span (weight 1.0); the node's
/// distributed load is spread along it (weight 0.5). With `offset_solar` half the node's solar
/// is netted against the distributed part first.
pub fn segment_moment_kva(loads: &NodeLoads, offset_solar: bool) -> f64 {
    let distributed = if offset_solar {
        (loads.distributed_kva - loads.solar_kva * 0.5).max(0.0)
    } else {
        loads.distributed_kva
    };
    loads.downstream_kva() + loads.concentrated_kva + distributed * 0.5
}

/// Top-down pass from the root: voltage drop, solar rise, Joule losses and ampacity checks.
pub fn propagate(
    tree: &NetworkTree,
    nodes: &[Node],
    loads: &[NodeLoads],
    cables: &CableCatalog,
    physics: &PhysicsConfig,
    offset_solar: bool,
) -> CalcResult<PhysicsOutcome> {
    let mut segments = vec![SegmentState::default(); nodes.len()];
    let mut summary = PhysicsSummary::default();
    let mut warnings = Vec::new();

    for &i in tree.preorder() {
        let node = &nodes[i];
        let load = &loads[i];
        let amps = physics.amps_for_kva(load.subtree_kva);

        let Some(p) = tree.parent(i) else {
            // Root: reference point for drop and rise
            segments[i] = SegmentState { amps, ..Default::default() };
            continue;
        };
        let upstream = segments[p];

        let (cable, fallback) = cables
            .resolve(&node.cable_id)
            .ok_or_else(|| EngineError::EmptyCableCatalog { node_id: node.id.clone() })?;
        if fallback {
            let msg = format!(
                "Unknown cable '{}' on node {}: computed with the first catalog cable",
                node.cable_id, node.id
            );
            debug!(node = %node.id, cable = %node.cable_id, "unknown cable, using catalog fallback");
            warnings.push(msg);
        }

        let span_hm = node.length_meters / 100.0;
        let span_km = node.length_meters / 1000.0;

        let drop_pct = upstream.drop_pct + segment_moment_kva(load, offset_solar) * span_hm * cable.coef;

        // Worst case for rise: the whole reverse flow at the far end
        let net_daytime_kva = load.subtree_kva * physics.day_load_factor - load.subtree_solar_kva;
        let reverse_kva = (-net_daytime_kva).max(0.0);
        let rise_pct = upstream.rise_pct + reverse_kva * span_hm * cable.coef;
        let net_daytime_amps = physics.amps_for_kva(net_daytime_kva);

        if net_daytime_amps < -physics.reverse_current_threshold_a {
            summary.max_reverse_amps = summary.max_reverse_amps.max(-net_daytime_amps);
        }
        summary.max_voltage_rise_pct = summary.max_voltage_rise_pct.max(rise_pct);

        let joule_loss_w = 3.0 * cable.r * span_km * amps.max(0.0).powi(2);
        summary.total_joule_loss_w += joule_loss_w;

        let overloaded = cable.ampacity > 0.0 && amps > cable.ampacity;
        if overloaded {
            debug!(node = %node.id, amps, ampacity = cable.ampacity, "segment overload");
            warnings.push(format!(
                "Overload on {}: {:.2}A > {}A",
                node.id, amps, cable.ampacity
            ));
        }

        segments[i] = SegmentState {
            amps,
            drop_pct,
            rise_pct,
            joule_loss_w,
            net_daytime_amps,
            overloaded,
        };
    }

    Ok(PhysicsOutcome {
        segments,
        summary,
        warnings,
    })
}
