use rand::RngCore;

use super::rng::unit;
use crate::config::MonteCarloConfig;
use crate::domain::{LoadData, Node};

/// Scale `base` by a uniform factor in `[1 - spread, 1 + spread)`, never below zero.
pub fn perturb<R: RngCore + ?Sized>(rng: &mut R, base: f64, spread: f64) -> f64 {
    let factor = 1.0 + (unit(rng) * 2.0 - 1.0) * spread;
    (base * factor).max(0.0)
}

fn perturb_count<R: RngCore + ?Sized>(rng: &mut R, base: u32, spread: f64) -> u32 {
    perturb(rng, f64::from(base), spread).round() as u32
}

/// Randomized copy of one node's loads.
///
/// Draws happen in a fixed order (residential counts, lighting, point loads, solar) so a
/// stream replays identically for the same seed.
pub fn perturb_loads<R: RngCore + ?Sized>(rng: &mut R, loads: &LoadData, cfg: &MonteCarloConfig) -> LoadData {
    LoadData {
        single_phase: perturb_count(rng, loads.single_phase, cfg.residential_spread),
        two_phase: perturb_count(rng, loads.two_phase, cfg.residential_spread),
        three_phase: perturb_count(rng, loads.three_phase, cfg.residential_spread),
        ip_qty: perturb_count(rng, loads.ip_qty, cfg.count_spread),
        point_qty: perturb_count(rng, loads.point_qty, cfg.count_spread),
        point_kva: perturb(rng, loads.point_kva, cfg.point_kva_spread),
        solar_qty: perturb_count(rng, loads.solar_qty, cfg.solar_spread),
        solar_kva: perturb(rng, loads.solar_kva, cfg.solar_spread),
        ip_type: loads.ip_type.clone(),
    }
}

/// One perturbed scenario; topology, spans and cables are untouched.
pub fn perturb_network<R: RngCore + ?Sized>(rng: &mut R, nodes: &[Node], cfg: &MonteCarloConfig) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| Node {
            loads: perturb_loads(rng, &node.loads, cfg),
            ..node.clone()
        })
        .collect()
}
