use crate::config::EngineConfig;
use crate::domain::{ConsumerClass, Node};

/// Residential connections across every input node, orphans included.
pub fn total_residential(nodes: &[Node]) -> u32 {
    nodes.iter().map(|n| n.loads.residential_count()).sum()
}

/// Diversity factor (kVA per residential connection) for the whole network.
///
/// Zero when there are no residential connections or no usable table.
pub fn resolve_diversity_factor(
    config: &EngineConfig,
    table_name: &str,
    class: ConsumerClass,
    residential_count: u32,
) -> f64 {
    if residential_count == 0 {
        return 0.0;
    }

    config
        .diversity_table(table_name)
        .and_then(|table| table.row_for(residential_count))
        .map(|row| row.factor(class))
        .unwrap_or(0.0)
}
