//! Radial LV load flow
//!
//! One calculate pass runs, in order:
//! 1. `tree` - arena tree from the flat node list (root, orphans, cycles)
//! 2. `diversity` - one diversity factor for the whole network
//! 3. `accumulate` - bottom-up subtree demand and solar totals
//! 4. `physics` - top-down voltage drop, solar rise, Joule losses, ampacity checks
//! 5. `kpi` - network summary, sustainability and distributed-generation figures

pub mod accumulate;
pub mod diversity;
pub mod engine;
pub mod error;
pub mod kpi;
pub mod physics;
pub mod tree;

pub use accumulate::{accumulate_loads, local_loads, NodeLoads};
pub use diversity::{resolve_diversity_factor, total_residential};
pub use engine::{LvNetworkEngine, NetworkEngine};
pub use error::{CalcResult, EngineError};
pub use kpi::{aggregate_kpis, gd_impact, sustainability_metrics};
pub use physics::{propagate, segment_moment_kva, PhysicsOutcome, PhysicsSummary, SegmentState};
pub use tree::NetworkTree;
