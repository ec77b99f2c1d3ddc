pub mod cable;

pub use cable::{optimize_cables, OptimizationOutcome, SegmentLimits, Violation};
