//! Radial low-voltage distribution network engine.
//!
//! One calculate pass builds the feeder tree, resolves the diversity factor, accumulates loads
//! bottom-up and propagates voltage drop, solar rise and Joule losses top-down. The cable
//! optimizer and the Monte Carlo simulator reuse that pass many times.

pub mod config;
pub mod domain;
pub mod optimizer;
pub mod power_flow;
pub mod simulation;
pub mod telemetry;

pub use config::EngineConfig;
pub use power_flow::{CalcResult, EngineError, LvNetworkEngine, NetworkEngine};
