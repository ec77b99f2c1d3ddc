//! # Monte Carlo Simulation
//!
//! Repeats the load-flow pass over randomly perturbed copies of a network and summarizes how
//! often it violates its limits.
//!
//! - **rng**: seed derivation and the portable [`Mulberry32`] generator
//! - **perturb**: uniform relative perturbation of node loads
//! - **stats**: mean, interpolated quantiles, histogram and the stability index
//! - **monte_carlo**: the driver, serial or on the rayon pool behind the `parallel` feature
//!
//! ```rust,no_run
//! use lvgrid_engine::domain::{CableCatalog, IlluminationCatalog, Node, ProjectParams, Seed};
//! use lvgrid_engine::power_flow::{LvNetworkEngine, NetworkEngine};
//!
//! let engine = LvNetworkEngine::default();
//! let nodes = vec![Node::new("TRAFO", "")];
//! let result = engine.run_monte_carlo(
//!     &nodes,
//!     &ProjectParams::default(),
//!     &CableCatalog::default_aluminium(),
//!     &IlluminationCatalog::default_fixtures(),
//!     1000,
//!     Some(&Seed::from("feeder-12")),
//! )?;
//! println!("stability {:.2}", result.stability_index);
//! # Ok::<(), lvgrid_engine::power_flow::EngineError>(())
//! ```

pub mod monte_carlo;
pub mod perturb;
pub mod rng;
pub mod stats;

pub use monte_carlo::run_monte_carlo;
pub use perturb::{perturb, perturb_loads, perturb_network};
pub use rng::{derive_seed, fnv1a_32, iteration_seed, Mulberry32};
pub use stats::{histogram, quantile, stability_index};
