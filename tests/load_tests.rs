//! Load Test Runner
//!
//! Makes the load tests discoverable by cargo test.
//!
//! To run load tests:
//! ```bash
//! cargo test --release --test load_tests -- --ignored --test-threads=1
//! ```
//!
//! Load tests are marked as #[ignore] by default to keep regular runs fast.

mod load;
