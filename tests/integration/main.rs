//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises the full controller
//! against simulated adapters. All tests run on the host with no real
//! hardware required.

mod controller_tests;
mod lever_stress_tests;
mod sim_rig;
