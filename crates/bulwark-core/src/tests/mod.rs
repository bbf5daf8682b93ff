//! Test module for determinism and integration tests.
//!
//! Per-component behavior is tested next to the code it exercises; this
//! module holds the cross-cutting suites:
//! - **Determinism tests**: same seed, same config, same state must give
//!   byte-identical results.
//! - **Integration tests**: full battles through the public API, including
//!   the backward-compatibility equivalence of the all-disabled preset.
//! - **Helper functions**: rosters and selections shared by both suites.

mod helpers;

pub use helpers::*;
