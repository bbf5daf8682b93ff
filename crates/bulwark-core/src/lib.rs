//! # Bulwark Core
//!
//! Composable battle mechanics engine for Bulwark.
//!
//! This crate simulates turn-based tactical battles between two teams on a
//! grid, where combat outcomes are shaped by a configurable set of
//! interacting mechanics (facing, morale, zones of control, counters,
//! formations, contagious status effects, ...). The heart of the crate is
//! the composition engine:
//!
//! - **Catalog** ([`catalog`]): the fixed set of fourteen mechanics, their
//!   prerequisite DAG, and the pipeline execution order.
//! - **Configuration** ([`config`]): dependency resolution closes a sparse
//!   selection over the catalog; normalization turns it into a config
//!   where every mechanic is off or fully populated.
//! - **Pipeline** ([`pipeline`]): for each of six battle phases, a pure
//!   fold over the enabled processors in catalog order.
//! - **Seeded randomness** ([`rng`]): every probabilistic draw is a pure
//!   function of an explicit seed, so battles replay bit-for-bit.
//! - **Processors** ([`processors`]): one module per mechanic, each owning
//!   its domain algorithm and unit extension record.
//! - **Battle loop** ([`battle`]): a driver that wires it all together and
//!   runs rounds to a winner or a cutoff draw.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bulwark_core::{Battle, Preset, Team, Unit};
//! use gridiron::{Cell, GridMap};
//!
//! let units = vec![
//!     Unit::melee(1, Team::Red, Cell::new(1, 5)),
//!     Unit::melee(2, Team::Blue, Cell::new(8, 5)),
//! ];
//! let mut battle = Battle::new(&Preset::Full.selection(), units, GridMap::new(10, 10), 42)?;
//! let report = battle.run(100);
//! println!("winner: {:?} after {} rounds", report.winner, report.rounds);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export gridiron for grid queries
pub use gridiron;

pub mod battle;
pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod phase;
pub mod pipeline;
pub mod processors;
pub mod rng;
pub mod state;
pub mod unit;

// Re-exports for convenience
pub use battle::{Battle, BattleReport};
pub use catalog::MechanicId;
pub use config::{
    normalize, resolve_dependencies, BattleConfig, MechanicOverride, MechanicSetting, Preset,
    Selection,
};
pub use error::ConfigError;
pub use event::BattleEvent;
pub use phase::{Phase, PhaseContext};
pub use pipeline::{Pipeline, Processor};
pub use state::{ActiveAttack, BattleState, MovePlan};
pub use unit::{Faction, Role, Team, Unit, UnitId};

#[cfg(test)]
mod tests;
