//! Configuration pipeline: sparse selections in, normalized configs out.
//!
//! Callers describe a battle's rules as a *sparse* selection: a map from
//! mechanic id to "disabled", "enabled with defaults", or "enabled with
//! these overrides". Before any phase executes, that selection passes
//! through two total functions:
//!
//! 1. [`resolve_dependencies`]: closes the selection over the catalog's
//!    prerequisite edges, enabling missing prerequisites with their
//!    defaults.
//! 2. [`normalize`]: turns the closed selection into a [`BattleConfig`]
//!    where every mechanic is either off or a fully populated record, so
//!    downstream code never branches on the setting union again.
//!
//! Both are pure; all failure modes are [`ConfigError`](crate::error::ConfigError)
//! values raised at setup.

mod normalize;
mod presets;
mod resolve;
mod settings;

pub use normalize::{normalize, BattleConfig};
pub use presets::Preset;
pub use resolve::resolve_dependencies;
pub use settings::{
    AmmunitionConfig, AmmunitionPatch, ArmorShredConfig, ArmorShredPatch, AuraConfig, AuraPatch,
    ChargeConfig, ChargePatch, ChargePool, ContagionConfig, ContagionPatch, EngagementConfig,
    EngagementPatch, FlankingConfig, FlankingPatch, MechanicOverride, MechanicSetting,
    PhalanxConfig, PhalanxPatch, ResolveConfig, ResolvePatch, RiposteConfig, RipostePatch,
    Selection,
};
