//! Mechanic settings: the tagged "off / on / on-with-overrides" union and
//! the per-mechanic config and patch records.
//!
//! Each tunable mechanic has two records here: a *config* (every field
//! populated; `Default` is the catalog default) and a *patch* (every field
//! optional). Merging is shallow and field-wise: a patch field that is
//! `Some` wins, everything else keeps the default. Toggle-only mechanics
//! (facing, intercept, overwatch, lineOfSight) have neither: they are
//! either off or on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::MechanicId;
use crate::unit::Effect;

/// A caller's wish for one mechanic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MechanicSetting {
    /// The mechanic is off.
    Disabled,
    /// The mechanic is on with its catalog defaults.
    Enabled,
    /// The mechanic is on with some fields overridden.
    Overrides(MechanicOverride),
}

impl MechanicSetting {
    /// True unless the setting is `Disabled`.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

/// A sparse mechanic selection: mechanics not named here are disabled.
pub type Selection = BTreeMap<MechanicId, MechanicSetting>;

/// A sparse override payload for one tunable mechanic.
///
/// Toggle-only mechanics have no variant: there is nothing to override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MechanicOverride {
    /// Armor shred overrides.
    ArmorShred(ArmorShredPatch),
    /// Resolve overrides.
    Resolve(ResolvePatch),
    /// Engagement overrides.
    Engagement(EngagementPatch),
    /// Flanking overrides.
    Flanking(FlankingPatch),
    /// Riposte overrides.
    Riposte(RipostePatch),
    /// Aura overrides.
    Aura(AuraPatch),
    /// Charge overrides.
    Charge(ChargePatch),
    /// Phalanx overrides.
    Phalanx(PhalanxPatch),
    /// Ammunition overrides.
    Ammunition(AmmunitionPatch),
    /// Contagion overrides.
    Contagion(ContagionPatch),
}

impl MechanicOverride {
    /// The mechanic this payload belongs to.
    #[must_use]
    pub const fn mechanic(&self) -> MechanicId {
        match self {
            Self::ArmorShred(_) => MechanicId::ArmorShred,
            Self::Resolve(_) => MechanicId::Resolve,
            Self::Engagement(_) => MechanicId::Engagement,
            Self::Flanking(_) => MechanicId::Flanking,
            Self::Riposte(_) => MechanicId::Riposte,
            Self::Aura(_) => MechanicId::Aura,
            Self::Charge(_) => MechanicId::Charge,
            Self::Phalanx(_) => MechanicId::Phalanx,
            Self::Ammunition(_) => MechanicId::Ammunition,
            Self::Contagion(_) => MechanicId::Contagion,
        }
    }
}

// =============================================================================
// Armor shred
// =============================================================================

/// Armor shred tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmorShredConfig {
    /// Armor points shredded per landed strike.
    pub shred_per_hit: i32,
    /// Cap on total shred, as a fraction of the defender's base armor.
    pub max_shred_percent: f64,
}

impl Default for ArmorShredConfig {
    fn default() -> Self {
        Self {
            shred_per_hit: 1,
            max_shred_percent: 0.4,
        }
    }
}

/// Sparse overrides for [`ArmorShredConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ArmorShredPatch {
    /// Overrides `shred_per_hit`.
    pub shred_per_hit: Option<i32>,
    /// Overrides `max_shred_percent`.
    pub max_shred_percent: Option<f64>,
}

impl ArmorShredConfig {
    /// This config with the patch's explicit fields layered on top.
    #[must_use]
    pub fn merged(self, patch: &ArmorShredPatch) -> Self {
        Self {
            shred_per_hit: patch.shred_per_hit.unwrap_or(self.shred_per_hit),
            max_shred_percent: patch.max_shred_percent.unwrap_or(self.max_shred_percent),
        }
    }

    /// A patch that reproduces this config field-for-field.
    #[must_use]
    pub const fn to_patch(self) -> ArmorShredPatch {
        ArmorShredPatch {
            shred_per_hit: Some(self.shred_per_hit),
            max_shred_percent: Some(self.max_shred_percent),
        }
    }
}

// =============================================================================
// Resolve
// =============================================================================

/// Resolve (morale) tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Resolve ceiling for every unit.
    pub max_resolve: u32,
    /// Resolve regained at each turn start.
    pub base_regeneration: u32,
    /// Resolve lost when struck through the flank arc.
    pub flank_damage: u32,
    /// Resolve lost when struck through the rear arc.
    pub rear_damage: u32,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            max_resolve: 20,
            base_regeneration: 2,
            flank_damage: 6,
            rear_damage: 10,
        }
    }
}

/// Sparse overrides for [`ResolveConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvePatch {
    /// Overrides `max_resolve`.
    pub max_resolve: Option<u32>,
    /// Overrides `base_regeneration`.
    pub base_regeneration: Option<u32>,
    /// Overrides `flank_damage`.
    pub flank_damage: Option<u32>,
    /// Overrides `rear_damage`.
    pub rear_damage: Option<u32>,
}

impl ResolveConfig {
    /// This config with the patch's explicit fields layered on top.
    #[must_use]
    pub fn merged(self, patch: &ResolvePatch) -> Self {
        Self {
            max_resolve: patch.max_resolve.unwrap_or(self.max_resolve),
            base_regeneration: patch.base_regeneration.unwrap_or(self.base_regeneration),
            flank_damage: patch.flank_damage.unwrap_or(self.flank_damage),
            rear_damage: patch.rear_damage.unwrap_or(self.rear_damage),
        }
    }

    /// A patch that reproduces this config field-for-field.
    #[must_use]
    pub const fn to_patch(self) -> ResolvePatch {
        ResolvePatch {
            max_resolve: Some(self.max_resolve),
            base_regeneration: Some(self.base_regeneration),
            flank_damage: Some(self.flank_damage),
            rear_damage: Some(self.rear_damage),
        }
    }
}

// =============================================================================
// Engagement
// =============================================================================

/// Engagement / zone-of-control tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// Damage fraction *lost* by ranged units while engaged.
    pub archer_penalty: f64,
    /// Movement allowance spent to leave a zone of control cleanly.
    pub disengage_cost: u32,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            archer_penalty: 0.5,
            disengage_cost: 2,
        }
    }
}

/// Sparse overrides for [`EngagementConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngagementPatch {
    /// Overrides `archer_penalty`.
    pub archer_penalty: Option<f64>,
    /// Overrides `disengage_cost`.
    pub disengage_cost: Option<u32>,
}

impl EngagementConfig {
    /// This config with the patch's explicit fields layered on top.
    #[must_use]
    pub fn merged(self, patch: &EngagementPatch) -> Self {
        Self {
            archer_penalty: patch.archer_penalty.unwrap_or(self.archer_penalty),
            disengage_cost: patch.disengage_cost.unwrap_or(self.disengage_cost),
        }
    }

    /// A patch that reproduces this config field-for-field.
    #[must_use]
    pub const fn to_patch(self) -> EngagementPatch {
        EngagementPatch {
            archer_penalty: Some(self.archer_penalty),
            disengage_cost: Some(self.disengage_cost),
        }
    }
}

// =============================================================================
// Flanking
// =============================================================================

/// Flanking multiplier tuning. Front-arc strikes always multiply by 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlankingConfig {
    /// Damage multiplier for flank-arc strikes.
    pub flank_multiplier: f64,
    /// Damage multiplier for rear-arc strikes.
    pub rear_multiplier: f64,
}

impl Default for FlankingConfig {
    fn default() -> Self {
        Self {
            flank_multiplier: 1.25,
            rear_multiplier: 1.5,
        }
    }
}

/// Sparse overrides for [`FlankingConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FlankingPatch {
    /// Overrides `flank_multiplier`.
    pub flank_multiplier: Option<f64>,
    /// Overrides `rear_multiplier`.
    pub rear_multiplier: Option<f64>,
}

impl FlankingConfig {
    /// This config with the patch's explicit fields layered on top.
    #[must_use]
    pub fn merged(self, patch: &FlankingPatch) -> Self {
        Self {
            flank_multiplier: patch.flank_multiplier.unwrap_or(self.flank_multiplier),
            rear_multiplier: patch.rear_multiplier.unwrap_or(self.rear_multiplier),
        }
    }

    /// A patch that reproduces this config field-for-field.
    #[must_use]
    pub const fn to_patch(self) -> FlankingPatch {
        FlankingPatch {
            flank_multiplier: Some(self.flank_multiplier),
            rear_multiplier: Some(self.rear_multiplier),
        }
    }
}

// =============================================================================
// Riposte
// =============================================================================

/// How a unit's riposte charge pool is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargePool {
    /// Every unit gets the same fixed number of charges per round.
    Fixed(u32),
    /// Each unit gets as many charges as it has attacks per turn.
    AttackCount,
}

/// Riposte tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiposteConfig {
    /// Baseline counter chance before the initiative adjustment.
    pub base_chance: f64,
    /// Initiative gap at which the counter becomes certain (or, mirrored,
    /// impossible).
    pub guaranteed_threshold: i32,
    /// How the per-round charge pool is sized.
    pub charge_pool: ChargePool,
}

impl Default for RiposteConfig {
    fn default() -> Self {
        Self {
            base_chance: 0.25,
            guaranteed_threshold: 10,
            charge_pool: ChargePool::Fixed(1),
        }
    }
}

/// Sparse overrides for [`RiposteConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RipostePatch {
    /// Overrides `base_chance`.
    pub base_chance: Option<f64>,
    /// Overrides `guaranteed_threshold`.
    pub guaranteed_threshold: Option<i32>,
    /// Overrides `charge_pool`.
    pub charge_pool: Option<ChargePool>,
}

impl RiposteConfig {
    /// This config with the patch's explicit fields layered on top.
    #[must_use]
    pub fn merged(self, patch: &RipostePatch) -> Self {
        Self {
            base_chance: patch.base_chance.unwrap_or(self.base_chance),
            guaranteed_threshold: patch
                .guaranteed_threshold
                .unwrap_or(self.guaranteed_threshold),
            charge_pool: patch.charge_pool.unwrap_or(self.charge_pool),
        }
    }

    /// A patch that reproduces this config field-for-field.
    #[must_use]
    pub const fn to_patch(self) -> RipostePatch {
        RipostePatch {
            base_chance: Some(self.base_chance),
            guaranteed_threshold: Some(self.guaranteed_threshold),
            charge_pool: Some(self.charge_pool),
        }
    }
}

// =============================================================================
// Aura
// =============================================================================

/// Aura projection tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuraConfig {
    /// Projection radius in Manhattan cells (the bearer itself included).
    pub radius: u32,
}

impl Default for AuraConfig {
    fn default() -> Self {
        Self { radius: 2 }
    }
}

/// Sparse overrides for [`AuraConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuraPatch {
    /// Overrides `radius`.
    pub radius: Option<u32>,
}

impl AuraConfig {
    /// This config with the patch's explicit fields layered on top.
    #[must_use]
    pub fn merged(self, patch: &AuraPatch) -> Self {
        Self {
            radius: patch.radius.unwrap_or(self.radius),
        }
    }

    /// A patch that reproduces this config field-for-field.
    #[must_use]
    pub const fn to_patch(self) -> AuraPatch {
        AuraPatch {
            radius: Some(self.radius),
        }
    }
}

// =============================================================================
// Charge
// =============================================================================

/// Charge momentum tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeConfig {
    /// Momentum gained per cell actually walked.
    pub momentum_per_cell: f64,
    /// Ceiling on the damage bonus momentum can convert into.
    pub max_momentum_bonus: f64,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        Self {
            momentum_per_cell: 0.15,
            max_momentum_bonus: 0.6,
        }
    }
}

/// Sparse overrides for [`ChargeConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChargePatch {
    /// Overrides `momentum_per_cell`.
    pub momentum_per_cell: Option<f64>,
    /// Overrides `max_momentum_bonus`.
    pub max_momentum_bonus: Option<f64>,
}

impl ChargeConfig {
    /// This config with the patch's explicit fields layered on top.
    #[must_use]
    pub fn merged(self, patch: &ChargePatch) -> Self {
        Self {
            momentum_per_cell: patch.momentum_per_cell.unwrap_or(self.momentum_per_cell),
            max_momentum_bonus: patch.max_momentum_bonus.unwrap_or(self.max_momentum_bonus),
        }
    }

    /// A patch that reproduces this config field-for-field.
    #[must_use]
    pub const fn to_patch(self) -> ChargePatch {
        ChargePatch {
            momentum_per_cell: Some(self.momentum_per_cell),
            max_momentum_bonus: Some(self.max_momentum_bonus),
        }
    }
}

// =============================================================================
// Phalanx
// =============================================================================

/// Phalanx formation tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhalanxConfig {
    /// Incoming damage fraction absorbed while the formation holds.
    pub defense_bonus: f64,
    /// Minimum aligned, adjacent same-kind allies needed to form up.
    pub min_adjacent: u32,
}

impl Default for PhalanxConfig {
    fn default() -> Self {
        Self {
            defense_bonus: 0.25,
            min_adjacent: 1,
        }
    }
}

/// Sparse overrides for [`PhalanxConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhalanxPatch {
    /// Overrides `defense_bonus`.
    pub defense_bonus: Option<f64>,
    /// Overrides `min_adjacent`.
    pub min_adjacent: Option<u32>,
}

impl PhalanxConfig {
    /// This config with the patch's explicit fields layered on top.
    #[must_use]
    pub fn merged(self, patch: &PhalanxPatch) -> Self {
        Self {
            defense_bonus: patch.defense_bonus.unwrap_or(self.defense_bonus),
            min_adjacent: patch.min_adjacent.unwrap_or(self.min_adjacent),
        }
    }

    /// A patch that reproduces this config field-for-field.
    #[must_use]
    pub const fn to_patch(self) -> PhalanxPatch {
        PhalanxPatch {
            defense_bonus: Some(self.defense_bonus),
            min_adjacent: Some(self.min_adjacent),
        }
    }
}

// =============================================================================
// Ammunition
// =============================================================================

/// Ammunition tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmunitionConfig {
    /// Rounds a ranged unit starts the battle with.
    pub capacity: u32,
}

impl Default for AmmunitionConfig {
    fn default() -> Self {
        Self { capacity: 12 }
    }
}

/// Sparse overrides for [`AmmunitionConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AmmunitionPatch {
    /// Overrides `capacity`.
    pub capacity: Option<u32>,
}

impl AmmunitionConfig {
    /// This config with the patch's explicit fields layered on top.
    #[must_use]
    pub fn merged(self, patch: &AmmunitionPatch) -> Self {
        Self {
            capacity: patch.capacity.unwrap_or(self.capacity),
        }
    }

    /// A patch that reproduces this config field-for-field.
    #[must_use]
    pub const fn to_patch(self) -> AmmunitionPatch {
        AmmunitionPatch {
            capacity: Some(self.capacity),
        }
    }
}

// =============================================================================
// Contagion
// =============================================================================

/// Contagion tuning: one independent spread chance per effect type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContagionConfig {
    /// Base chance fire jumps to an adjacent unit.
    pub fire_spread: f64,
    /// Base chance poison jumps to an adjacent unit.
    pub poison_spread: f64,
    /// Base chance a curse jumps to an adjacent unit.
    pub curse_spread: f64,
    /// Base chance frost jumps to an adjacent unit.
    pub frost_spread: f64,
    /// Base chance plague jumps to an adjacent unit.
    pub plague_spread: f64,
    /// Added to the chance when the target stands in an active phalanx.
    pub phalanx_bonus: f64,
}

impl Default for ContagionConfig {
    fn default() -> Self {
        Self {
            fire_spread: 0.30,
            poison_spread: 0.25,
            curse_spread: 0.15,
            frost_spread: 0.20,
            plague_spread: 0.35,
            phalanx_bonus: 0.15,
        }
    }
}

impl ContagionConfig {
    /// The base spread chance for one effect.
    #[must_use]
    pub const fn spread_chance(&self, effect: Effect) -> f64 {
        match effect {
            Effect::Fire => self.fire_spread,
            Effect::Poison => self.poison_spread,
            Effect::Curse => self.curse_spread,
            Effect::Frost => self.frost_spread,
            Effect::Plague => self.plague_spread,
        }
    }
}

/// Sparse overrides for [`ContagionConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContagionPatch {
    /// Overrides `fire_spread`.
    pub fire_spread: Option<f64>,
    /// Overrides `poison_spread`.
    pub poison_spread: Option<f64>,
    /// Overrides `curse_spread`.
    pub curse_spread: Option<f64>,
    /// Overrides `frost_spread`.
    pub frost_spread: Option<f64>,
    /// Overrides `plague_spread`.
    pub plague_spread: Option<f64>,
    /// Overrides `phalanx_bonus`.
    pub phalanx_bonus: Option<f64>,
}

impl ContagionConfig {
    /// This config with the patch's explicit fields layered on top.
    #[must_use]
    pub fn merged(self, patch: &ContagionPatch) -> Self {
        Self {
            fire_spread: patch.fire_spread.unwrap_or(self.fire_spread),
            poison_spread: patch.poison_spread.unwrap_or(self.poison_spread),
            curse_spread: patch.curse_spread.unwrap_or(self.curse_spread),
            frost_spread: patch.frost_spread.unwrap_or(self.frost_spread),
            plague_spread: patch.plague_spread.unwrap_or(self.plague_spread),
            phalanx_bonus: patch.phalanx_bonus.unwrap_or(self.phalanx_bonus),
        }
    }

    /// A patch that reproduces this config field-for-field.
    #[must_use]
    pub const fn to_patch(self) -> ContagionPatch {
        ContagionPatch {
            fire_spread: Some(self.fire_spread),
            poison_spread: Some(self.poison_spread),
            curse_spread: Some(self.curse_spread),
            frost_spread: Some(self.frost_spread),
            plague_spread: Some(self.plague_spread),
            phalanx_bonus: Some(self.phalanx_bonus),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_payloads_know_their_mechanic() {
        let ov = MechanicOverride::Riposte(RipostePatch::default());
        assert_eq!(ov.mechanic(), MechanicId::Riposte);

        let ov = MechanicOverride::Contagion(ContagionPatch::default());
        assert_eq!(ov.mechanic(), MechanicId::Contagion);
    }

    #[test]
    fn empty_patch_merge_is_identity() {
        let cfg = RiposteConfig::default();
        assert_eq!(cfg.merged(&RipostePatch::default()), cfg);

        let cfg = ContagionConfig::default();
        assert_eq!(cfg.merged(&ContagionPatch::default()), cfg);
    }

    #[test]
    fn patch_fields_win_individually() {
        let cfg = ResolveConfig::default().merged(&ResolvePatch {
            rear_damage: Some(20),
            ..ResolvePatch::default()
        });

        assert_eq!(cfg.rear_damage, 20);
        // Untouched fields keep their defaults.
        assert_eq!(cfg.max_resolve, ResolveConfig::default().max_resolve);
        assert_eq!(cfg.flank_damage, ResolveConfig::default().flank_damage);
    }

    #[test]
    fn full_patch_round_trips() {
        let cfg = FlankingConfig {
            flank_multiplier: 1.4,
            rear_multiplier: 2.0,
        };
        assert_eq!(FlankingConfig::default().merged(&cfg.to_patch()), cfg);
    }

    #[test]
    fn spread_chance_covers_every_effect() {
        let cfg = ContagionConfig::default();
        for e in Effect::ALL {
            assert!(cfg.spread_chance(e) > 0.0);
        }
    }

    #[test]
    fn settings_serialization_roundtrip() {
        let setting = MechanicSetting::Overrides(MechanicOverride::ArmorShred(ArmorShredPatch {
            max_shred_percent: Some(0.5),
            ..ArmorShredPatch::default()
        }));

        let json = serde_json::to_string(&setting).unwrap();
        let back: MechanicSetting = serde_json::from_str(&json).unwrap();
        assert_eq!(setting, back);
    }
}
