//! Configuration normalization and validation.
//!
//! [`normalize`] converts a resolved selection, a mix of disabled, enabled,
//! and partial-override settings, into a [`BattleConfig`] in which every
//! mechanic is either off or a fully populated record. Downstream code never
//! sees the setting union again.

use serde::{Deserialize, Serialize};

use crate::catalog::MechanicId;
use crate::config::settings::{
    AmmunitionConfig, ArmorShredConfig, AuraConfig, ChargeConfig, ContagionConfig,
    EngagementConfig, FlankingConfig, MechanicOverride, MechanicSetting, PhalanxConfig,
    ResolveConfig, RiposteConfig, Selection,
};
use crate::error::ConfigError;

/// A fully normalized battle configuration.
///
/// Toggle-only mechanics are plain booleans; tunable mechanics are `None`
/// (disabled) or a complete record with every field populated. Created once
/// per battle, immutable thereafter, shared by reference across all phases.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Facing directions and attack arcs.
    pub facing: bool,
    /// Cumulative armor shredding.
    pub armor_shred: Option<ArmorShredConfig>,
    /// Morale state machine.
    pub resolve: Option<ResolveConfig>,
    /// Zone-of-control classification.
    pub engagement: Option<EngagementConfig>,
    /// Arc-based damage multipliers.
    pub flanking: Option<FlankingConfig>,
    /// Counter-attacks.
    pub riposte: Option<RiposteConfig>,
    /// Movement interception.
    pub intercept: bool,
    /// Ally stat auras.
    pub aura: Option<AuraConfig>,
    /// Movement momentum.
    pub charge: Option<ChargeConfig>,
    /// Reaction fire.
    pub overwatch: bool,
    /// Formation bonus.
    pub phalanx: Option<PhalanxConfig>,
    /// Sight-line gating.
    pub line_of_sight: bool,
    /// Finite ammunition.
    pub ammunition: Option<AmmunitionConfig>,
    /// Spreading status effects.
    pub contagion: Option<ContagionConfig>,
}

impl BattleConfig {
    /// True when the given mechanic is enabled in this configuration.
    #[must_use]
    pub const fn enabled(&self, mechanic: MechanicId) -> bool {
        match mechanic {
            MechanicId::Facing => self.facing,
            MechanicId::ArmorShred => self.armor_shred.is_some(),
            MechanicId::Resolve => self.resolve.is_some(),
            MechanicId::Engagement => self.engagement.is_some(),
            MechanicId::Flanking => self.flanking.is_some(),
            MechanicId::Riposte => self.riposte.is_some(),
            MechanicId::Intercept => self.intercept,
            MechanicId::Aura => self.aura.is_some(),
            MechanicId::Charge => self.charge.is_some(),
            MechanicId::Overwatch => self.overwatch,
            MechanicId::Phalanx => self.phalanx.is_some(),
            MechanicId::LineOfSight => self.line_of_sight,
            MechanicId::Ammunition => self.ammunition.is_some(),
            MechanicId::Contagion => self.contagion.is_some(),
        }
    }

    /// Checks the prerequisite invariant and every fractional field.
    ///
    /// # Errors
    ///
    /// - `MissingPrerequisite` when an enabled mechanic's prerequisite is
    ///   disabled. After dependency resolution this means the caller
    ///   explicitly disabled the prerequisite; on any other input it means
    ///   the resolver is broken. Either way the battle must not start.
    /// - `OutOfRange` when a fraction lies outside [0, 1].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for mechanic in MechanicId::ALL {
            if !self.enabled(mechanic) {
                continue;
            }
            for &prerequisite in mechanic.prerequisites() {
                if !self.enabled(prerequisite) {
                    return Err(ConfigError::MissingPrerequisite {
                        mechanic,
                        prerequisite,
                    });
                }
            }
        }

        let mut fractions: Vec<(MechanicId, &'static str, f64)> = Vec::new();
        if let Some(c) = &self.armor_shred {
            fractions.push((MechanicId::ArmorShred, "max_shred_percent", c.max_shred_percent));
        }
        if let Some(c) = &self.engagement {
            fractions.push((MechanicId::Engagement, "archer_penalty", c.archer_penalty));
        }
        if let Some(c) = &self.riposte {
            fractions.push((MechanicId::Riposte, "base_chance", c.base_chance));
        }
        if let Some(c) = &self.phalanx {
            fractions.push((MechanicId::Phalanx, "defense_bonus", c.defense_bonus));
        }
        if let Some(c) = &self.contagion {
            fractions.push((MechanicId::Contagion, "fire_spread", c.fire_spread));
            fractions.push((MechanicId::Contagion, "poison_spread", c.poison_spread));
            fractions.push((MechanicId::Contagion, "curse_spread", c.curse_spread));
            fractions.push((MechanicId::Contagion, "frost_spread", c.frost_spread));
            fractions.push((MechanicId::Contagion, "plague_spread", c.plague_spread));
            fractions.push((MechanicId::Contagion, "phalanx_bonus", c.phalanx_bonus));
        }

        for (mechanic, field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    mechanic,
                    field,
                    value,
                });
            }
        }

        Ok(())
    }

    /// Re-expresses this config as a complete selection.
    ///
    /// Every enabled tunable mechanic becomes a full override payload, so
    /// `normalize(&cfg.to_selection())` reproduces `cfg` exactly: the
    /// idempotence property.
    #[must_use]
    pub fn to_selection(&self) -> Selection {
        let mut selection = Selection::new();
        let mut put = |m: MechanicId, s: MechanicSetting| {
            selection.insert(m, s);
        };

        let toggle = |on: bool| {
            if on {
                MechanicSetting::Enabled
            } else {
                MechanicSetting::Disabled
            }
        };
        put(MechanicId::Facing, toggle(self.facing));
        put(MechanicId::Intercept, toggle(self.intercept));
        put(MechanicId::Overwatch, toggle(self.overwatch));
        put(MechanicId::LineOfSight, toggle(self.line_of_sight));

        put(
            MechanicId::ArmorShred,
            self.armor_shred.map_or(MechanicSetting::Disabled, |c| {
                MechanicSetting::Overrides(MechanicOverride::ArmorShred(c.to_patch()))
            }),
        );
        put(
            MechanicId::Resolve,
            self.resolve.map_or(MechanicSetting::Disabled, |c| {
                MechanicSetting::Overrides(MechanicOverride::Resolve(c.to_patch()))
            }),
        );
        put(
            MechanicId::Engagement,
            self.engagement.map_or(MechanicSetting::Disabled, |c| {
                MechanicSetting::Overrides(MechanicOverride::Engagement(c.to_patch()))
            }),
        );
        put(
            MechanicId::Flanking,
            self.flanking.map_or(MechanicSetting::Disabled, |c| {
                MechanicSetting::Overrides(MechanicOverride::Flanking(c.to_patch()))
            }),
        );
        put(
            MechanicId::Riposte,
            self.riposte.map_or(MechanicSetting::Disabled, |c| {
                MechanicSetting::Overrides(MechanicOverride::Riposte(c.to_patch()))
            }),
        );
        put(
            MechanicId::Aura,
            self.aura.map_or(MechanicSetting::Disabled, |c| {
                MechanicSetting::Overrides(MechanicOverride::Aura(c.to_patch()))
            }),
        );
        put(
            MechanicId::Charge,
            self.charge.map_or(MechanicSetting::Disabled, |c| {
                MechanicSetting::Overrides(MechanicOverride::Charge(c.to_patch()))
            }),
        );
        put(
            MechanicId::Phalanx,
            self.phalanx.map_or(MechanicSetting::Disabled, |c| {
                MechanicSetting::Overrides(MechanicOverride::Phalanx(c.to_patch()))
            }),
        );
        put(
            MechanicId::Ammunition,
            self.ammunition.map_or(MechanicSetting::Disabled, |c| {
                MechanicSetting::Overrides(MechanicOverride::Ammunition(c.to_patch()))
            }),
        );
        put(
            MechanicId::Contagion,
            self.contagion.map_or(MechanicSetting::Disabled, |c| {
                MechanicSetting::Overrides(MechanicOverride::Contagion(c.to_patch()))
            }),
        );

        selection
    }
}

/// Normalizes a resolved selection into a validated [`BattleConfig`].
///
/// Mechanics absent from the selection count as disabled, so the function
/// is total over partial selections too; production code always feeds it
/// the resolver's complete output.
///
/// # Errors
///
/// - `PatchMismatch` when an override payload is keyed under the wrong
///   mechanic (including any payload on a toggle-only mechanic).
/// - Everything [`BattleConfig::validate`] can return.
pub fn normalize(selection: &Selection) -> Result<BattleConfig, ConfigError> {
    fn toggle(selection: &Selection, mechanic: MechanicId) -> Result<bool, ConfigError> {
        match selection.get(&mechanic) {
            None | Some(MechanicSetting::Disabled) => Ok(false),
            Some(MechanicSetting::Enabled) => Ok(true),
            Some(MechanicSetting::Overrides(ov)) => Err(ConfigError::PatchMismatch {
                mechanic,
                payload: ov.mechanic(),
            }),
        }
    }

    fn tunable<C: Default, P>(
        selection: &Selection,
        mechanic: MechanicId,
        extract: impl Fn(&MechanicOverride) -> Option<&P>,
        merge: impl Fn(C, &P) -> C,
    ) -> Result<Option<C>, ConfigError> {
        match selection.get(&mechanic) {
            None | Some(MechanicSetting::Disabled) => Ok(None),
            Some(MechanicSetting::Enabled) => Ok(Some(C::default())),
            Some(MechanicSetting::Overrides(ov)) => match extract(ov) {
                Some(patch) => Ok(Some(merge(C::default(), patch))),
                None => Err(ConfigError::PatchMismatch {
                    mechanic,
                    payload: ov.mechanic(),
                }),
            },
        }
    }

    let config = BattleConfig {
        facing: toggle(selection, MechanicId::Facing)?,
        armor_shred: tunable(
            selection,
            MechanicId::ArmorShred,
            |ov| match ov {
                MechanicOverride::ArmorShred(p) => Some(p),
                _ => None,
            },
            ArmorShredConfig::merged,
        )?,
        resolve: tunable(
            selection,
            MechanicId::Resolve,
            |ov| match ov {
                MechanicOverride::Resolve(p) => Some(p),
                _ => None,
            },
            ResolveConfig::merged,
        )?,
        engagement: tunable(
            selection,
            MechanicId::Engagement,
            |ov| match ov {
                MechanicOverride::Engagement(p) => Some(p),
                _ => None,
            },
            EngagementConfig::merged,
        )?,
        flanking: tunable(
            selection,
            MechanicId::Flanking,
            |ov| match ov {
                MechanicOverride::Flanking(p) => Some(p),
                _ => None,
            },
            FlankingConfig::merged,
        )?,
        riposte: tunable(
            selection,
            MechanicId::Riposte,
            |ov| match ov {
                MechanicOverride::Riposte(p) => Some(p),
                _ => None,
            },
            RiposteConfig::merged,
        )?,
        intercept: toggle(selection, MechanicId::Intercept)?,
        aura: tunable(
            selection,
            MechanicId::Aura,
            |ov| match ov {
                MechanicOverride::Aura(p) => Some(p),
                _ => None,
            },
            AuraConfig::merged,
        )?,
        charge: tunable(
            selection,
            MechanicId::Charge,
            |ov| match ov {
                MechanicOverride::Charge(p) => Some(p),
                _ => None,
            },
            ChargeConfig::merged,
        )?,
        overwatch: toggle(selection, MechanicId::Overwatch)?,
        phalanx: tunable(
            selection,
            MechanicId::Phalanx,
            |ov| match ov {
                MechanicOverride::Phalanx(p) => Some(p),
                _ => None,
            },
            PhalanxConfig::merged,
        )?,
        line_of_sight: toggle(selection, MechanicId::LineOfSight)?,
        ammunition: tunable(
            selection,
            MechanicId::Ammunition,
            |ov| match ov {
                MechanicOverride::Ammunition(p) => Some(p),
                _ => None,
            },
            AmmunitionConfig::merged,
        )?,
        contagion: tunable(
            selection,
            MechanicId::Contagion,
            |ov| match ov {
                MechanicOverride::Contagion(p) => Some(p),
                _ => None,
            },
            ContagionConfig::merged,
        )?,
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve_dependencies;
    use crate::config::settings::{ContagionPatch, RipostePatch};

    fn select(entries: &[(MechanicId, MechanicSetting)]) -> Selection {
        entries.iter().cloned().collect()
    }

    #[test]
    fn empty_selection_disables_everything() {
        let config = normalize(&Selection::new()).unwrap();
        for m in MechanicId::ALL {
            assert!(!config.enabled(m), "{m} unexpectedly enabled");
        }
        assert_eq!(config, BattleConfig::default());
    }

    #[test]
    fn enabled_gets_catalog_defaults() {
        let selection = resolve_dependencies(&select(&[(
            MechanicId::Riposte,
            MechanicSetting::Enabled,
        )]));
        let config = normalize(&selection).unwrap();

        assert_eq!(config.riposte, Some(RiposteConfig::default()));
        assert_eq!(config.flanking, Some(FlankingConfig::default()));
        assert!(config.facing);
    }

    #[test]
    fn override_wins_per_field_not_per_object() {
        let selection = resolve_dependencies(&select(&[(
            MechanicId::Riposte,
            MechanicSetting::Overrides(MechanicOverride::Riposte(RipostePatch {
                base_chance: Some(0.4),
                ..RipostePatch::default()
            })),
        )]));
        let config = normalize(&selection).unwrap();
        let riposte = config.riposte.unwrap();

        assert!((riposte.base_chance - 0.4).abs() < f64::EPSILON);
        // The untouched fields came from the defaults.
        assert_eq!(
            riposte.guaranteed_threshold,
            RiposteConfig::default().guaranteed_threshold
        );
        assert_eq!(riposte.charge_pool, RiposteConfig::default().charge_pool);
    }

    #[test]
    fn mismatched_payload_is_rejected() {
        let selection = select(&[(
            MechanicId::Flanking,
            MechanicSetting::Overrides(MechanicOverride::Riposte(RipostePatch::default())),
        )]);
        // Resolution keeps the caller's payload; normalization flags it.
        let err = normalize(&resolve_dependencies(&selection)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::PatchMismatch {
                mechanic: MechanicId::Flanking,
                payload: MechanicId::Riposte,
            }
        );
    }

    #[test]
    fn payload_on_toggle_only_mechanic_is_rejected() {
        let selection = select(&[(
            MechanicId::Facing,
            MechanicSetting::Overrides(MechanicOverride::Riposte(RipostePatch::default())),
        )]);
        let err = normalize(&selection).unwrap_err();
        assert!(matches!(err, ConfigError::PatchMismatch { .. }));
    }

    #[test]
    fn out_of_range_fraction_is_rejected() {
        let selection = resolve_dependencies(&select(&[(
            MechanicId::Contagion,
            MechanicSetting::Overrides(MechanicOverride::Contagion(ContagionPatch {
                fire_spread: Some(1.5),
                ..ContagionPatch::default()
            })),
        )]));
        let err = normalize(&selection).unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutOfRange {
                mechanic: MechanicId::Contagion,
                field: "fire_spread",
                value: 1.5,
            }
        );
    }

    #[test]
    fn explicitly_disabled_prerequisite_fails_validation() {
        let mut partial = select(&[(MechanicId::Riposte, MechanicSetting::Enabled)]);
        partial.insert(MechanicId::Flanking, MechanicSetting::Disabled);

        let err = normalize(&resolve_dependencies(&partial)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingPrerequisite {
                mechanic: MechanicId::Riposte,
                prerequisite: MechanicId::Flanking,
            }
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let selection = resolve_dependencies(&select(&[
            (MechanicId::Riposte, MechanicSetting::Enabled),
            (MechanicId::Contagion, MechanicSetting::Enabled),
            (MechanicId::Overwatch, MechanicSetting::Enabled),
            (
                MechanicId::ArmorShred,
                MechanicSetting::Overrides(MechanicOverride::ArmorShred(
                    crate::config::settings::ArmorShredPatch {
                        max_shred_percent: Some(0.25),
                        ..Default::default()
                    },
                )),
            ),
        ]));

        let once = normalize(&selection).unwrap();
        let twice = normalize(&once.to_selection()).unwrap();
        assert_eq!(once, twice);
    }
}
