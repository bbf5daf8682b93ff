//! Built-in mechanic presets.

use crate::catalog::MechanicId;
use crate::config::settings::{MechanicSetting, Selection};

/// A curated mechanic selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Every mechanic disabled: the full backward-compatibility baseline.
    /// Battles run exactly as if no mechanics engine were attached.
    Legacy,
    /// Tiers 0 and 1 enabled with defaults: positioning, formations, and
    /// reaction play without the morale and counter-attack layer on top.
    Skirmish,
    /// Every mechanic enabled with defaults.
    Full,
}

impl Preset {
    /// The selection this preset stands for.
    #[must_use]
    pub fn selection(self) -> Selection {
        MechanicId::ALL
            .into_iter()
            .map(|m| {
                let on = match self {
                    Self::Legacy => false,
                    Self::Skirmish => m.tier() <= 1,
                    Self::Full => true,
                };
                let setting = if on {
                    MechanicSetting::Enabled
                } else {
                    MechanicSetting::Disabled
                };
                (m, setting)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{normalize, resolve_dependencies};

    #[test]
    fn legacy_disables_everything() {
        let config = normalize(&resolve_dependencies(&Preset::Legacy.selection())).unwrap();
        for m in MechanicId::ALL {
            assert!(!config.enabled(m));
        }
    }

    #[test]
    fn full_enables_everything() {
        let config = normalize(&resolve_dependencies(&Preset::Full.selection())).unwrap();
        for m in MechanicId::ALL {
            assert!(config.enabled(m));
        }
    }

    #[test]
    fn skirmish_is_dependency_closed() {
        // Tiers are dependency depths, so tier <= 1 already contains every
        // prerequisite; resolution must not need to add anything.
        let selection = Preset::Skirmish.selection();
        let resolved = resolve_dependencies(&selection);
        assert_eq!(selection, resolved);

        let config = normalize(&resolved).unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn skirmish_leaves_the_top_tier_out() {
        let config = normalize(&resolve_dependencies(&Preset::Skirmish.selection())).unwrap();
        assert!(!config.enabled(MechanicId::Resolve));
        assert!(!config.enabled(MechanicId::Riposte));
        assert!(config.enabled(MechanicId::Flanking));
        assert!(config.enabled(MechanicId::Intercept));
    }
}
