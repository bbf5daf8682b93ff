//! Static mechanic catalog: identity, prerequisites, tiers.
//!
//! The catalog is the single process-wide, read-only table the whole engine
//! hangs off: the closed set of mechanic identifiers, each mechanic's direct
//! prerequisites, and the declaration order that doubles as the pipeline
//! execution order. It is defined entirely at compile time and never passed
//! around as mutable state.
//!
//! # Ordering
//!
//! [`MechanicId::ALL`] is the catalog order. The phase pipeline executes
//! enabled processors in exactly this order, so it is part of the
//! determinism contract, not an incidental artifact of map iteration.
//!
//! # Dependencies
//!
//! Prerequisite edges form a DAG. [`validate`] runs a depth-first cycle
//! check as a defensive guard against a data-entry mistake in
//! [`MechanicId::prerequisites`]; a cycle is a build-time invariant
//! violation, never an expected runtime condition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Identifier of one toggleable rule module.
///
/// The set is closed: all fourteen mechanics are known at compile time and
/// there is no runtime registration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum MechanicId {
    /// Facing directions and attack arcs.
    Facing,
    /// Cumulative armor shredding.
    ArmorShred,
    /// Morale state machine (rout / crumble).
    Resolve,
    /// Zone-of-control classification and attacks of opportunity.
    Engagement,
    /// Arc-based damage multipliers.
    Flanking,
    /// Counter-attacks against front-arc strikes.
    Riposte,
    /// Movement interception along a path.
    Intercept,
    /// Stat bonuses projected onto nearby allies.
    Aura,
    /// Momentum built by movement, spent on the next strike.
    Charge,
    /// Reaction fire against enemies moving in the open.
    Overwatch,
    /// Formation bonus for aligned, adjacent same-type allies.
    Phalanx,
    /// Sight-line gating of ranged strikes.
    LineOfSight,
    /// Finite ammunition for ranged strikes.
    Ammunition,
    /// Spreading status effects.
    Contagion,
}

impl MechanicId {
    /// Every mechanic, in catalog (and therefore pipeline) order.
    pub const ALL: [Self; 14] = [
        Self::Facing,
        Self::ArmorShred,
        Self::Resolve,
        Self::Engagement,
        Self::Flanking,
        Self::Riposte,
        Self::Intercept,
        Self::Aura,
        Self::Charge,
        Self::Overwatch,
        Self::Phalanx,
        Self::LineOfSight,
        Self::Ammunition,
        Self::Contagion,
    ];

    /// Direct prerequisites of this mechanic.
    ///
    /// A mechanic can only be enabled when every mechanic listed here is
    /// also enabled; the dependency resolver closes partial selections over
    /// these edges.
    #[must_use]
    pub const fn prerequisites(self) -> &'static [Self] {
        match self {
            Self::Flanking | Self::Charge | Self::Phalanx => &[Self::Facing],
            Self::Resolve | Self::Riposte => &[Self::Flanking],
            Self::Intercept => &[Self::Engagement],
            Self::Overwatch => &[Self::Engagement, Self::LineOfSight],
            _ => &[],
        }
    }

    /// Dependency depth of this mechanic (0 = no prerequisites).
    ///
    /// Tiers exist only for preset curation; nothing at runtime enforces
    /// them beyond the dependency graph itself. A unit test checks this
    /// table against the depth computed from [`prerequisites`](Self::prerequisites).
    #[must_use]
    pub const fn tier(self) -> u8 {
        match self {
            Self::Facing
            | Self::ArmorShred
            | Self::Engagement
            | Self::Aura
            | Self::LineOfSight
            | Self::Ammunition
            | Self::Contagion => 0,
            Self::Flanking
            | Self::Intercept
            | Self::Charge
            | Self::Overwatch
            | Self::Phalanx => 1,
            Self::Resolve | Self::Riposte => 2,
        }
    }

    /// The wire name of this mechanic (`armorShred`, `lineOfSight`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Facing => "facing",
            Self::ArmorShred => "armorShred",
            Self::Resolve => "resolve",
            Self::Engagement => "engagement",
            Self::Flanking => "flanking",
            Self::Riposte => "riposte",
            Self::Intercept => "intercept",
            Self::Aura => "aura",
            Self::Charge => "charge",
            Self::Overwatch => "overwatch",
            Self::Phalanx => "phalanx",
            Self::LineOfSight => "lineOfSight",
            Self::Ammunition => "ammunition",
            Self::Contagion => "contagion",
        }
    }
}

impl fmt::Display for MechanicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MechanicId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| ConfigError::UnknownMechanic(s.to_string()))
    }
}

/// Validates that the catalog's dependency edges form a DAG.
///
/// Runs a three-color depth-first traversal over every mechanic. Returns
/// [`ConfigError::DependencyCycle`] naming a mechanic on the cycle if one
/// exists.
///
/// # Errors
///
/// `DependencyCycle` if the prerequisite table loops back on itself.
pub fn validate() -> Result<(), ConfigError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    fn visit(m: MechanicId, marks: &mut [Mark; MechanicId::ALL.len()]) -> Result<(), ConfigError> {
        let idx = m as usize;
        match marks[idx] {
            Mark::Done => return Ok(()),
            Mark::InProgress => return Err(ConfigError::DependencyCycle(m)),
            Mark::Unvisited => {}
        }
        marks[idx] = Mark::InProgress;
        for &p in m.prerequisites() {
            visit(p, marks)?;
        }
        marks[idx] = Mark::Done;
        Ok(())
    }

    let mut marks = [Mark::Unvisited; MechanicId::ALL.len()];
    for m in MechanicId::ALL {
        visit(m, &mut marks)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_acyclic() {
        assert_eq!(validate(), Ok(()));
    }

    #[test]
    fn all_lists_every_mechanic_once() {
        let mut seen = std::collections::BTreeSet::new();
        for m in MechanicId::ALL {
            assert!(seen.insert(m), "{m} listed twice");
        }
        assert_eq!(seen.len(), 14);
    }

    #[test]
    fn tier_matches_dependency_depth() {
        fn depth(m: MechanicId) -> u8 {
            m.prerequisites()
                .iter()
                .map(|&p| depth(p) + 1)
                .max()
                .unwrap_or(0)
        }

        for m in MechanicId::ALL {
            assert_eq!(m.tier(), depth(m), "tier table out of date for {m}");
        }
    }

    #[test]
    fn prerequisites_are_transitively_closed_under_all() {
        // Every prerequisite must itself be a catalog member at a lower tier.
        for m in MechanicId::ALL {
            for &p in m.prerequisites() {
                assert!(MechanicId::ALL.contains(&p));
                assert!(p.tier() < m.tier());
            }
        }
    }

    #[test]
    fn wire_names_round_trip() {
        for m in MechanicId::ALL {
            let parsed: MechanicId = m.name().parse().unwrap();
            assert_eq!(parsed, m);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "telekinesis".parse::<MechanicId>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownMechanic("telekinesis".to_string()));
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&MechanicId::ArmorShred).unwrap();
        assert_eq!(json, "\"armorShred\"");
        let json = serde_json::to_string(&MechanicId::LineOfSight).unwrap();
        assert_eq!(json, "\"lineOfSight\"");

        let back: MechanicId = serde_json::from_str("\"contagion\"").unwrap();
        assert_eq!(back, MechanicId::Contagion);
    }

    #[test]
    fn riposte_chain_reaches_facing() {
        // riposte -> flanking -> facing, the canonical transitive chain.
        assert_eq!(MechanicId::Riposte.prerequisites(), &[MechanicId::Flanking]);
        assert_eq!(MechanicId::Flanking.prerequisites(), &[MechanicId::Facing]);
    }
}
