//! Battle phases and per-invocation context.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::unit::UnitId;

/// One of the six fixed battle phases.
///
/// The battle loop invokes the pipeline once per phase per acting unit, in
/// exactly this order. The order is declared here rather than implied by
/// any container's iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Upkeep before the unit acts: regeneration, refills, formation checks.
    TurnStart,
    /// The unit's movement is proposed, contested, and committed.
    Movement,
    /// An imminent strike is adjusted by modifiers.
    PreAttack,
    /// The strike itself.
    Attack,
    /// Reactions to a landed strike: counters, morale damage, shredding.
    PostAttack,
    /// End-of-turn bookkeeping: facing updates, overwatch arming, spread.
    TurnEnd,
}

impl Phase {
    /// Every phase, in execution order.
    pub const ALL: [Self; 6] = [
        Self::TurnStart,
        Self::Movement,
        Self::PreAttack,
        Self::Attack,
        Self::PostAttack,
        Self::TurnEnd,
    ];

    /// Position of this phase in the execution order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The snake_case name of this phase.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TurnStart => "turn_start",
            Self::Movement => "movement",
            Self::PreAttack => "pre_attack",
            Self::Attack => "attack",
            Self::PostAttack => "post_attack",
            Self::TurnEnd => "turn_end",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-invocation data handed to every processor call.
///
/// Not persisted anywhere; the battle loop builds a fresh context for each
/// phase of each unit turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseContext {
    /// The unit whose turn is being processed.
    pub actor: UnitId,
    /// The unit being struck, when a strike is in flight.
    pub target: Option<UnitId>,
    /// Seed for every probabilistic draw in this invocation.
    pub seed: u64,
}

impl PhaseContext {
    /// Context for a phase with no strike in flight.
    #[must_use]
    pub const fn new(actor: UnitId, seed: u64) -> Self {
        Self {
            actor,
            target: None,
            seed,
        }
    }

    /// Context for a strike against `target`.
    #[must_use]
    pub const fn with_target(actor: UnitId, target: UnitId, seed: u64) -> Self {
        Self {
            actor,
            target: Some(target),
            seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_ordered() {
        for (i, p) in Phase::ALL.into_iter().enumerate() {
            assert_eq!(p.index(), i);
        }
    }

    #[test]
    fn phase_names() {
        assert_eq!(Phase::TurnStart.to_string(), "turn_start");
        assert_eq!(Phase::PostAttack.to_string(), "post_attack");
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Phase::PreAttack).unwrap();
        assert_eq!(json, "\"pre_attack\"");
    }

    #[test]
    fn context_constructors() {
        let ctx = PhaseContext::new(UnitId::new(1), 99);
        assert_eq!(ctx.target, None);

        let ctx = PhaseContext::with_target(UnitId::new(1), UnitId::new(2), 99);
        assert_eq!(ctx.target, Some(UnitId::new(2)));
    }
}
