//! Ammunition processor: finite rounds for ranged strikes.
//!
//! Owns [`AmmoState`]. A ranged strike needs at least one round in the
//! quiver: at pre-attack a dry attacker's strike is called off, and a
//! strike that survives to the attack phase spends one round. Melee units
//! carry no ammunition at all.

use crate::catalog::MechanicId;
use crate::config::AmmunitionConfig;
use crate::event::{BattleEvent, CancelReason};
use crate::phase::{Phase, PhaseContext};
use crate::pipeline::Processor;
use crate::state::BattleState;
use crate::unit::AmmoState;

const PHASES: &[Phase] = &[Phase::PreAttack, Phase::Attack];

/// Processor for the ammunition mechanic.
#[derive(Debug)]
pub struct AmmunitionProcessor {
    config: AmmunitionConfig,
}

impl AmmunitionProcessor {
    /// Creates the ammunition processor.
    #[must_use]
    pub fn new(config: AmmunitionConfig) -> Self {
        Self { config }
    }
}

impl Processor for AmmunitionProcessor {
    fn mechanic(&self) -> MechanicId {
        MechanicId::Ammunition
    }

    fn phases(&self) -> &'static [Phase] {
        PHASES
    }

    fn apply(&self, phase: Phase, mut state: BattleState, _ctx: &PhaseContext) -> BattleState {
        let Some(attack) = state.active_attack else {
            return state;
        };
        if attack.is_cancelled() {
            return state;
        }
        let ranged = state
            .unit(attack.attacker)
            .is_some_and(|a| a.role.is_ranged());
        if !ranged {
            return state;
        }

        match phase {
            Phase::PreAttack => {
                let remaining = state
                    .unit(attack.attacker)
                    .and_then(|a| a.ammo)
                    .map_or(self.config.capacity, |a| a.remaining);
                if remaining > 0 {
                    return state;
                }
                let round = state.round;
                if let Some(active) = state.active_attack.as_mut() {
                    active.cancelled = Some(CancelReason::NoAmmo);
                }
                state.push_event(BattleEvent::AmmoExhausted {
                    round,
                    unit: attack.attacker,
                });
                state.push_event(BattleEvent::StrikeCancelled {
                    round,
                    attacker: attack.attacker,
                    defender: attack.defender,
                    reason: CancelReason::NoAmmo,
                });
                state
            }
            Phase::Attack => {
                let capacity = self.config.capacity;
                if let Some(attacker) = state.unit_mut(attack.attacker) {
                    let ammo = attacker.ammo.get_or_insert(AmmoState {
                        remaining: capacity,
                    });
                    ammo.remaining = ammo.remaining.saturating_sub(1);
                }
                state
            }
            _ => state,
        }
    }
}
