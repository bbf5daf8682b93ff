//! Phalanx processor: the formation bonus.
//!
//! Owns [`PhalanxState`]. A unit stands in phalanx while enough orthogonally
//! adjacent, same-team, same-kind allies share its facing. The formation
//! absorbs a configured fraction of incoming strike damage. Formation
//! membership is swept over the whole roster at turn start.

use gridiron::orthogonally_adjacent;

use crate::catalog::MechanicId;
use crate::config::PhalanxConfig;
use crate::event::BattleEvent;
use crate::phase::{Phase, PhaseContext};
use crate::pipeline::Processor;
use crate::state::BattleState;
use crate::unit::{PhalanxState, Unit, UnitId};

const PHASES: &[Phase] = &[Phase::TurnStart, Phase::PreAttack];

/// Processor for the phalanx mechanic.
#[derive(Debug)]
pub struct PhalanxProcessor {
    config: PhalanxConfig,
}

impl PhalanxProcessor {
    /// Creates the phalanx processor.
    #[must_use]
    pub fn new(config: PhalanxConfig) -> Self {
        Self { config }
    }

    fn in_formation(&self, state: &BattleState, unit: &Unit) -> bool {
        // Facing is a prerequisite mechanic, but the unit itself may never
        // have turned; an unfaced unit cannot align with anyone.
        if unit.facing.is_none() || !unit.can_act() {
            return false;
        }
        let aligned = state
            .units()
            .filter(|ally| {
                ally.id != unit.id
                    && ally.team == unit.team
                    && ally.alive
                    && ally.role.same_kind(unit.role)
                    && orthogonally_adjacent(ally.pos, unit.pos)
                    && ally.facing_direction() == unit.facing_direction()
            })
            .count();
        aligned >= self.config.min_adjacent as usize
    }

    fn sweep(&self, mut state: BattleState) -> BattleState {
        let memberships: Vec<(UnitId, bool)> = state
            .units()
            .map(|u| (u.id, self.in_formation(&state, u)))
            .collect();
        let round = state.round;
        for (id, active) in memberships {
            let mut formed = false;
            if let Some(unit) = state.unit_mut(id) {
                let phalanx = unit.phalanx.get_or_insert(PhalanxState::default());
                formed = active && !phalanx.active;
                phalanx.active = active;
            }
            if formed {
                state.push_event(BattleEvent::PhalanxFormed { round, unit: id });
            }
        }
        state
    }
}

impl Processor for PhalanxProcessor {
    fn mechanic(&self) -> MechanicId {
        MechanicId::Phalanx
    }

    fn phases(&self) -> &'static [Phase] {
        PHASES
    }

    fn apply(&self, phase: Phase, mut state: BattleState, _ctx: &PhaseContext) -> BattleState {
        match phase {
            Phase::TurnStart => self.sweep(state),
            Phase::PreAttack => {
                let Some(attack) = state.active_attack else {
                    return state;
                };
                if attack.is_cancelled() {
                    return state;
                }
                let shielded = state
                    .unit(attack.defender)
                    .and_then(|d| d.phalanx)
                    .is_some_and(|p| p.active);
                if shielded {
                    if let Some(active) = state.active_attack.as_mut() {
                        active.multiplier *= 1.0 - self.config.defense_bonus;
                    }
                }
                state
            }
            _ => state,
        }
    }
}
