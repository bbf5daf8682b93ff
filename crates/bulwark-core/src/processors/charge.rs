//! Charge processor: momentum built by movement, spent on the next strike.
//!
//! Owns [`ChargeState`]. Every cell actually walked adds momentum; a hard
//! interception wipes it (the halted flag on the move plan carries that
//! signal). At pre-attack the stored momentum converts into a damage
//! multiplier bonus, capped by configuration, and a landed strike consumes
//! it all.

use crate::catalog::MechanicId;
use crate::config::ChargeConfig;
use crate::phase::{Phase, PhaseContext};
use crate::pipeline::Processor;
use crate::state::BattleState;
use crate::unit::ChargeState;

const PHASES: &[Phase] = &[Phase::Movement, Phase::PreAttack, Phase::PostAttack];

/// Processor for the charge mechanic.
#[derive(Debug)]
pub struct ChargeProcessor {
    config: ChargeConfig,
}

impl ChargeProcessor {
    /// Creates the charge processor.
    #[must_use]
    pub fn new(config: ChargeConfig) -> Self {
        Self { config }
    }
}

impl Processor for ChargeProcessor {
    fn mechanic(&self) -> MechanicId {
        MechanicId::Charge
    }

    fn phases(&self) -> &'static [Phase] {
        PHASES
    }

    fn apply(&self, phase: Phase, mut state: BattleState, ctx: &PhaseContext) -> BattleState {
        match phase {
            Phase::Movement => {
                let Some(plan) = state.pending_move.clone() else {
                    return state;
                };
                if plan.mover != ctx.actor {
                    return state;
                }
                #[allow(clippy::cast_precision_loss)]
                let gained = self.config.momentum_per_cell * plan.path.len() as f64;
                if let Some(mover) = state.unit_mut(plan.mover) {
                    let charge = mover.charge.get_or_insert(ChargeState::default());
                    if plan.halted {
                        charge.momentum = 0.0;
                    } else {
                        charge.momentum += gained;
                    }
                }
                state
            }
            Phase::PreAttack => {
                let Some(attack) = state.active_attack else {
                    return state;
                };
                if attack.is_cancelled() || attack.attacker != ctx.actor {
                    return state;
                }
                let momentum = state
                    .unit(attack.attacker)
                    .and_then(|a| a.charge)
                    .map_or(0.0, |c| c.momentum);
                let bonus = momentum.min(self.config.max_momentum_bonus);
                if bonus > 0.0 {
                    if let Some(active) = state.active_attack.as_mut() {
                        active.multiplier *= 1.0 + bonus;
                    }
                }
                state
            }
            Phase::PostAttack => {
                let Some(attack) = state.active_attack else {
                    return state;
                };
                if attack.is_cancelled() || attack.damage_dealt == 0 {
                    return state;
                }
                if let Some(attacker) = state.unit_mut(attack.attacker) {
                    if let Some(charge) = attacker.charge.as_mut() {
                        charge.momentum = 0.0;
                    }
                }
                state
            }
            _ => state,
        }
    }
}
