//! Contagion processor: spreading status effects.
//!
//! Owns [`ContagionState`]. Five effect types (fire, poison, curse, frost,
//! plague) spread independently. The spread step runs once per round, on
//! the first turn-end invocation of that round:
//!
//! - sources are snapshotted first, so freshly infected units never spread
//!   in the same pass; propagation is single-hop per invocation, which is
//!   why a line formation takes one round per cell to burn through;
//! - for every infected source, every orthogonally adjacent (Manhattan
//!   distance exactly 1) uninfected, non-immune unit gets one seeded draw
//!   per (effect, target) pair;
//! - the effective chance is the effect's base chance plus the phalanx
//!   bonus when the target stands in an active phalanx; packed formations
//!   catch things.
//!
//! Carriers also pay for their afflictions: each damaging effect ticks on
//! its carrier at the carrier's own turn start. Frost deals nothing but
//! halves movement; the battle loop reads that off the public flag set.

use gridiron::orthogonal_neighbors;

use crate::catalog::MechanicId;
use crate::config::ContagionConfig;
use crate::event::BattleEvent;
use crate::phase::{Phase, PhaseContext};
use crate::pipeline::Processor;
use crate::rng;
use crate::state::BattleState;
use crate::unit::{ContagionState, Effect, EffectFlags, UnitId};

const PHASES: &[Phase] = &[Phase::TurnStart, Phase::TurnEnd];

const SPREAD_SALT: u64 = 0x43_4f_4e_54;

/// Processor for the contagion mechanic.
#[derive(Debug)]
pub struct ContagionProcessor {
    config: ContagionConfig,
}

impl ContagionProcessor {
    /// Creates the contagion processor.
    #[must_use]
    pub fn new(config: ContagionConfig) -> Self {
        Self { config }
    }

    fn tick(mut state: BattleState, ctx: &PhaseContext) -> BattleState {
        let Some(actor) = state.unit(ctx.actor) else {
            return state;
        };
        if !actor.alive {
            return state;
        }
        let Some(contagion) = actor.contagion else {
            return state;
        };
        let round = state.round;

        for effect in Effect::ALL {
            if !contagion.active.contains(effect.flag()) {
                continue;
            }
            let damage = effect.tick_damage();
            if damage == 0 {
                continue;
            }
            let mut died = false;
            let mut dealt = 0;
            if let Some(actor) = state.unit_mut(ctx.actor) {
                dealt = actor.take_damage(damage);
                died = !actor.alive;
            }
            state.push_event(BattleEvent::ContagionTick {
                round,
                unit: ctx.actor,
                effect,
                damage: dealt,
            });
            if died {
                state.push_event(BattleEvent::UnitDied {
                    round,
                    unit: ctx.actor,
                });
                break;
            }
        }
        state
    }

    fn spread(&self, mut state: BattleState, ctx: &PhaseContext) -> BattleState {
        // One spread step per round, no matter how many unit turns pass
        // through turn end.
        if state.last_spread_round >= state.round {
            return state;
        }
        state.last_spread_round = state.round;
        let round = state.round;

        // Snapshot the sources: units infected *before* this pass.
        let sources: Vec<(UnitId, EffectFlags)> = state
            .units()
            .filter(|u| u.alive)
            .filter_map(|u| u.contagion.map(|c| (u.id, c.active)))
            .filter(|(_, active)| !active.is_empty())
            .collect();

        for (source_id, active) in sources {
            let Some(source_pos) = state.unit(source_id).map(|u| u.pos) else {
                continue;
            };
            for (effect_index, effect) in Effect::ALL.into_iter().enumerate() {
                if !active.contains(effect.flag()) {
                    continue;
                }
                for cell in orthogonal_neighbors(source_pos) {
                    let Some(target_id) = state.occupant(cell) else {
                        continue;
                    };
                    let Some(target) = state.unit(target_id) else {
                        continue;
                    };
                    let target_contagion = target.contagion.unwrap_or_default();
                    if target_contagion.active.contains(effect.flag())
                        || target_contagion.immune.contains(effect.flag())
                    {
                        continue;
                    }
                    let in_phalanx = target.phalanx.is_some_and(|p| p.active);

                    let mut chance = self.config.spread_chance(effect);
                    if in_phalanx {
                        chance += self.config.phalanx_bonus;
                    }

                    let seed = rng::mix_many(
                        ctx.seed,
                        &[
                            SPREAD_SALT,
                            source_id.as_u64(),
                            effect_index as u64,
                            target_id.as_u64(),
                        ],
                    );
                    if !rng::roll_under(seed, chance) {
                        continue;
                    }

                    if let Some(target) = state.unit_mut(target_id) {
                        let contagion = target.contagion.get_or_insert(ContagionState::default());
                        contagion.active |= effect.flag();
                    }
                    state.push_event(BattleEvent::ContagionSpread {
                        round,
                        effect,
                        source: source_id,
                        target: target_id,
                    });
                }
            }
        }
        state
    }
}

impl Processor for ContagionProcessor {
    fn mechanic(&self) -> MechanicId {
        MechanicId::Contagion
    }

    fn phases(&self) -> &'static [Phase] {
        PHASES
    }

    fn apply(&self, phase: Phase, state: BattleState, ctx: &PhaseContext) -> BattleState {
        match phase {
            Phase::TurnStart => Self::tick(state, ctx),
            Phase::TurnEnd => self.spread(state, ctx),
            _ => state,
        }
    }
}
