//! Overwatch processor: reaction fire against movement in the open.
//!
//! Owns [`OverwatchState`]. A ranged unit arms itself at its own turn end
//! when it is free of enemy zones of control and still has something to
//! shoot with. While an enemy's move is being contested, every armed
//! watcher whose range and sight line cover a cell on the path fires once
//! at the mover and disarms.
//!
//! Overwatch never spends ammunition: arming merely *requires* a stocked
//! quiver when the ammunition extension is present. Spending is the
//! ammunition processor's business and stays there.

use gridiron::{line_of_sight, manhattan, Cell};

use crate::catalog::MechanicId;
use crate::event::BattleEvent;
use crate::phase::{Phase, PhaseContext};
use crate::pipeline::Processor;
use crate::state::BattleState;
use crate::unit::{OverwatchState, Unit, UnitId};

const PHASES: &[Phase] = &[Phase::Movement, Phase::TurnEnd];

/// Processor for the overwatch mechanic.
#[derive(Debug, Default)]
pub struct OverwatchProcessor;

impl OverwatchProcessor {
    /// Creates the overwatch processor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn can_arm(unit: &Unit) -> bool {
        unit.role.is_ranged()
            && unit.can_act()
            && !unit.engagement.is_some_and(|e| e.status.is_engaged())
            && unit.ammo.is_none_or(|a| a.remaining > 0)
    }

    /// The first path cell `watcher` can cover, if any.
    fn covered_cell(state: &BattleState, watcher: &Unit, path: &[Cell], mover: UnitId) -> Option<Cell> {
        path.iter()
            .find(|&&cell| {
                manhattan(watcher.pos, cell) <= watcher.role.reach()
                    && line_of_sight(watcher.pos, cell, |c| {
                        state.map.is_blocked(c)
                            || state
                                .occupant(c)
                                .is_some_and(|id| id != watcher.id && id != mover)
                    })
            })
            .copied()
    }

    fn reaction_fire(mut state: BattleState) -> BattleState {
        let Some(plan) = state.pending_move.clone() else {
            return state;
        };
        if plan.path.is_empty() {
            return state;
        }
        let Some(mover) = state.unit(plan.mover) else {
            return state;
        };
        let (mover_team, mover_armor) = (mover.team, mover.stats.armor);
        let round = state.round;

        let watcher_ids: Vec<UnitId> = state
            .units()
            .filter(|u| {
                u.team != mover_team
                    && u.can_act()
                    && u.role.is_ranged()
                    && u.overwatch.is_some_and(|o| o.armed)
            })
            .map(|u| u.id)
            .collect();

        for watcher_id in watcher_ids {
            let Some(watcher) = state.unit(watcher_id) else {
                continue;
            };
            let Some(_cell) = Self::covered_cell(&state, watcher, &plan.path, plan.mover) else {
                continue;
            };
            let damage = (watcher.stats.attack - mover_armor).max(1);

            if let Some(watcher) = state.unit_mut(watcher_id) {
                watcher.overwatch = Some(OverwatchState { armed: false });
            }
            let mut died = false;
            let mut dealt = 0;
            if let Some(mover) = state.unit_mut(plan.mover) {
                dealt = mover.take_damage(damage);
                died = !mover.alive;
            }
            state.push_event(BattleEvent::OverwatchShot {
                round,
                watcher: watcher_id,
                mover: plan.mover,
                damage: dealt,
            });
            if died {
                state.push_event(BattleEvent::UnitDied {
                    round,
                    unit: plan.mover,
                });
                break;
            }
        }
        state
    }
}

impl Processor for OverwatchProcessor {
    fn mechanic(&self) -> MechanicId {
        MechanicId::Overwatch
    }

    fn phases(&self) -> &'static [Phase] {
        PHASES
    }

    fn apply(&self, phase: Phase, mut state: BattleState, ctx: &PhaseContext) -> BattleState {
        match phase {
            Phase::Movement => Self::reaction_fire(state),
            Phase::TurnEnd => {
                let armed = state.unit(ctx.actor).is_some_and(Self::can_arm);
                if let Some(actor) = state.unit_mut(ctx.actor) {
                    if actor.role.is_ranged() {
                        actor.overwatch = Some(OverwatchState { armed });
                    }
                }
                state
            }
            _ => state,
        }
    }
}
