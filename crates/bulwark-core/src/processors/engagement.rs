//! Engagement processor: zones of control.
//!
//! Owns [`EngagementState`]. Melee-capable units project a zone of control
//! onto their orthogonally adjacent cells; every unit is classified by how
//! many hostile zones cover its cell: free (none), engaged (one), or
//! pinned (two or more).
//!
//! Consequences implemented here:
//! - ranged units deal `1 - archer_penalty` of their damage while engaged;
//! - leaving a zone of control without paying the disengage movement cost
//!   draws one attack of opportunity from each controller the mover slips
//!   away from.
//!
//! Classification is swept over the whole roster (in id order) at turn
//! start, after movement is contested, and at turn end, so other mechanics
//! always read a fresh status off the public surface.

use gridiron::{orthogonally_adjacent, Cell};

use crate::catalog::MechanicId;
use crate::config::EngagementConfig;
use crate::event::BattleEvent;
use crate::phase::{Phase, PhaseContext};
use crate::pipeline::Processor;
use crate::state::BattleState;
use crate::unit::{EngagementState, EngagementStatus, Team, UnitId};

const PHASES: &[Phase] = &[
    Phase::TurnStart,
    Phase::Movement,
    Phase::PreAttack,
    Phase::TurnEnd,
];

/// The enemies of `team` whose zone of control covers `cell`, in id order.
#[must_use]
pub fn zoc_controllers(state: &BattleState, cell: Cell, team: Team) -> Vec<UnitId> {
    state
        .units()
        .filter(|u| u.team != team && u.projects_zoc() && orthogonally_adjacent(u.pos, cell))
        .map(|u| u.id)
        .collect()
}

/// Classifies one cell for a unit of `team`.
#[must_use]
pub fn classify(state: &BattleState, cell: Cell, team: Team) -> EngagementStatus {
    match zoc_controllers(state, cell, team).len() {
        0 => EngagementStatus::Free,
        1 => EngagementStatus::Engaged,
        _ => EngagementStatus::Pinned,
    }
}

/// Processor for the engagement mechanic.
#[derive(Debug)]
pub struct EngagementProcessor {
    config: EngagementConfig,
}

impl EngagementProcessor {
    /// Creates the engagement processor.
    #[must_use]
    pub fn new(config: EngagementConfig) -> Self {
        Self { config }
    }

    /// Recomputes every unit's classification.
    fn sweep(state: &mut BattleState) {
        let classifications: Vec<(UnitId, EngagementStatus)> = state
            .units()
            .map(|u| (u.id, classify(state, u.pos, u.team)))
            .collect();
        for (id, status) in classifications {
            if let Some(unit) = state.unit_mut(id) {
                unit.engagement = Some(EngagementState { status });
            }
        }
    }

    /// Punishes an unpaid withdrawal from zones of control.
    fn attacks_of_opportunity(state: &mut BattleState) {
        let Some(plan) = state.pending_move.clone() else {
            return;
        };
        if plan.paid_disengage || plan.path.is_empty() {
            return;
        }
        let Some(mover) = state.unit(plan.mover) else {
            return;
        };
        let (mover_team, mover_armor) = (mover.team, mover.stats.armor);

        let controllers = zoc_controllers(state, plan.start, mover_team);
        let destination = plan.destination();
        let round = state.round;

        for controller_id in controllers {
            let Some(controller) = state.unit(controller_id) else {
                continue;
            };
            // Still adjacent at the destination: the mover shifted inside
            // the zone rather than leaving it.
            if orthogonally_adjacent(controller.pos, destination) {
                continue;
            }
            #[allow(clippy::cast_possible_truncation)]
            let damage =
                ((f64::from(controller.stats.attack - mover_armor)) * 0.5).floor() as i32;
            let damage = damage.max(1);

            if let Some(mover) = state.unit_mut(plan.mover) {
                let dealt = mover.take_damage(damage);
                let died = !mover.alive;
                state.push_event(BattleEvent::AttackOfOpportunity {
                    round,
                    attacker: controller_id,
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
        }
    }
}

impl Processor for EngagementProcessor {
    fn mechanic(&self) -> MechanicId {
        MechanicId::Engagement
    }

    fn phases(&self) -> &'static [Phase] {
        PHASES
    }

    fn apply(&self, phase: Phase, mut state: BattleState, ctx: &PhaseContext) -> BattleState {
        match phase {
            Phase::TurnStart | Phase::TurnEnd => {
                Self::sweep(&mut state);
                state
            }
            Phase::Movement => {
                Self::attacks_of_opportunity(&mut state);
                Self::sweep(&mut state);
                state
            }
            Phase::PreAttack => {
                let Some(attack) = state.active_attack else {
                    return state;
                };
                if attack.is_cancelled() || attack.attacker != ctx.actor {
                    return state;
                }
                let engaged_archer = state.unit(attack.attacker).is_some_and(|a| {
                    a.role.is_ranged()
                        && a.engagement.is_some_and(|e| e.status.is_engaged())
                });
                if engaged_archer {
                    if let Some(active) = state.active_attack.as_mut() {
                        active.multiplier *= 1.0 - self.config.archer_penalty;
                    }
                }
                state
            }
            Phase::Attack | Phase::PostAttack => state,
        }
    }
}
