//! Intercept processor: contesting movement along a proposed path.
//!
//! Walks the pending move cell by cell. An enemy whose zone of control
//! covers a path cell intercepts the mover:
//!
//! - **hard** (polearm trait): the mover is halted at that cell, takes
//!   `floor(attack * 1.5)` damage, and loses any built-up momentum (the
//!   charge processor reads the halted flag). The first hard intercept
//!   along the path wins; nothing further along is evaluated.
//! - **soft**: the mover is marked engaged but keeps walking.
//!
//! Controllers of the *starting* cell never intercept: slipping away from
//! them is the engagement processor's attack-of-opportunity business, not
//! an interception.

use crate::catalog::MechanicId;
use crate::event::BattleEvent;
use crate::phase::{Phase, PhaseContext};
use crate::pipeline::Processor;
use crate::processors::engagement::zoc_controllers;
use crate::state::BattleState;
use crate::unit::{EngagementState, EngagementStatus, UnitId, UnitTraits};

const PHASES: &[Phase] = &[Phase::Movement];

/// Processor for the intercept mechanic.
#[derive(Debug, Default)]
pub struct InterceptProcessor;

impl InterceptProcessor {
    /// Creates the intercept processor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Processor for InterceptProcessor {
    fn mechanic(&self) -> MechanicId {
        MechanicId::Intercept
    }

    fn phases(&self) -> &'static [Phase] {
        PHASES
    }

    fn apply(&self, phase: Phase, mut state: BattleState, _ctx: &PhaseContext) -> BattleState {
        if phase != Phase::Movement {
            return state;
        }
        let Some(plan) = state.pending_move.clone() else {
            return state;
        };
        let Some(mover) = state.unit(plan.mover) else {
            return state;
        };
        let mover_team = mover.team;
        let round = state.round;

        let exempt = zoc_controllers(&state, plan.start, mover_team);
        let mut seen: Vec<UnitId> = Vec::new();
        let mut halt_index = None;

        'path: for (index, &cell) in plan.path.iter().enumerate() {
            for interceptor_id in zoc_controllers(&state, cell, mover_team) {
                if exempt.contains(&interceptor_id) || seen.contains(&interceptor_id) {
                    continue;
                }
                seen.push(interceptor_id);

                let Some(interceptor) = state.unit(interceptor_id) else {
                    continue;
                };
                let hard = interceptor.traits.contains(UnitTraits::POLEARM);

                if hard {
                    #[allow(clippy::cast_possible_truncation)]
                    let damage = (f64::from(interceptor.stats.attack) * 1.5).floor() as i32;
                    let mut died = false;
                    let mut dealt = 0;
                    if let Some(mover) = state.unit_mut(plan.mover) {
                        dealt = mover.take_damage(damage);
                        died = !mover.alive;
                    }
                    state.push_event(BattleEvent::Intercepted {
                        round,
                        interceptor: interceptor_id,
                        mover: plan.mover,
                        cell,
                        hard: true,
                        damage: dealt,
                    });
                    if died {
                        state.push_event(BattleEvent::UnitDied {
                            round,
                            unit: plan.mover,
                        });
                    }
                    halt_index = Some(index);
                    break 'path;
                }

                // Soft intercept: mark the mover engaged, keep walking.
                if let Some(mover) = state.unit_mut(plan.mover) {
                    let engagement = mover.engagement.get_or_insert(EngagementState::default());
                    if engagement.status == EngagementStatus::Free {
                        engagement.status = EngagementStatus::Engaged;
                    }
                }
                state.push_event(BattleEvent::Intercepted {
                    round,
                    interceptor: interceptor_id,
                    mover: plan.mover,
                    cell,
                    hard: false,
                    damage: 0,
                });
            }
        }

        if let Some(index) = halt_index {
            if let Some(plan) = state.pending_move.as_mut() {
                plan.halt_at(index);
            }
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron::{Cell, GridMap};

    use crate::state::MovePlan;
    use crate::unit::{Team, Unit};

    fn pikeman(id: u64, team: Team, pos: Cell) -> Unit {
        let mut u = Unit::melee(id, team, pos);
        u.traits |= UnitTraits::POLEARM;
        u
    }

    fn moving_state(units: Vec<Unit>, path: Vec<Cell>) -> BattleState {
        let mut state = BattleState::new(units, GridMap::new(16, 16));
        state.pending_move = Some(MovePlan::new(1.into(), Cell::new(0, 5), path));
        state
    }

    fn walk(state: BattleState) -> BattleState {
        InterceptProcessor::new().apply(Phase::Movement, state, &PhaseContext::new(1.into(), 0))
    }

    #[test]
    fn hard_intercept_halts_and_damages() {
        let mover = Unit::melee(1, Team::Red, Cell::new(0, 5));
        let mut pike = pikeman(2, Team::Blue, Cell::new(3, 6));
        pike.stats.attack = 9;
        let state = moving_state(
            vec![mover, pike],
            (1..=6).map(|x| Cell::new(x, 5)).collect(),
        );

        let state = walk(state);

        let plan = state.pending_move.as_ref().unwrap();
        assert!(plan.halted);
        // Path cut at (3, 5), the first cell inside the pike's zone.
        assert_eq!(plan.destination(), Cell::new(3, 5));
        // floor(9 * 1.5) = 13
        let mover = state.unit(1.into()).unwrap();
        assert_eq!(mover.stats.hp, mover.stats.max_hp - 13);
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, BattleEvent::Intercepted { hard: true, damage: 13, .. })));
    }

    #[test]
    fn first_hard_intercept_wins() {
        let mover = Unit::melee(1, Team::Red, Cell::new(0, 5));
        let near_pike = pikeman(2, Team::Blue, Cell::new(2, 6));
        let far_pike = pikeman(3, Team::Blue, Cell::new(5, 6));
        let state = moving_state(
            vec![mover, near_pike, far_pike],
            (1..=6).map(|x| Cell::new(x, 5)).collect(),
        );

        let state = walk(state);

        let hard_hits = state
            .events
            .iter()
            .filter(|e| matches!(e, BattleEvent::Intercepted { hard: true, .. }))
            .count();
        assert_eq!(hard_hits, 1);
        assert_eq!(
            state.pending_move.as_ref().unwrap().destination(),
            Cell::new(2, 5)
        );
    }

    #[test]
    fn soft_intercept_marks_engaged_without_stopping() {
        let mover = Unit::melee(1, Team::Red, Cell::new(0, 5));
        let swordsman = Unit::melee(2, Team::Blue, Cell::new(3, 6));
        let state = moving_state(
            vec![mover, swordsman],
            (1..=6).map(|x| Cell::new(x, 5)).collect(),
        );

        let state = walk(state);

        let plan = state.pending_move.as_ref().unwrap();
        assert!(!plan.halted);
        assert_eq!(plan.destination(), Cell::new(6, 5));
        assert_eq!(
            state.unit(1.into()).unwrap().engagement.unwrap().status,
            EngagementStatus::Engaged
        );
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, BattleEvent::Intercepted { hard: false, .. })));
    }

    #[test]
    fn each_interceptor_acts_once_per_move() {
        // The swordsman's zone covers two consecutive path cells.
        let mover = Unit::melee(1, Team::Red, Cell::new(0, 5));
        let swordsman = Unit::melee(2, Team::Blue, Cell::new(3, 5));
        let state = moving_state(
            vec![mover, swordsman],
            vec![Cell::new(1, 5), Cell::new(2, 5), Cell::new(2, 4), Cell::new(3, 4)],
        );

        let state = walk(state);

        let soft_hits = state
            .events
            .iter()
            .filter(|e| matches!(e, BattleEvent::Intercepted { hard: false, .. }))
            .count();
        assert_eq!(soft_hits, 1);
    }

    #[test]
    fn controllers_of_the_start_cell_never_intercept() {
        // The pike already controls the mover's start; walking away from it
        // is attack-of-opportunity territory, not an interception.
        let mover = Unit::melee(1, Team::Red, Cell::new(0, 5));
        let pike = pikeman(2, Team::Blue, Cell::new(1, 5));
        let state = moving_state(vec![mover, pike], vec![Cell::new(0, 6), Cell::new(1, 6)]);

        let state = walk(state);

        assert!(state.events.is_empty());
        assert!(!state.pending_move.as_ref().unwrap().halted);
    }

    #[test]
    fn no_pending_move_is_identity() {
        let state = BattleState::new(
            vec![Unit::melee(1, Team::Red, Cell::new(0, 0))],
            GridMap::new(8, 8),
        );
        let out = walk(state.clone());
        assert_eq!(out, state);
    }
}
