//! Line-of-sight processor: sight gating for ranged strikes.
//!
//! A ranged strike is called off when terrain or any standing unit blocks
//! the Bresenham line between attacker and defender. Endpoints never block
//! their own line. Melee strikes are untouched.

use gridiron::line_of_sight;

use crate::catalog::MechanicId;
use crate::event::{BattleEvent, CancelReason};
use crate::phase::{Phase, PhaseContext};
use crate::pipeline::Processor;
use crate::state::BattleState;

const PHASES: &[Phase] = &[Phase::PreAttack];

/// Processor for the line-of-sight mechanic.
#[derive(Debug, Default)]
pub struct LineOfSightProcessor;

impl LineOfSightProcessor {
    /// Creates the line-of-sight processor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Processor for LineOfSightProcessor {
    fn mechanic(&self) -> MechanicId {
        MechanicId::LineOfSight
    }

    fn phases(&self) -> &'static [Phase] {
        PHASES
    }

    fn apply(&self, phase: Phase, mut state: BattleState, _ctx: &PhaseContext) -> BattleState {
        if phase != Phase::PreAttack {
            return state;
        }
        let Some(attack) = state.active_attack else {
            return state;
        };
        if attack.is_cancelled() {
            return state;
        }
        let (Some(attacker), Some(defender)) =
            (state.unit(attack.attacker), state.unit(attack.defender))
        else {
            return state;
        };
        if !attacker.role.is_ranged() {
            return state;
        }

        let clear = line_of_sight(attacker.pos, defender.pos, |cell| {
            state.map.is_blocked(cell) || state.occupant(cell).is_some()
        });
        if clear {
            return state;
        }

        let round = state.round;
        if let Some(active) = state.active_attack.as_mut() {
            active.cancelled = Some(CancelReason::NoLineOfSight);
        }
        state.push_event(BattleEvent::StrikeCancelled {
            round,
            attacker: attack.attacker,
            defender: attack.defender,
            reason: CancelReason::NoLineOfSight,
        });
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron::{Cell, GridMap};

    use crate::state::ActiveAttack;
    use crate::unit::{Team, Unit};

    fn shooting_state(units: Vec<Unit>) -> BattleState {
        let mut state = BattleState::new(units, GridMap::new(12, 12));
        state.active_attack = Some(ActiveAttack::open(
            state.unit(1.into()).unwrap(),
            state.unit(2.into()).unwrap(),
        ));
        state
    }

    fn shoot(state: BattleState) -> BattleState {
        LineOfSightProcessor::new().apply(
            Phase::PreAttack,
            state,
            &PhaseContext::with_target(1.into(), 2.into(), 0),
        )
    }

    #[test]
    fn clear_line_lets_the_shot_through() {
        let archer = Unit::ranged(1, Team::Red, Cell::new(0, 5), 6);
        let target = Unit::melee(2, Team::Blue, Cell::new(5, 5));
        let state = shoot(shooting_state(vec![archer, target]));

        assert!(!state.active_attack.unwrap().is_cancelled());
    }

    #[test]
    fn a_standing_unit_blocks_the_shot() {
        let archer = Unit::ranged(1, Team::Red, Cell::new(0, 5), 6);
        let target = Unit::melee(2, Team::Blue, Cell::new(5, 5));
        let wall_of_meat = Unit::melee(3, Team::Blue, Cell::new(3, 5));
        let state = shoot(shooting_state(vec![archer, target, wall_of_meat]));

        let attack = state.active_attack.unwrap();
        assert_eq!(attack.cancelled, Some(CancelReason::NoLineOfSight));
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, BattleEvent::StrikeCancelled { reason: CancelReason::NoLineOfSight, .. })));
    }

    #[test]
    fn terrain_blocks_the_shot() {
        let archer = Unit::ranged(1, Team::Red, Cell::new(0, 5), 6);
        let target = Unit::melee(2, Team::Blue, Cell::new(5, 5));
        let mut state = shooting_state(vec![archer, target]);
        state.map.block(Cell::new(2, 5));

        let state = shoot(state);

        assert!(state.active_attack.unwrap().is_cancelled());
    }

    #[test]
    fn a_dead_unit_does_not_block() {
        let archer = Unit::ranged(1, Team::Red, Cell::new(0, 5), 6);
        let target = Unit::melee(2, Team::Blue, Cell::new(5, 5));
        let mut corpse = Unit::melee(3, Team::Blue, Cell::new(3, 5));
        corpse.alive = false;
        let state = shoot(shooting_state(vec![archer, target, corpse]));

        assert!(!state.active_attack.unwrap().is_cancelled());
    }

    #[test]
    fn melee_strikes_are_never_gated() {
        let fighter = Unit::melee(1, Team::Red, Cell::new(4, 5));
        let target = Unit::melee(2, Team::Blue, Cell::new(5, 5));
        let state = shoot(shooting_state(vec![fighter, target]));

        assert!(!state.active_attack.unwrap().is_cancelled());
    }

    #[test]
    fn adjacent_shots_are_always_clear() {
        let archer = Unit::ranged(1, Team::Red, Cell::new(4, 5), 6);
        let target = Unit::melee(2, Team::Blue, Cell::new(5, 5));
        let state = shoot(shooting_state(vec![archer, target]));

        assert!(!state.active_attack.unwrap().is_cancelled());
    }
}
