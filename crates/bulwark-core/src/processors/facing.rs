//! Facing processor: orientation and attack arcs.
//!
//! Owns [`FacingState`]. Provides the arc classification every directional
//! mechanic (flanking, resolve, riposte) reads off the in-flight strike:
//! the processor stamps the arc onto [`ActiveAttack`](crate::state::ActiveAttack)
//! at pre-attack, and turns the actor toward its strike target or direction
//! of travel at turn end.

use gridiron::{Cardinal, Cell};

use crate::catalog::MechanicId;
use crate::phase::{Phase, PhaseContext};
use crate::pipeline::Processor;
use crate::state::BattleState;
use crate::unit::{AttackArc, FacingState, Unit};

const PHASES: &[Phase] = &[Phase::PreAttack, Phase::TurnEnd];

/// Classifies a strike from `attacker_pos` against `defender`.
///
/// The dominant cardinal from the defender toward the attacker is compared
/// with the defender's facing: same cardinal is front, the opposite is
/// rear, anything else is flank. A unit the facing mechanic never touched
/// faces north.
#[must_use]
pub fn attack_arc(defender: &Unit, attacker_pos: Cell) -> AttackArc {
    let Some(toward_attacker) = Cardinal::toward(defender.pos, attacker_pos) else {
        return AttackArc::Front;
    };
    let facing = defender.facing_direction();
    if toward_attacker == facing {
        AttackArc::Front
    } else if toward_attacker == facing.opposite() {
        AttackArc::Rear
    } else {
        AttackArc::Flank
    }
}

/// Processor for the facing mechanic.
#[derive(Debug, Default)]
pub struct FacingProcessor;

impl FacingProcessor {
    /// Creates the facing processor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Processor for FacingProcessor {
    fn mechanic(&self) -> MechanicId {
        MechanicId::Facing
    }

    fn phases(&self) -> &'static [Phase] {
        PHASES
    }

    fn apply(&self, phase: Phase, state: BattleState, ctx: &PhaseContext) -> BattleState {
        match phase {
            Phase::PreAttack => stamp_arc(state),
            Phase::TurnEnd => turn_actor(state, ctx),
            _ => state,
        }
    }
}

fn stamp_arc(mut state: BattleState) -> BattleState {
    let Some(attack) = state.active_attack else {
        return state;
    };
    let (Some(attacker), Some(defender)) =
        (state.unit(attack.attacker), state.unit(attack.defender))
    else {
        return state;
    };

    let arc = attack_arc(defender, attacker.pos);
    if let Some(active) = state.active_attack.as_mut() {
        active.arc = arc;
    }
    state
}

fn turn_actor(mut state: BattleState, ctx: &PhaseContext) -> BattleState {
    // Face the strike target when there was one, else the direction the
    // unit travelled this turn.
    let new_direction = match state.active_attack {
        Some(attack) if attack.attacker == ctx.actor && !attack.is_cancelled() => state
            .unit(ctx.actor)
            .zip(state.unit(attack.defender))
            .and_then(|(actor, defender)| Cardinal::toward(actor.pos, defender.pos)),
        _ => state
            .pending_move
            .as_ref()
            .filter(|plan| plan.mover == ctx.actor)
            .and_then(|plan| Cardinal::toward(plan.start, plan.destination())),
    };

    if let Some(direction) = new_direction {
        if let Some(actor) = state.unit_mut(ctx.actor) {
            actor.facing = Some(FacingState { direction });
        }
    }
    state
}
