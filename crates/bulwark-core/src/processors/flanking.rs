//! Flanking processor: arc-based damage multipliers.
//!
//! Reads the arc the facing processor stamped onto the in-flight strike and
//! scales the damage multiplier. Front-arc strikes are untouched.

use crate::catalog::MechanicId;
use crate::config::FlankingConfig;
use crate::phase::{Phase, PhaseContext};
use crate::pipeline::Processor;
use crate::state::BattleState;
use crate::unit::AttackArc;

const PHASES: &[Phase] = &[Phase::PreAttack];

/// Processor for the flanking mechanic.
#[derive(Debug)]
pub struct FlankingProcessor {
    config: FlankingConfig,
}

impl FlankingProcessor {
    /// Creates the flanking processor.
    #[must_use]
    pub fn new(config: FlankingConfig) -> Self {
        Self { config }
    }
}

impl Processor for FlankingProcessor {
    fn mechanic(&self) -> MechanicId {
        MechanicId::Flanking
    }

    fn phases(&self) -> &'static [Phase] {
        PHASES
    }

    fn apply(&self, phase: Phase, mut state: BattleState, _ctx: &PhaseContext) -> BattleState {
        if phase != Phase::PreAttack {
            return state;
        }
        if let Some(attack) = state.active_attack.as_mut() {
            if !attack.is_cancelled() {
                attack.multiplier *= match attack.arc {
                    AttackArc::Front => 1.0,
                    AttackArc::Flank => self.config.flank_multiplier,
                    AttackArc::Rear => self.config.rear_multiplier,
                };
            }
        }
        state
    }
}
