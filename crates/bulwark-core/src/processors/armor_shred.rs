//! Armor shred processor: strikes grind armor down over the battle.
//!
//! Owns [`ShredState`]. At pre-attack the defender's armor entering the
//! damage formula is reduced by accumulated shred (never below zero); after
//! a landed strike the defender picks up more shred, capped at a fraction
//! of its base armor.

use crate::catalog::MechanicId;
use crate::config::ArmorShredConfig;
use crate::event::BattleEvent;
use crate::phase::{Phase, PhaseContext};
use crate::pipeline::Processor;
use crate::state::BattleState;
use crate::unit::ShredState;

const PHASES: &[Phase] = &[Phase::PreAttack, Phase::PostAttack];

/// Processor for the armor shred mechanic.
#[derive(Debug)]
pub struct ArmorShredProcessor {
    config: ArmorShredConfig,
}

impl ArmorShredProcessor {
    /// Creates the armor shred processor.
    #[must_use]
    pub fn new(config: ArmorShredConfig) -> Self {
        Self { config }
    }

    /// Cap on total shred for a unit with `base_armor`.
    fn cap(&self, base_armor: i32) -> i32 {
        #[allow(clippy::cast_possible_truncation)]
        let cap = (f64::from(base_armor) * self.config.max_shred_percent).floor() as i32;
        cap.max(0)
    }
}

impl Processor for ArmorShredProcessor {
    fn mechanic(&self) -> MechanicId {
        MechanicId::ArmorShred
    }

    fn phases(&self) -> &'static [Phase] {
        PHASES
    }

    fn apply(&self, phase: Phase, mut state: BattleState, _ctx: &PhaseContext) -> BattleState {
        match phase {
            Phase::PreAttack => {
                let Some(attack) = state.active_attack else {
                    return state;
                };
                let shredded = state
                    .unit(attack.defender)
                    .and_then(|d| d.shred)
                    .map_or(0, |s| s.amount);
                if let Some(active) = state.active_attack.as_mut() {
                    active.defender_armor = (active.defender_armor - shredded).max(0);
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
                let round = state.round;
                let per_hit = self.config.shred_per_hit;
                let mut event = None;
                if let Some(defender) = state.unit_mut(attack.defender) {
                    let cap = self.cap(defender.stats.armor);
                    let shred = defender.shred.get_or_insert(ShredState::default());
                    let next = (shred.amount + per_hit).min(cap);
                    if next > shred.amount {
                        shred.amount = next;
                        event = Some(BattleEvent::ArmorShredded {
                            round,
                            attacker: attack.attacker,
                            defender: attack.defender,
                            total: next,
                        });
                    }
                }
                if let Some(event) = event {
                    state.push_event(event);
                }
                state
            }
            _ => state,
        }
    }
}
