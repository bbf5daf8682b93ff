//! Riposte processor: counter-attacks against front-arc strikes.
//!
//! Owns [`RiposteState`]. A defender that catches a strike head-on may
//! counter immediately:
//!
//! - only front-arc strikes can be answered; flank and rear strikes
//!   unconditionally forbid it;
//! - the defender must be alive and hold at least one charge this round;
//! - the chance is `base + (defender_init - attacker_init) / threshold * 0.5`,
//!   clamped to [0, 1], with hard overrides: a gap of `+threshold` or more
//!   makes the counter certain, `-threshold` or less makes it impossible;
//! - a successful counter deals `floor(defender_attack * 0.5)` to the
//!   attacker and burns one charge.
//!
//! Charges refill to the pool maximum exactly once per round; a per-unit
//! last-reset marker keeps multiple phase calls within one round from
//! refilling twice.

use crate::catalog::MechanicId;
use crate::config::{ChargePool, RiposteConfig};
use crate::event::BattleEvent;
use crate::phase::{Phase, PhaseContext};
use crate::pipeline::Processor;
use crate::rng;
use crate::state::BattleState;
use crate::unit::{AttackArc, RiposteState, Unit};

const PHASES: &[Phase] = &[Phase::TurnStart, Phase::PostAttack];

const RIPOSTE_SALT: u64 = 0x52_49_50_4f;

/// Processor for the riposte mechanic.
#[derive(Debug)]
pub struct RiposteProcessor {
    config: RiposteConfig,
}

impl RiposteProcessor {
    /// Creates the riposte processor.
    #[must_use]
    pub fn new(config: RiposteConfig) -> Self {
        Self { config }
    }

    /// Pool maximum for one unit under the configured sizing rule.
    fn pool_max(&self, unit: &Unit) -> u32 {
        match self.config.charge_pool {
            ChargePool::Fixed(n) => n,
            ChargePool::AttackCount => unit.attacks_per_turn,
        }
    }

    /// The counter chance for an initiative gap of `defender - attacker`.
    fn chance(&self, initiative_gap: i32) -> f64 {
        let threshold = self.config.guaranteed_threshold;
        if initiative_gap >= threshold {
            return 1.0;
        }
        if initiative_gap <= -threshold {
            return 0.0;
        }
        let scaled = f64::from(initiative_gap) / f64::from(threshold) * 0.5;
        (self.config.base_chance + scaled).clamp(0.0, 1.0)
    }

    /// Refills every unit's charges once per round.
    fn refill(&self, mut state: BattleState) -> BattleState {
        let round = state.round;
        let ids: Vec<_> = state.unit_ids().collect();
        for id in ids {
            let Some(unit) = state.unit(id) else { continue };
            let pool = self.pool_max(unit);
            if let Some(unit) = state.unit_mut(id) {
                let riposte = unit.riposte.get_or_insert(RiposteState::default());
                if riposte.last_reset_round < round {
                    riposte.charges = pool;
                    riposte.last_reset_round = round;
                }
            }
        }
        state
    }

    fn counter(&self, mut state: BattleState, ctx: &PhaseContext) -> BattleState {
        let Some(attack) = state.active_attack else {
            return state;
        };
        if attack.is_cancelled() || attack.damage_dealt == 0 || attack.arc != AttackArc::Front {
            return state;
        }

        let Some(defender) = state.unit(attack.defender) else {
            return state;
        };
        if !defender.alive {
            return state;
        }
        let charges = defender.riposte.map_or(0, |r| r.charges);
        if charges == 0 {
            return state;
        }

        let attacker_initiative = state
            .unit(attack.attacker)
            .map_or(0, |a| a.stats.initiative);
        let gap = defender.stats.initiative - attacker_initiative;
        let chance = self.chance(gap);

        let seed = rng::mix_many(ctx.seed, &[RIPOSTE_SALT, attack.defender.as_u64()]);
        if !rng::roll_under(seed, chance) {
            return state;
        }

        let damage = defender.stats.attack.max(0) / 2;
        let round = state.round;

        if let Some(defender) = state.unit_mut(attack.defender) {
            if let Some(riposte) = defender.riposte.as_mut() {
                riposte.charges = riposte.charges.saturating_sub(1);
            }
        }

        let mut died = false;
        let mut dealt = 0;
        if let Some(attacker) = state.unit_mut(attack.attacker) {
            dealt = attacker.take_damage(damage);
            died = !attacker.alive;
        }
        state.push_event(BattleEvent::RiposteLanded {
            round,
            defender: attack.defender,
            attacker: attack.attacker,
            damage: dealt,
        });
        if died {
            state.push_event(BattleEvent::UnitDied {
                round,
                unit: attack.attacker,
            });
        }
        state
    }
}

impl Processor for RiposteProcessor {
    fn mechanic(&self) -> MechanicId {
        MechanicId::Riposte
    }

    fn phases(&self) -> &'static [Phase] {
        PHASES
    }

    fn apply(&self, phase: Phase, state: BattleState, ctx: &PhaseContext) -> BattleState {
        match phase {
            Phase::TurnStart => self.refill(state),
            Phase::PostAttack => self.counter(state, ctx),
            _ => state,
        }
    }
}
