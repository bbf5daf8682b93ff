//! Resolve processor: the morale state machine.
//!
//! Owns [`ResolveState`]. Every unit carries a resolve value that
//! regenerates at its own turn start and is chipped away by flank- and
//! rear-arc strikes. At zero the unit breaks, and the break is one-way:
//!
//! - mortal factions rout: the unit stays alive but stops acting;
//! - undead factions crumble: the unit is dead on the spot, hit points
//!   forced to zero.
//!
//! Broken units are skipped by regeneration; there is no rally path.

use crate::catalog::MechanicId;
use crate::config::ResolveConfig;
use crate::event::BattleEvent;
use crate::phase::{Phase, PhaseContext};
use crate::pipeline::Processor;
use crate::state::BattleState;
use crate::unit::{AttackArc, Faction, ResolveState, ResolveStatus};

const PHASES: &[Phase] = &[Phase::TurnStart, Phase::PostAttack];

/// Processor for the resolve mechanic.
#[derive(Debug)]
pub struct ResolveProcessor {
    config: ResolveConfig,
}

impl ResolveProcessor {
    /// Creates the resolve processor.
    #[must_use]
    pub fn new(config: ResolveConfig) -> Self {
        Self { config }
    }

    fn regenerate(&self, mut state: BattleState, ctx: &PhaseContext) -> BattleState {
        let max = self.config.max_resolve;
        let regen = self.config.base_regeneration;
        if let Some(actor) = state.unit_mut(ctx.actor) {
            let resolve = actor.resolve.get_or_insert(ResolveState::full(max));
            if !resolve.is_broken() {
                resolve.value = (resolve.value + regen).min(max);
            }
        }
        state
    }

    fn suffer(&self, mut state: BattleState, _ctx: &PhaseContext) -> BattleState {
        let Some(attack) = state.active_attack else {
            return state;
        };
        if attack.is_cancelled() || attack.damage_dealt == 0 {
            return state;
        }
        let resolve_damage = match attack.arc {
            AttackArc::Front => return state,
            AttackArc::Flank => self.config.flank_damage,
            AttackArc::Rear => self.config.rear_damage,
        };

        let max = self.config.max_resolve;
        let round = state.round;
        let mut broke: Option<Faction> = None;

        if let Some(defender) = state.unit_mut(attack.defender) {
            if !defender.alive {
                return state;
            }
            let resolve = defender.resolve.get_or_insert(ResolveState::full(max));
            if resolve.is_broken() {
                return state;
            }
            resolve.value = resolve.value.saturating_sub(resolve_damage);
            if resolve.value == 0 {
                match defender.faction {
                    Faction::Undead => {
                        resolve.status = ResolveStatus::Crumbled;
                        defender.stats.hp = 0;
                        defender.alive = false;
                    }
                    Faction::Mortal => {
                        resolve.status = ResolveStatus::Routing;
                    }
                }
                broke = Some(defender.faction);
            }
        }

        match broke {
            Some(Faction::Undead) => state.push_event(BattleEvent::UnitCrumbled {
                round,
                unit: attack.defender,
            }),
            Some(Faction::Mortal) => state.push_event(BattleEvent::UnitRouted {
                round,
                unit: attack.defender,
            }),
            None => {}
        }
        state
    }
}

impl Processor for ResolveProcessor {
    fn mechanic(&self) -> MechanicId {
        MechanicId::Resolve
    }

    fn phases(&self) -> &'static [Phase] {
        PHASES
    }

    fn apply(&self, phase: Phase, state: BattleState, ctx: &PhaseContext) -> BattleState {
        match phase {
            Phase::TurnStart => self.regenerate(state, ctx),
            Phase::PostAttack => self.suffer(state, ctx),
            _ => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron::{Cell, GridMap};

    use crate::state::ActiveAttack;
    use crate::unit::{Team, Unit};

    fn processor() -> ResolveProcessor {
        ResolveProcessor::new(ResolveConfig::default())
    }

    fn landed_strike(state: &mut BattleState, arc: AttackArc) {
        let mut attack = ActiveAttack::open(
            state.unit(1.into()).unwrap(),
            state.unit(2.into()).unwrap(),
        );
        attack.arc = arc;
        attack.damage_dealt = 5;
        state.active_attack = Some(attack);
    }

    fn pair(defender_faction: Faction) -> BattleState {
        let attacker = Unit::melee(1, Team::Red, Cell::new(0, 0));
        let mut defender = Unit::melee(2, Team::Blue, Cell::new(1, 0));
        defender.faction = defender_faction;
        BattleState::new(vec![attacker, defender], GridMap::new(8, 8))
    }

    #[test]
    fn regeneration_caps_at_max() {
        let mut state = pair(Faction::Mortal);
        state.unit_mut(1.into()).unwrap().resolve = Some(ResolveState {
            value: 19,
            status: ResolveStatus::Steady,
        });

        let state = processor().apply(Phase::TurnStart, state, &PhaseContext::new(1.into(), 0));

        // 19 + 2 capped at 20.
        assert_eq!(state.unit(1.into()).unwrap().resolve.unwrap().value, 20);
    }

    #[test]
    fn regeneration_materializes_full_resolve() {
        let state = pair(Faction::Mortal);
        let state = processor().apply(Phase::TurnStart, state, &PhaseContext::new(1.into(), 0));
        assert_eq!(state.unit(1.into()).unwrap().resolve.unwrap().value, 20);
    }

    #[test]
    fn broken_units_are_skipped_by_regeneration() {
        let mut state = pair(Faction::Mortal);
        state.unit_mut(1.into()).unwrap().resolve = Some(ResolveState {
            value: 0,
            status: ResolveStatus::Routing,
        });

        let state = processor().apply(Phase::TurnStart, state, &PhaseContext::new(1.into(), 0));

        assert_eq!(state.unit(1.into()).unwrap().resolve.unwrap().value, 0);
    }

    #[test]
    fn front_strikes_cost_no_resolve() {
        let mut state = pair(Faction::Mortal);
        landed_strike(&mut state, AttackArc::Front);

        let ctx = PhaseContext::with_target(1.into(), 2.into(), 0);
        let state = processor().apply(Phase::PostAttack, state, &ctx);

        assert!(state.unit(2.into()).unwrap().resolve.is_none());
    }

    #[test]
    fn flank_and_rear_chip_resolve() {
        let mut state = pair(Faction::Mortal);
        landed_strike(&mut state, AttackArc::Flank);
        let ctx = PhaseContext::with_target(1.into(), 2.into(), 0);
        let state = processor().apply(Phase::PostAttack, state, &ctx);
        // 20 - 6.
        assert_eq!(state.unit(2.into()).unwrap().resolve.unwrap().value, 14);

        let mut state = pair(Faction::Mortal);
        landed_strike(&mut state, AttackArc::Rear);
        let state = processor().apply(Phase::PostAttack, state, &ctx);
        // 20 - 10.
        assert_eq!(state.unit(2.into()).unwrap().resolve.unwrap().value, 10);
    }

    #[test]
    fn mortal_break_routs_but_lives() {
        // Resolve 15, rear strike worth 20: clamps to 0 and breaks.
        let config = ResolveConfig {
            rear_damage: 20,
            ..ResolveConfig::default()
        };
        let mut state = pair(Faction::Mortal);
        state.unit_mut(2.into()).unwrap().resolve = Some(ResolveState {
            value: 15,
            status: ResolveStatus::Steady,
        });
        landed_strike(&mut state, AttackArc::Rear);

        let ctx = PhaseContext::with_target(1.into(), 2.into(), 0);
        let state = ResolveProcessor::new(config).apply(Phase::PostAttack, state, &ctx);

        let defender = state.unit(2.into()).unwrap();
        let resolve = defender.resolve.unwrap();
        assert_eq!(resolve.value, 0);
        assert_eq!(resolve.status, ResolveStatus::Routing);
        assert!(defender.alive);
        assert!(!defender.can_act());
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, BattleEvent::UnitRouted { .. })));
    }

    #[test]
    fn undead_break_crumbles_and_dies() {
        let config = ResolveConfig {
            rear_damage: 20,
            ..ResolveConfig::default()
        };
        let mut state = pair(Faction::Undead);
        state.unit_mut(2.into()).unwrap().resolve = Some(ResolveState {
            value: 15,
            status: ResolveStatus::Steady,
        });
        landed_strike(&mut state, AttackArc::Rear);

        let ctx = PhaseContext::with_target(1.into(), 2.into(), 0);
        let state = ResolveProcessor::new(config).apply(Phase::PostAttack, state, &ctx);

        let defender = state.unit(2.into()).unwrap();
        assert_eq!(defender.resolve.unwrap().status, ResolveStatus::Crumbled);
        assert!(!defender.alive);
        assert_eq!(defender.stats.hp, 0);
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, BattleEvent::UnitCrumbled { .. })));
    }

    #[test]
    fn breaks_are_one_way() {
        let mut state = pair(Faction::Mortal);
        state.unit_mut(2.into()).unwrap().resolve = Some(ResolveState {
            value: 0,
            status: ResolveStatus::Routing,
        });
        landed_strike(&mut state, AttackArc::Rear);

        let ctx = PhaseContext::with_target(1.into(), 2.into(), 0);
        let state = processor().apply(Phase::PostAttack, state, &ctx);

        // Still routing, no second break event.
        assert_eq!(
            state.unit(2.into()).unwrap().resolve.unwrap().status,
            ResolveStatus::Routing
        );
        assert!(state.events.is_empty());
    }

    #[test]
    fn whiffed_strikes_cost_no_resolve() {
        let mut state = pair(Faction::Mortal);
        landed_strike(&mut state, AttackArc::Rear);
        if let Some(a) = state.active_attack.as_mut() {
            a.damage_dealt = 0;
        }

        let ctx = PhaseContext::with_target(1.into(), 2.into(), 0);
        let state = processor().apply(Phase::PostAttack, state, &ctx);

        assert!(state.unit(2.into()).unwrap().resolve.is_none());
    }
}
