//! Battle loop driver.
//!
//! `Battle` wires the whole engine together: it resolves and normalizes the
//! caller's mechanic selection, builds the phase pipeline, seeds per-unit
//! extension records, and then folds rounds of unit turns until one team
//! has nobody left able to fight or the round cutoff lands a draw.
//!
//! The loop owns exactly the base arithmetic a mechanics-free battle would
//! have: greedy movement toward the nearest enemy, target selection by
//! proximity, and the base strike `max(1, attack - armor)`. Everything else
//! happens inside the six pipeline phases wrapped around those actions.
//! With every mechanic disabled the pipeline is empty and the loop *is* the
//! legacy engine; that equivalence is pinned by a test.

use gridiron::{manhattan, orthogonal_neighbors, Cell, GridMap};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{normalize, resolve_dependencies, BattleConfig, Selection};
use crate::error::ConfigError;
use crate::event::BattleEvent;
use crate::phase::{Phase, PhaseContext};
use crate::pipeline::Pipeline;
use crate::rng;
use crate::state::{ActiveAttack, BattleState, MovePlan};
use crate::unit::{
    AmmoState, ChargeState, ContagionState, EffectFlags, EngagementState, FacingState,
    OverwatchState, PhalanxState, ResolveState, RiposteState, ShredState, Team, Unit, UnitId,
};

/// Outcome of a finished battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    /// The winning team, or `None` for a draw.
    pub winner: Option<Team>,
    /// Rounds played.
    pub rounds: u32,
    /// The full event log.
    pub events: Vec<BattleEvent>,
}

/// A configured battle, ready to run.
pub struct Battle {
    state: BattleState,
    pipeline: Pipeline,
    config: BattleConfig,
    seed: u64,
}

impl std::fmt::Debug for Battle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Battle")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("seed", &self.seed)
            .finish()
    }
}

impl Battle {
    /// Sets up a battle from a sparse mechanic selection.
    ///
    /// Resolution, normalization, validation, and pipeline construction all
    /// happen here; a battle that constructs successfully cannot fail
    /// later.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] raised by the configuration pipeline or the
    /// processor table.
    pub fn new(
        selection: &Selection,
        units: Vec<Unit>,
        map: GridMap,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let resolved = resolve_dependencies(selection);
        let config = normalize(&resolved)?;
        let pipeline = Pipeline::from_config(&config)?;

        let mut state = BattleState::new(units, map);
        seed_extensions(&mut state, &config);

        debug!(
            units = state.unit_count(),
            mechanics = pipeline.len(),
            seed,
            "battle set up"
        );
        Ok(Self {
            state,
            pipeline,
            config,
            seed,
        })
    }

    /// The current battle state.
    #[must_use]
    pub fn state(&self) -> &BattleState {
        &self.state
    }

    /// The normalized configuration this battle runs under.
    #[must_use]
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Runs rounds until one team cannot fight or `max_rounds` is reached.
    ///
    /// The winner is the last team with units able to fight (alive and not
    /// routing); mutual annihilation and hitting the cutoff are draws.
    pub fn run(&mut self, max_rounds: u32) -> BattleReport {
        for round in 1..=max_rounds {
            self.state.round = round;
            debug!(round, "round begins");

            for actor in self.turn_order() {
                if !self.can_act(actor) {
                    continue;
                }
                self.take_turn(actor);
                if self.decided() {
                    return self.report(round);
                }
            }
        }
        self.report(max_rounds)
    }

    /// Living, acting units in initiative order (descending, id ascending
    /// on ties), snapshotted at the start of the round.
    fn turn_order(&self) -> Vec<UnitId> {
        let mut order: Vec<(i32, UnitId)> = self
            .state
            .units()
            .filter(|u| u.can_act())
            .map(|u| (u.stats.initiative, u.id))
            .collect();
        order.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        order.into_iter().map(|(_, id)| id).collect()
    }

    fn can_act(&self, id: UnitId) -> bool {
        self.state.unit(id).is_some_and(Unit::can_act)
    }

    fn decided(&self) -> bool {
        self.state.fighting_strength(Team::Red) == 0
            || self.state.fighting_strength(Team::Blue) == 0
    }

    fn winner(&self) -> Option<Team> {
        match (
            self.state.fighting_strength(Team::Red),
            self.state.fighting_strength(Team::Blue),
        ) {
            (0, 0) => None,
            (_, 0) => Some(Team::Red),
            (0, _) => Some(Team::Blue),
            _ => None,
        }
    }

    fn report(&self, rounds: u32) -> BattleReport {
        BattleReport {
            winner: self.winner(),
            rounds,
            events: self.state.events.clone(),
        }
    }

    /// One unit turn: all six phases in order, wrapped around the loop's
    /// own move commit and strike application.
    fn take_turn(&mut self, actor: UnitId) {
        self.run_phase(Phase::TurnStart, actor, None);

        if self.can_act(actor) {
            if let Some(plan) = self.plan_move(actor) {
                self.state.pending_move = Some(plan);
            }
        }
        self.run_phase(Phase::Movement, actor, None);
        self.commit_move();

        let target = if self.can_act(actor) {
            self.choose_target(actor)
        } else {
            None
        };
        if let Some(target_id) = target {
            if let (Some(attacker), Some(defender)) =
                (self.state.unit(actor), self.state.unit(target_id))
            {
                self.state.active_attack = Some(ActiveAttack::open(attacker, defender));
            }
        }
        self.run_phase(Phase::PreAttack, actor, target);
        self.run_phase(Phase::Attack, actor, target);
        self.apply_strike();
        self.run_phase(Phase::PostAttack, actor, target);

        self.run_phase(Phase::TurnEnd, actor, None);

        self.state.active_attack = None;
        self.state.pending_move = None;
    }

    fn run_phase(&mut self, phase: Phase, actor: UnitId, target: Option<UnitId>) {
        let seed = rng::mix_many(
            self.seed,
            &[
                u64::from(self.state.round),
                actor.as_u64(),
                phase.index() as u64,
            ],
        );
        let ctx = match target {
            Some(target) => PhaseContext::with_target(actor, target, seed),
            None => PhaseContext::new(actor, seed),
        };
        let state = std::mem::replace(&mut self.state, BattleState::new(Vec::new(), GridMap::default()));
        self.state = self.pipeline.run(phase, state, &ctx);
    }

    /// Greedy step path toward the nearest enemy, bounded by movement
    /// allowance. Frost halves the allowance; an engaged unit pays the
    /// disengage cost out of it when it can afford to.
    fn plan_move(&self, actor: UnitId) -> Option<MovePlan> {
        let unit = self.state.unit(actor)?;
        let target_pos = self.nearest_enemy(unit).map(|e| e.pos)?;
        let reach = unit.role.reach();
        if manhattan(unit.pos, target_pos) <= reach {
            return None;
        }

        let mut allowance = unit.stats.speed;
        let frostbitten = self.config.contagion.is_some()
            && unit
                .contagion
                .is_some_and(|c| c.active.contains(EffectFlags::FROST));
        if frostbitten {
            allowance /= 2;
        }

        let mut paid_disengage = false;
        if let Some(engagement_config) = &self.config.engagement {
            let engaged = unit.engagement.is_some_and(|e| e.status.is_engaged());
            if engaged && allowance > engagement_config.disengage_cost {
                allowance -= engagement_config.disengage_cost;
                paid_disengage = true;
            }
        }

        let mut path: Vec<Cell> = Vec::new();
        let mut current = unit.pos;
        for _ in 0..allowance {
            if manhattan(current, target_pos) <= reach {
                break;
            }
            let step = orthogonal_neighbors(current).into_iter().find(|&next| {
                manhattan(next, target_pos) < manhattan(current, target_pos)
                    && self.state.walkable(next, actor)
            });
            match step {
                Some(next) => {
                    path.push(next);
                    current = next;
                }
                None => break,
            }
        }

        if path.is_empty() {
            return None;
        }
        let mut plan = MovePlan::new(actor, unit.pos, path);
        plan.paid_disengage = paid_disengage;
        Some(plan)
    }

    fn nearest_enemy<'a>(&'a self, unit: &Unit) -> Option<&'a Unit> {
        self.state
            .units()
            .filter(|u| u.team != unit.team && u.alive)
            .min_by_key(|u| (manhattan(unit.pos, u.pos), u.id))
    }

    fn commit_move(&mut self) {
        let Some(plan) = self.state.pending_move.clone() else {
            return;
        };
        let destination = plan.destination();
        if let Some(mover) = self.state.unit_mut(plan.mover) {
            if mover.alive {
                mover.pos = destination;
            }
        }
    }

    fn choose_target(&self, actor: UnitId) -> Option<UnitId> {
        let unit = self.state.unit(actor)?;
        let reach = unit.role.reach();
        self.state
            .units()
            .filter(|u| u.team != unit.team && u.alive && manhattan(unit.pos, u.pos) <= reach)
            .min_by_key(|u| (manhattan(unit.pos, u.pos), u.id))
            .map(|u| u.id)
    }

    /// Lands the in-flight strike: the one piece of combat arithmetic the
    /// loop owns.
    fn apply_strike(&mut self) {
        let Some(attack) = self.state.active_attack else {
            return;
        };
        if attack.is_cancelled() {
            return;
        }
        let damage = attack.resolved_damage();
        let round = self.state.round;

        let mut dealt = 0;
        let mut died = false;
        if let Some(defender) = self.state.unit_mut(attack.defender) {
            if !defender.alive {
                return;
            }
            dealt = defender.take_damage(damage);
            died = !defender.alive;
        }
        if let Some(active) = self.state.active_attack.as_mut() {
            active.damage_dealt = dealt;
        }
        self.state.push_event(BattleEvent::StrikeLanded {
            round,
            attacker: attack.attacker,
            defender: attack.defender,
            arc: attack.arc,
            damage: dealt,
        });
        if died {
            self.state.push_event(BattleEvent::UnitDied {
                round,
                unit: attack.defender,
            });
        }
    }
}

/// Materializes extension records for every enabled mechanic, so that
/// serialized states are identical from round one onward and processors
/// mostly read `Some`. Caller-supplied values (afflictions, auras, traits)
/// are never overwritten; materialization only fills gaps.
fn seed_extensions(state: &mut BattleState, config: &BattleConfig) {
    let resolve_max = config.resolve.map(|c| c.max_resolve);
    let ammo_capacity = config.ammunition.map(|c| c.capacity);

    for unit in state.units_mut() {
        if config.facing {
            unit.facing.get_or_insert(FacingState::default());
        }
        if let Some(max) = resolve_max {
            unit.resolve.get_or_insert(ResolveState::full(max));
        }
        if config.engagement.is_some() {
            unit.engagement.get_or_insert(EngagementState::default());
        }
        if config.riposte.is_some() {
            unit.riposte.get_or_insert(RiposteState::default());
        }
        if config.charge.is_some() {
            unit.charge.get_or_insert(ChargeState::default());
        }
        if config.armor_shred.is_some() {
            unit.shred.get_or_insert(ShredState::default());
        }
        if config.contagion.is_some() {
            unit.contagion.get_or_insert(ContagionState::default());
        }
        if config.phalanx.is_some() {
            unit.phalanx.get_or_insert(PhalanxState::default());
        }
        if unit.role.is_ranged() {
            if let Some(capacity) = ammo_capacity {
                unit.ammo.get_or_insert(AmmoState {
                    remaining: capacity,
                });
            }
            if config.overwatch {
                unit.overwatch.get_or_insert(OverwatchState::default());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::unit::Faction;

    fn skirmish_roster() -> Vec<Unit> {
        vec![
            Unit::melee(1, Team::Red, Cell::new(1, 4)),
            Unit::melee(2, Team::Red, Cell::new(1, 5)),
            Unit::melee(3, Team::Blue, Cell::new(8, 4)),
            Unit::melee(4, Team::Blue, Cell::new(8, 5)),
        ]
    }

    #[test]
    fn legacy_battle_runs_to_a_decision() {
        let mut battle = Battle::new(
            &Preset::Legacy.selection(),
            skirmish_roster(),
            GridMap::new(10, 10),
            42,
        )
        .unwrap();

        let report = battle.run(100);

        assert!(report.winner.is_some() || report.rounds == 100);
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, BattleEvent::StrikeLanded { .. })));
    }

    #[test]
    fn full_battle_runs_to_a_decision() {
        let mut battle = Battle::new(
            &Preset::Full.selection(),
            skirmish_roster(),
            GridMap::new(10, 10),
            42,
        )
        .unwrap();

        let report = battle.run(100);
        assert!(report.rounds <= 100);
    }

    #[test]
    fn uneven_odds_favor_the_bigger_team() {
        let units = vec![
            Unit::melee(1, Team::Red, Cell::new(1, 4)),
            Unit::melee(2, Team::Red, Cell::new(1, 5)),
            Unit::melee(3, Team::Red, Cell::new(1, 6)),
            Unit::melee(4, Team::Blue, Cell::new(8, 5)),
        ];
        let mut battle =
            Battle::new(&Preset::Legacy.selection(), units, GridMap::new(10, 10), 7).unwrap();

        let report = battle.run(100);

        assert_eq!(report.winner, Some(Team::Red));
    }

    #[test]
    fn extension_records_are_seeded_for_enabled_mechanics() {
        let battle = Battle::new(
            &Preset::Full.selection(),
            vec![
                Unit::melee(1, Team::Red, Cell::new(0, 0)),
                Unit::ranged(2, Team::Blue, Cell::new(5, 5), 4),
            ],
            GridMap::new(10, 10),
            1,
        )
        .unwrap();

        let melee = battle.state().unit(1.into()).unwrap();
        assert!(melee.facing.is_some());
        assert!(melee.resolve.is_some());
        assert!(melee.riposte.is_some());
        assert!(melee.ammo.is_none());
        assert!(melee.overwatch.is_none());

        let archer = battle.state().unit(2.into()).unwrap();
        assert_eq!(archer.ammo.unwrap().remaining, 12);
        assert!(archer.overwatch.is_some());
    }

    #[test]
    fn legacy_leaves_units_bare() {
        let battle = Battle::new(
            &Preset::Legacy.selection(),
            vec![Unit::melee(1, Team::Red, Cell::new(0, 0))],
            GridMap::new(10, 10),
            1,
        )
        .unwrap();

        let unit = battle.state().unit(1.into()).unwrap();
        assert!(unit.facing.is_none());
        assert!(unit.resolve.is_none());
        assert!(unit.engagement.is_none());
    }

    #[test]
    fn routing_units_stop_acting_and_cost_their_team_the_battle() {
        // A lone mortal defender whose resolve is already broken: blue has
        // no one able to fight, red wins without swinging.
        let mut routed = Unit::melee(2, Team::Blue, Cell::new(5, 5));
        routed.resolve = Some(ResolveState {
            value: 0,
            status: crate::unit::ResolveStatus::Routing,
        });
        let units = vec![Unit::melee(1, Team::Red, Cell::new(0, 0)), routed];

        let mut battle =
            Battle::new(&Preset::Full.selection(), units, GridMap::new(10, 10), 3).unwrap();
        let report = battle.run(10);

        assert_eq!(report.winner, Some(Team::Red));
    }

    #[test]
    fn undead_factions_field_crumbling_troops() {
        let mut skeleton = Unit::melee(2, Team::Blue, Cell::new(1, 1));
        skeleton.faction = Faction::Undead;
        let units = vec![Unit::melee(1, Team::Red, Cell::new(0, 1)), skeleton];

        let mut battle =
            Battle::new(&Preset::Full.selection(), units, GridMap::new(10, 10), 11).unwrap();
        let report = battle.run(50);

        // One of the two dies eventually; the battle must decide.
        assert!(report.winner.is_some());
    }

    #[test]
    fn round_cutoff_is_a_draw() {
        // Two archers out of range with no ammo to ever hurt each other is
        // overkill; simply use a huge map and speed 0 so nobody closes in.
        let mut a = Unit::melee(1, Team::Red, Cell::new(0, 0));
        a.stats.speed = 0;
        let mut b = Unit::melee(2, Team::Blue, Cell::new(9, 9));
        b.stats.speed = 0;

        let mut battle =
            Battle::new(&Preset::Legacy.selection(), vec![a, b], GridMap::new(10, 10), 5).unwrap();
        let report = battle.run(20);

        assert_eq!(report.winner, None);
        assert_eq!(report.rounds, 20);
    }
}
