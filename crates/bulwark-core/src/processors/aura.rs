//! Aura processor: stat bonuses projected onto nearby allies.
//!
//! Owns [`AuraState`](crate::unit::AuraState). A unit carrying auras
//! projects them to every ally within the configured Manhattan radius, the
//! bearer included: valor lifts attack, ward lifts armor. Both sides of an
//! imminent strike collect their bonuses at pre-attack.

use gridiron::manhattan;

use crate::catalog::MechanicId;
use crate::config::AuraConfig;
use crate::phase::{Phase, PhaseContext};
use crate::pipeline::Processor;
use crate::state::BattleState;
use crate::unit::{Unit, UnitId};

const PHASES: &[Phase] = &[Phase::PreAttack];

/// Processor for the aura mechanic.
#[derive(Debug)]
pub struct AuraProcessor {
    config: AuraConfig,
}

impl AuraProcessor {
    /// Creates the aura processor.
    #[must_use]
    pub fn new(config: AuraConfig) -> Self {
        Self { config }
    }

    /// Summed (attack, armor) bonuses reaching `beneficiary`.
    fn bonuses_for(&self, state: &BattleState, beneficiary: &Unit) -> (i32, i32) {
        let mut attack = 0;
        let mut armor = 0;
        for bearer in state.units() {
            if bearer.team != beneficiary.team || !bearer.alive {
                continue;
            }
            let Some(aura) = &bearer.aura else { continue };
            if manhattan(bearer.pos, beneficiary.pos) > self.config.radius {
                continue;
            }
            for kind in &aura.granted {
                attack += kind.attack_bonus();
                armor += kind.armor_bonus();
            }
        }
        (attack, armor)
    }

    fn unit_bonuses(&self, state: &BattleState, id: UnitId) -> (i32, i32) {
        state
            .unit(id)
            .map_or((0, 0), |u| self.bonuses_for(state, u))
    }
}

impl Processor for AuraProcessor {
    fn mechanic(&self) -> MechanicId {
        MechanicId::Aura
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

        let (attacker_bonus, _) = self.unit_bonuses(&state, attack.attacker);
        let (_, defender_armor_bonus) = self.unit_bonuses(&state, attack.defender);

        if let Some(active) = state.active_attack.as_mut() {
            active.attack_bonus += attacker_bonus;
            active.defender_armor += defender_armor_bonus;
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron::{Cell, GridMap};

    use crate::state::ActiveAttack;
    use crate::unit::{AuraKind, AuraState, Team};

    fn processor() -> AuraProcessor {
        AuraProcessor::new(AuraConfig { radius: 2 })
    }

    fn banner_bearer(id: u64, team: Team, pos: Cell, kinds: Vec<AuraKind>) -> Unit {
        let mut u = Unit::melee(id, team, pos);
        u.aura = Some(AuraState { granted: kinds });
        u
    }

    fn strike(state: &mut BattleState, attacker: u64, defender: u64) {
        state.active_attack = Some(ActiveAttack::open(
            state.unit(attacker.into()).unwrap(),
            state.unit(defender.into()).unwrap(),
        ));
    }

    #[test]
    fn valor_lifts_the_attacker() {
        let attacker = Unit::melee(1, Team::Red, Cell::new(5, 5));
        let banner = banner_bearer(2, Team::Red, Cell::new(6, 5), vec![AuraKind::Valor]);
        let defender = Unit::melee(3, Team::Blue, Cell::new(4, 5));
        let mut state = BattleState::new(vec![attacker, banner, defender], GridMap::new(12, 12));
        strike(&mut state, 1, 3);

        let ctx = PhaseContext::with_target(1.into(), 3.into(), 0);
        let state = processor().apply(Phase::PreAttack, state, &ctx);

        assert_eq!(state.active_attack.unwrap().attack_bonus, 2);
    }

    #[test]
    fn ward_lifts_the_defender() {
        let attacker = Unit::melee(1, Team::Red, Cell::new(5, 5));
        let defender = Unit::melee(2, Team::Blue, Cell::new(4, 5));
        let banner = banner_bearer(3, Team::Blue, Cell::new(3, 5), vec![AuraKind::Ward]);
        let mut state = BattleState::new(vec![attacker, defender, banner], GridMap::new(12, 12));
        let base_armor = state.unit(2.into()).unwrap().stats.armor;
        strike(&mut state, 1, 2);

        let ctx = PhaseContext::with_target(1.into(), 2.into(), 0);
        let state = processor().apply(Phase::PreAttack, state, &ctx);

        assert_eq!(
            state.active_attack.unwrap().defender_armor,
            base_armor + 2
        );
    }

    #[test]
    fn bearers_benefit_from_their_own_auras() {
        let bearer = banner_bearer(1, Team::Red, Cell::new(5, 5), vec![AuraKind::Valor]);
        let defender = Unit::melee(2, Team::Blue, Cell::new(4, 5));
        let mut state = BattleState::new(vec![bearer, defender], GridMap::new(12, 12));
        strike(&mut state, 1, 2);

        let ctx = PhaseContext::with_target(1.into(), 2.into(), 0);
        let state = processor().apply(Phase::PreAttack, state, &ctx);

        assert_eq!(state.active_attack.unwrap().attack_bonus, 2);
    }

    #[test]
    fn out_of_radius_and_enemy_auras_do_not_reach() {
        let attacker = Unit::melee(1, Team::Red, Cell::new(5, 5));
        let far_banner = banner_bearer(2, Team::Red, Cell::new(9, 5), vec![AuraKind::Valor]);
        let enemy_banner = banner_bearer(3, Team::Blue, Cell::new(6, 5), vec![AuraKind::Valor]);
        let defender = Unit::melee(4, Team::Blue, Cell::new(4, 5));
        let mut state = BattleState::new(
            vec![attacker, far_banner, enemy_banner, defender],
            GridMap::new(12, 12),
        );
        strike(&mut state, 1, 4);

        let ctx = PhaseContext::with_target(1.into(), 4.into(), 0);
        let state = processor().apply(Phase::PreAttack, state, &ctx);

        assert_eq!(state.active_attack.unwrap().attack_bonus, 0);
    }

    #[test]
    fn stacked_auras_sum() {
        let attacker = Unit::melee(1, Team::Red, Cell::new(5, 5));
        let left = banner_bearer(2, Team::Red, Cell::new(4, 5), vec![AuraKind::Valor]);
        let right = banner_bearer(
            3,
            Team::Red,
            Cell::new(6, 5),
            vec![AuraKind::Valor, AuraKind::Ward],
        );
        let defender = Unit::melee(4, Team::Blue, Cell::new(5, 4));
        let mut state =
            BattleState::new(vec![attacker, left, right, defender], GridMap::new(12, 12));
        strike(&mut state, 1, 4);

        let ctx = PhaseContext::with_target(1.into(), 4.into(), 0);
        let state = processor().apply(Phase::PreAttack, state, &ctx);

        assert_eq!(state.active_attack.unwrap().attack_bonus, 4);
    }

    #[test]
    fn inert_phases_are_identity() {
        let state = BattleState::new(
            vec![Unit::melee(1, Team::Red, Cell::new(0, 0))],
            GridMap::new(8, 8),
        );
        let ctx = PhaseContext::new(1.into(), 0);
        for phase in [
            Phase::TurnStart,
            Phase::Movement,
            Phase::Attack,
            Phase::PostAttack,
            Phase::TurnEnd,
        ] {
            let out = processor().apply(phase, state.clone(), &ctx);
            assert_eq!(out, state);
        }
    }
}
