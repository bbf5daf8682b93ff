//! Battle state: the value threaded through every processor call.
//!
//! `BattleState` is mutable in spirit but immutable in representation: each
//! processor call takes the state by value and returns a new one, so no call
//! ever aliases or mutates a state another call can still see. Unit storage
//! is a `BTreeMap` so every sweep over the roster runs in id order on every
//! platform.
//!
//! Besides the roster, the state carries two transient exchange records the
//! battle loop opens and closes around a unit turn:
//!
//! - [`ActiveAttack`]: an in-flight strike, adjusted by pre-attack
//!   processors and consumed by post-attack processors.
//! - [`MovePlan`]: a proposed movement path, contested by movement-phase
//!   processors before the loop commits it.

use std::collections::BTreeMap;

use gridiron::{Cell, GridMap};
use serde::{Deserialize, Serialize};

use crate::event::{BattleEvent, CancelReason};
use crate::unit::{AttackArc, Team, Unit, UnitId};

// =============================================================================
// Transient exchange records
// =============================================================================

/// An in-flight strike.
///
/// The battle loop opens one with base values straight off the two units;
/// pre-attack processors adjust the fields; the loop computes and applies
/// the final damage; post-attack processors read `damage_dealt` to react.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveAttack {
    /// The striking unit.
    pub attacker: UnitId,
    /// The struck unit.
    pub defender: UnitId,
    /// Direction class of the strike relative to the defender's facing.
    /// Stays `Front` while the facing mechanic is disabled.
    pub arc: AttackArc,
    /// The attacker's base attack value.
    pub attack: i32,
    /// Flat attack added by mechanics (auras, ...).
    pub attack_bonus: i32,
    /// The armor value the strike runs into; mechanics substitute effective
    /// values here (shred, ward auras, ...).
    pub defender_armor: i32,
    /// Multiplicative damage adjustment (flanking, charge, penalties, ...).
    pub multiplier: f64,
    /// Set when a mechanic called the strike off.
    pub cancelled: Option<CancelReason>,
    /// Hit points actually removed, filled in once the strike lands.
    pub damage_dealt: i32,
}

impl ActiveAttack {
    /// Opens a strike with base values taken from the two units.
    #[must_use]
    pub fn open(attacker: &Unit, defender: &Unit) -> Self {
        Self {
            attacker: attacker.id,
            defender: defender.id,
            arc: AttackArc::Front,
            attack: attacker.stats.attack,
            attack_bonus: 0,
            defender_armor: defender.stats.armor,
            multiplier: 1.0,
            cancelled: None,
            damage_dealt: 0,
        }
    }

    /// True once some mechanic called the strike off.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled.is_some()
    }

    /// The damage this strike resolves to: at least 1, floor of
    /// `(attack + bonus - armor) * multiplier`.
    ///
    /// With no mechanics adjusting anything this is exactly
    /// `max(1, attack - armor)`, the engine-free baseline.
    #[must_use]
    pub fn resolved_damage(&self) -> i32 {
        let raw = f64::from(self.attack + self.attack_bonus - self.defender_armor)
            * self.multiplier;
        #[allow(clippy::cast_possible_truncation)]
        let floored = raw.floor() as i32;
        floored.max(1)
    }
}

/// A proposed movement path for the acting unit.
///
/// `path` holds the cells after the start cell, in walk order. Movement
/// processors may truncate the path (interception) or flag consequences
/// (attacks of opportunity); the battle loop commits whatever survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePlan {
    /// The moving unit.
    pub mover: UnitId,
    /// Cell the move starts from.
    pub start: Cell,
    /// Cells to walk, in order, excluding `start`.
    pub path: Vec<Cell>,
    /// True once an interceptor stopped the mover short.
    pub halted: bool,
    /// True when the mover spent movement allowance to disengage cleanly.
    pub paid_disengage: bool,
}

impl MovePlan {
    /// Proposes walking `path` from `start`.
    #[must_use]
    pub fn new(mover: UnitId, start: Cell, path: Vec<Cell>) -> Self {
        Self {
            mover,
            start,
            path,
            halted: false,
            paid_disengage: false,
        }
    }

    /// Where the mover ends up if the plan is committed as-is.
    #[must_use]
    pub fn destination(&self) -> Cell {
        self.path.last().copied().unwrap_or(self.start)
    }

    /// Cuts the path at `index` (inclusive) and marks the plan halted.
    pub fn halt_at(&mut self, index: usize) {
        self.path.truncate(index + 1);
        self.halted = true;
    }
}

// =============================================================================
// Battle state
// =============================================================================

/// The full snapshot of a battle between phase calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    units: BTreeMap<UnitId, Unit>,
    /// The battlefield.
    pub map: GridMap,
    /// Current round, starting at 1.
    pub round: u32,
    /// Everything that has happened so far.
    pub events: Vec<BattleEvent>,
    /// In-flight strike, if any.
    pub active_attack: Option<ActiveAttack>,
    /// Proposed movement, if any.
    pub pending_move: Option<MovePlan>,
    /// Last round contagion ran its spread step (0 = never). Keeps spread
    /// single-hop per round no matter how many unit turns invoke it.
    pub last_spread_round: u32,
}

impl BattleState {
    /// Builds the initial state from a roster and a map.
    ///
    /// # Panics
    ///
    /// Panics if two units share an id; rosters are built by the caller
    /// once, so a duplicate is a programming error.
    #[must_use]
    pub fn new(units: Vec<Unit>, map: GridMap) -> Self {
        let mut storage = BTreeMap::new();
        for unit in units {
            let id = unit.id;
            assert!(
                storage.insert(id, unit).is_none(),
                "duplicate unit id {id}"
            );
        }
        Self {
            units: storage,
            map,
            round: 1,
            events: Vec::new(),
            active_attack: None,
            pending_move: None,
            last_spread_round: 0,
        }
    }

    /// Looks up a unit by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Looks up a unit mutably by id.
    #[must_use]
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// All units in id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.values()
    }

    /// All units mutably, in id order.
    pub fn units_mut(&mut self) -> impl Iterator<Item = &mut Unit> + '_ {
        self.units.values_mut()
    }

    /// All unit ids in order.
    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.keys().copied()
    }

    /// Number of units on the roster (dead included).
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// The living unit standing on `cell`, if any.
    #[must_use]
    pub fn occupant(&self, cell: Cell) -> Option<UnitId> {
        self.units
            .values()
            .find(|u| u.alive && u.pos == cell)
            .map(|u| u.id)
    }

    /// True when `cell` can be walked into: passable terrain and nobody
    /// (other than `mover` itself) standing on it.
    #[must_use]
    pub fn walkable(&self, cell: Cell, mover: UnitId) -> bool {
        self.map.passable(cell) && self.occupant(cell).is_none_or(|id| id == mover)
    }

    /// Number of units on `team` still able to fight (alive, not routing).
    #[must_use]
    pub fn fighting_strength(&self, team: Team) -> usize {
        self.units
            .values()
            .filter(|u| u.team == team && u.can_act())
            .count()
    }

    /// Appends an event to the log.
    pub fn push_event(&mut self, event: BattleEvent) {
        self.events.push(event);
    }
}
