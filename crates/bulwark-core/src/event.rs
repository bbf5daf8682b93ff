//! Battle event log.
//!
//! Every notable occurrence is appended to the state's event log as a
//! serializable value. The event *sequence* is part of the determinism
//! contract: two runs with the same seed, configuration, and initial state
//! must log byte-identical sequences.

use gridiron::Cell;
use serde::{Deserialize, Serialize};

use crate::unit::{AttackArc, Effect, UnitId};

/// Why a strike was called off before it landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    /// The attacker has no ammunition left.
    NoAmmo,
    /// No sight line to the defender.
    NoLineOfSight,
}

/// One entry in the battle event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleEvent {
    /// A strike resolved and dealt damage.
    StrikeLanded {
        /// Round the strike landed in.
        round: u32,
        /// The striking unit.
        attacker: UnitId,
        /// The struck unit.
        defender: UnitId,
        /// Direction class of the strike.
        arc: AttackArc,
        /// Hit points actually removed.
        damage: i32,
    },
    /// A strike was called off before landing.
    StrikeCancelled {
        /// Round of the attempt.
        round: u32,
        /// The would-be attacker.
        attacker: UnitId,
        /// The intended defender.
        defender: UnitId,
        /// Why the strike was called off.
        reason: CancelReason,
    },
    /// A unit's hit points reached zero.
    UnitDied {
        /// Round of death.
        round: u32,
        /// The unit that died.
        unit: UnitId,
    },
    /// A defender counter-attacked a front-arc strike.
    RiposteLanded {
        /// Round of the counter.
        round: u32,
        /// The counter-attacking defender.
        defender: UnitId,
        /// The original attacker, now struck back.
        attacker: UnitId,
        /// Hit points removed from the attacker.
        damage: i32,
    },
    /// A mortal unit's resolve broke; it is fleeing.
    UnitRouted {
        /// Round of the break.
        round: u32,
        /// The routing unit.
        unit: UnitId,
    },
    /// An undead unit's resolve broke; it collapsed.
    UnitCrumbled {
        /// Round of the break.
        round: u32,
        /// The crumbled unit.
        unit: UnitId,
    },
    /// A controller punished a unit for leaving its zone of control.
    AttackOfOpportunity {
        /// Round of the strike.
        round: u32,
        /// The controlling unit that struck.
        attacker: UnitId,
        /// The unit that tried to slip away.
        mover: UnitId,
        /// Hit points removed.
        damage: i32,
    },
    /// A unit's movement path crossed an interceptor's zone of control.
    Intercepted {
        /// Round of the interception.
        round: u32,
        /// The intercepting unit.
        interceptor: UnitId,
        /// The moving unit.
        mover: UnitId,
        /// Cell where the interception happened.
        cell: Cell,
        /// True for a hard (halting) intercept.
        hard: bool,
        /// Hit points removed (0 for soft intercepts).
        damage: i32,
    },
    /// An armed watcher fired on a unit moving through its field of fire.
    OverwatchShot {
        /// Round of the shot.
        round: u32,
        /// The firing watcher.
        watcher: UnitId,
        /// The moving unit that was hit.
        mover: UnitId,
        /// Hit points removed.
        damage: i32,
    },
    /// A status effect jumped to an adjacent unit.
    ContagionSpread {
        /// Round of the spread.
        round: u32,
        /// The effect that spread.
        effect: Effect,
        /// The already-afflicted source.
        source: UnitId,
        /// The newly afflicted target.
        target: UnitId,
    },
    /// A status effect damaged its carrier.
    ContagionTick {
        /// Round of the tick.
        round: u32,
        /// The afflicted unit.
        unit: UnitId,
        /// The effect that ticked.
        effect: Effect,
        /// Hit points removed.
        damage: i32,
    },
    /// A strike shredded the defender's armor.
    ArmorShredded {
        /// Round of the strike.
        round: u32,
        /// The striking unit.
        attacker: UnitId,
        /// The unit whose armor was shredded.
        defender: UnitId,
        /// Total armor shredded so far.
        total: i32,
    },
    /// A unit locked into phalanx formation.
    PhalanxFormed {
        /// Round the formation locked.
        round: u32,
        /// The unit now in phalanx.
        unit: UnitId,
    },
    /// A ranged unit tried to fire with an empty quiver.
    AmmoExhausted {
        /// Round of the attempt.
        round: u32,
        /// The dry unit.
        unit: UnitId,
    },
}
