//! Battle units and their mechanic extension records.
//!
//! A [`Unit`] is a core value (identity, team, base stats, position) plus a
//! composition of small optional extension records, one per mechanic that
//! stores per-unit data. Each extension is owned and written by its
//! mechanic's processor; everything is `pub` because cross-mechanic *reads*
//! go through this public attribute surface. An absent extension (`None`)
//! means "use the mechanic's configured default for this unit".

use std::fmt;

use bitflags::bitflags;
use gridiron::{Cardinal, Cell};
use serde::{Deserialize, Serialize};

// =============================================================================
// Identity
// =============================================================================

/// Unique identifier for a battle unit.
///
/// Ordered by numeric value; unit iteration always runs in id order so that
/// every sweep over the roster is deterministic.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UnitId(u64);

impl UnitId {
    /// Creates a new `UnitId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UnitId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// One of the two sides of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// The red side.
    Red,
    /// The blue side.
    Blue,
}

impl Team {
    /// The opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }
}

/// Faction temperament, deciding how a unit breaks when resolve runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Living troops: break into a rout and flee.
    Mortal,
    /// Undead troops: crumble to dust on the spot.
    Undead,
}

/// How a unit fights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Fights adjacent enemies and projects a zone of control.
    Melee,
    /// Shoots out to `range` cells; never projects a zone of control.
    Ranged {
        /// Maximum shot distance in Manhattan cells.
        range: u32,
    },
}

impl Role {
    /// True for ranged units.
    #[must_use]
    pub const fn is_ranged(self) -> bool {
        matches!(self, Self::Ranged { .. })
    }

    /// Attack reach in Manhattan cells (1 for melee).
    #[must_use]
    pub const fn reach(self) -> u32 {
        match self {
            Self::Melee => 1,
            Self::Ranged { range } => range,
        }
    }

    /// Discriminant equality, ignoring range values.
    ///
    /// Phalanxes form between units of the same kind; a longbow and a
    /// shortbow still count as the same kind.
    #[must_use]
    pub const fn same_kind(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Melee, Self::Melee) | (Self::Ranged { .. }, Self::Ranged { .. })
        )
    }
}

bitflags! {
    /// Innate unit traits consulted by mechanics.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct UnitTraits: u8 {
        /// Set-for-charge weaponry: this unit hard-intercepts movers,
        /// stopping them dead.
        const POLEARM = 1 << 0;
    }
}

/// Base combat statistics shared by every unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    /// Current hit points.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Attack strength.
    pub attack: i32,
    /// Armor value subtracted from incoming strikes.
    pub armor: i32,
    /// Movement allowance in cells per turn.
    pub speed: u32,
    /// Turn-order priority; also drives riposte chances.
    pub initiative: i32,
    /// Evasion chance in [0, 1]. Reserved for ability resolution.
    pub dodge: f64,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            hp: 30,
            max_hp: 30,
            attack: 8,
            armor: 3,
            speed: 3,
            initiative: 10,
            dodge: 0.1,
        }
    }
}

// =============================================================================
// Extension records
// =============================================================================

/// Classification of a strike's direction relative to the defender's facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttackArc {
    /// Attacker stands in the defender's facing direction.
    #[default]
    Front,
    /// Attacker stands to either side.
    Flank,
    /// Attacker stands directly behind.
    Rear,
}

/// Facing extension: which cardinal the unit is oriented toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FacingState {
    /// Current orientation.
    pub direction: Cardinal,
}

/// Terminal-state machine for a unit's morale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResolveStatus {
    /// Fighting normally.
    #[default]
    Steady,
    /// Broken and fleeing; still alive but no longer acting. Terminal.
    Routing,
    /// Collapsed to dust (undead break). Terminal, and the unit is dead.
    Crumbled,
}

/// Resolve (morale) extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveState {
    /// Remaining resolve; the unit breaks when this reaches 0.
    pub value: u32,
    /// Current morale status.
    pub status: ResolveStatus,
}

impl ResolveState {
    /// A steady unit at full resolve.
    #[must_use]
    pub const fn full(max_resolve: u32) -> Self {
        Self {
            value: max_resolve,
            status: ResolveStatus::Steady,
        }
    }

    /// True once the unit has routed or crumbled.
    #[must_use]
    pub const fn is_broken(self) -> bool {
        !matches!(self.status, ResolveStatus::Steady)
    }
}

/// Zone-of-control classification for one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngagementStatus {
    /// No adjacent hostile zone of control.
    #[default]
    Free,
    /// Exactly one adjacent controlling enemy.
    Engaged,
    /// Two or more adjacent controlling enemies.
    Pinned,
}

impl EngagementStatus {
    /// True when at least one enemy controls this unit's cell.
    #[must_use]
    pub const fn is_engaged(self) -> bool {
        !matches!(self, Self::Free)
    }
}

/// Engagement extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngagementState {
    /// Current classification.
    pub status: EngagementStatus,
}

/// Riposte extension: counter-attack charges for the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RiposteState {
    /// Charges remaining this round.
    pub charges: u32,
    /// Round number of the last refill; guards against refilling twice in
    /// the same round across multiple phase calls.
    pub last_reset_round: u32,
}

/// Charge extension: momentum built while moving.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChargeState {
    /// Accumulated momentum, converted to a damage bonus on the next strike.
    pub momentum: f64,
}

/// Armor shred extension: permanent armor damage accumulated this battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShredState {
    /// Armor points shredded so far.
    pub amount: i32,
}

bitflags! {
    /// Status-effect flag set for the contagion mechanic.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct EffectFlags: u8 {
        /// Burning.
        const FIRE = 1 << 0;
        /// Poisoned.
        const POISON = 1 << 1;
        /// Cursed.
        const CURSE = 1 << 2;
        /// Frostbitten; halves movement.
        const FROST = 1 << 3;
        /// Plague-ridden.
        const PLAGUE = 1 << 4;
    }
}

/// One contagious status effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Burning.
    Fire,
    /// Poisoned.
    Poison,
    /// Cursed.
    Curse,
    /// Frostbitten.
    Frost,
    /// Plague-ridden.
    Plague,
}

impl Effect {
    /// Every effect, in spread-evaluation order.
    pub const ALL: [Self; 5] = [
        Self::Fire,
        Self::Poison,
        Self::Curse,
        Self::Frost,
        Self::Plague,
    ];

    /// The flag bit for this effect.
    #[must_use]
    pub const fn flag(self) -> EffectFlags {
        match self {
            Self::Fire => EffectFlags::FIRE,
            Self::Poison => EffectFlags::POISON,
            Self::Curse => EffectFlags::CURSE,
            Self::Frost => EffectFlags::FROST,
            Self::Plague => EffectFlags::PLAGUE,
        }
    }

    /// Hit points lost per turn while carrying this effect.
    ///
    /// Frost inhibits movement instead of damaging.
    #[must_use]
    pub const fn tick_damage(self) -> i32 {
        match self {
            Self::Fire | Self::Plague => 2,
            Self::Poison | Self::Curse => 1,
            Self::Frost => 0,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fire => "fire",
            Self::Poison => "poison",
            Self::Curse => "curse",
            Self::Frost => "frost",
            Self::Plague => "plague",
        };
        f.write_str(name)
    }
}

/// Contagion extension: active afflictions and innate immunities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContagionState {
    /// Effects currently afflicting the unit.
    pub active: EffectFlags,
    /// Effects this unit can never catch.
    pub immune: EffectFlags,
}

/// A passive bonus a unit projects onto nearby allies (itself included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuraKind {
    /// +2 attack to allies in range.
    Valor,
    /// +2 armor to allies in range.
    Ward,
}

impl AuraKind {
    /// Attack granted to allies in range.
    #[must_use]
    pub const fn attack_bonus(self) -> i32 {
        match self {
            Self::Valor => 2,
            Self::Ward => 0,
        }
    }

    /// Armor granted to allies in range.
    #[must_use]
    pub const fn armor_bonus(self) -> i32 {
        match self {
            Self::Valor => 0,
            Self::Ward => 2,
        }
    }
}

/// Aura extension: the auras this unit carries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuraState {
    /// Auras granted by this unit.
    pub granted: Vec<AuraKind>,
}

/// Ammunition extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AmmoState {
    /// Rounds remaining.
    pub remaining: u32,
}

/// Overwatch extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverwatchState {
    /// True while the unit is set to deliver reaction fire.
    pub armed: bool,
}

/// Phalanx extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhalanxState {
    /// True while the unit stands in an active phalanx.
    pub active: bool,
}

// =============================================================================
// Unit
// =============================================================================

/// A battle participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Which side this unit fights for.
    pub team: Team,
    /// Faction temperament.
    pub faction: Faction,
    /// Melee or ranged.
    pub role: Role,
    /// Innate traits.
    pub traits: UnitTraits,
    /// Base statistics.
    pub stats: BaseStats,
    /// Current grid cell.
    pub pos: Cell,
    /// False once the unit is dead.
    pub alive: bool,
    /// Strikes per turn; also the riposte pool when configured to mirror it.
    pub attacks_per_turn: u32,

    // --- Mechanic extensions. Each is owned by its mechanic's processor. ---
    /// Facing extension.
    pub facing: Option<FacingState>,
    /// Resolve extension.
    pub resolve: Option<ResolveState>,
    /// Engagement extension.
    pub engagement: Option<EngagementState>,
    /// Riposte extension.
    pub riposte: Option<RiposteState>,
    /// Charge extension.
    pub charge: Option<ChargeState>,
    /// Armor shred extension.
    pub shred: Option<ShredState>,
    /// Contagion extension.
    pub contagion: Option<ContagionState>,
    /// Aura extension.
    pub aura: Option<AuraState>,
    /// Ammunition extension.
    pub ammo: Option<AmmoState>,
    /// Overwatch extension.
    pub overwatch: Option<OverwatchState>,
    /// Phalanx extension.
    pub phalanx: Option<PhalanxState>,
}

impl Unit {
    /// Creates a unit with default stats and no extensions.
    #[must_use]
    pub fn new(id: UnitId, team: Team, role: Role, pos: Cell) -> Self {
        Self {
            id,
            team,
            faction: Faction::Mortal,
            role,
            traits: UnitTraits::empty(),
            stats: BaseStats::default(),
            pos,
            alive: true,
            attacks_per_turn: 1,
            facing: None,
            resolve: None,
            engagement: None,
            riposte: None,
            charge: None,
            shred: None,
            contagion: None,
            aura: None,
            ammo: None,
            overwatch: None,
            phalanx: None,
        }
    }

    /// Creates a melee unit at `pos`.
    #[must_use]
    pub fn melee(id: u64, team: Team, pos: Cell) -> Self {
        Self::new(UnitId::new(id), team, Role::Melee, pos)
    }

    /// Creates a ranged unit at `pos` shooting out to `range` cells.
    #[must_use]
    pub fn ranged(id: u64, team: Team, pos: Cell, range: u32) -> Self {
        Self::new(UnitId::new(id), team, Role::Ranged { range }, pos)
    }

    /// True while the unit can take actions: alive and not routing.
    #[must_use]
    pub fn can_act(&self) -> bool {
        self.alive && !self.resolve.is_some_and(ResolveState::is_broken)
    }

    /// True if this unit projects a zone of control: a melee-capable unit
    /// that can still fight.
    #[must_use]
    pub fn projects_zoc(&self) -> bool {
        !self.role.is_ranged() && self.can_act()
    }

    /// Facing direction, defaulting to north when the facing mechanic never
    /// materialized state on this unit.
    #[must_use]
    pub fn facing_direction(&self) -> Cardinal {
        self.facing.map_or(Cardinal::North, |f| f.direction)
    }

    /// Applies raw damage, clamping hit points at zero and dropping the
    /// alive flag when they get there. Returns the damage actually dealt.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let dealt = amount.min(self.stats.hp).max(0);
        self.stats.hp -= dealt;
        if self.stats.hp == 0 {
            self.alive = false;
        }
        dealt
    }
}
