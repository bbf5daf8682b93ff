//! Shared test setup utilities.

use gridiron::{Cell, GridMap};

use crate::catalog::MechanicId;
use crate::config::{MechanicSetting, Selection};
use crate::unit::{Team, Unit};

/// An open 12x12 battlefield.
pub fn open_map() -> GridMap {
    GridMap::new(12, 12)
}

/// A selection enabling exactly the given mechanics with their defaults.
pub fn enabled(mechanics: &[MechanicId]) -> Selection {
    mechanics
        .iter()
        .map(|&m| (m, MechanicSetting::Enabled))
        .collect()
}

/// Two melee units per side, lined up across the map.
pub fn roster_2v2() -> Vec<Unit> {
    vec![
        Unit::melee(1, Team::Red, Cell::new(1, 4)),
        Unit::melee(2, Team::Red, Cell::new(1, 6)),
        Unit::melee(3, Team::Blue, Cell::new(10, 4)),
        Unit::melee(4, Team::Blue, Cell::new(10, 6)),
    ]
}

/// A mixed roster: melee line plus an archer per side.
pub fn roster_mixed() -> Vec<Unit> {
    vec![
        Unit::melee(1, Team::Red, Cell::new(1, 4)),
        Unit::melee(2, Team::Red, Cell::new(1, 6)),
        Unit::ranged(3, Team::Red, Cell::new(0, 5), 5),
        Unit::melee(4, Team::Blue, Cell::new(10, 4)),
        Unit::melee(5, Team::Blue, Cell::new(10, 6)),
        Unit::ranged(6, Team::Blue, Cell::new(11, 5), 5),
    ]
}

/// Serializes anything serde can reach, for byte-identical comparisons.
pub fn snapshot<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).expect("test value serializes")
}
