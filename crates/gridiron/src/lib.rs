//! # Gridiron
//!
//! Grid geometry substrate for tactical battle simulation.
//!
//! Gridiron provides the spatial primitives that battle mechanics consume but
//! never recompute themselves:
//!
//! - **Cells**: integer grid coordinates (`glam::IVec2`)
//! - **Adjacency**: orthogonal (Manhattan) neighborhoods
//! - **Cardinals**: the four facing directions and arc geometry helpers
//! - **Line of sight**: Bresenham raycasting against a blocker predicate
//! - **Maps**: rectangular bounds plus impassable terrain
//!
//! All operations are pure and deterministic; there is no floating point
//! anywhere in this crate.
//!
//! ## Quick Start
//!
//! ```
//! use gridiron::{manhattan, orthogonal_neighbors, Cell};
//!
//! let a = Cell::new(2, 3);
//! let b = Cell::new(5, 1);
//!
//! assert_eq!(manhattan(a, b), 5);
//! assert_eq!(orthogonal_neighbors(a).len(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod los;
pub mod map;

use serde::{Deserialize, Serialize};

// Re-exports for convenience
pub use los::{line, line_of_sight};
pub use map::GridMap;

/// A grid cell coordinate.
///
/// `+x` runs east, `+y` runs north.
pub type Cell = glam::IVec2;

/// Manhattan distance between two cells.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn manhattan(a: Cell, b: Cell) -> u32 {
    let d = (a - b).abs();
    (d.x + d.y) as u32
}

/// The four orthogonally adjacent cells of `cell`, in cardinal order
/// (north, east, south, west).
///
/// The order is fixed so that callers iterating over neighborhoods behave
/// identically on every platform.
#[must_use]
pub fn orthogonal_neighbors(cell: Cell) -> [Cell; 4] {
    [
        cell + Cardinal::North.offset(),
        cell + Cardinal::East.offset(),
        cell + Cardinal::South.offset(),
        cell + Cardinal::West.offset(),
    ]
}

/// Returns true if `a` and `b` are at Manhattan distance exactly 1.
#[must_use]
pub fn orthogonally_adjacent(a: Cell, b: Cell) -> bool {
    manhattan(a, b) == 1
}

/// One of the four facing directions on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cardinal {
    /// Toward `+y`.
    #[default]
    North,
    /// Toward `+x`.
    East,
    /// Toward `-y`.
    South,
    /// Toward `-x`.
    West,
}

impl Cardinal {
    /// All four cardinals in declaration order.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Unit offset of this cardinal.
    #[must_use]
    pub const fn offset(self) -> Cell {
        match self {
            Self::North => Cell::new(0, 1),
            Self::East => Cell::new(1, 0),
            Self::South => Cell::new(0, -1),
            Self::West => Cell::new(-1, 0),
        }
    }

    /// The opposite cardinal.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// The dominant cardinal pointing from `from` toward `to`.
    ///
    /// Ties between the axes resolve to the horizontal axis so the result is
    /// stable. Returns `None` when the cells coincide.
    #[must_use]
    pub fn toward(from: Cell, to: Cell) -> Option<Self> {
        let d = to - from;
        if d == Cell::ZERO {
            return None;
        }
        if d.x.abs() >= d.y.abs() {
            Some(if d.x >= 0 { Self::East } else { Self::West })
        } else {
            Some(if d.y >= 0 { Self::North } else { Self::South })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_is_symmetric() {
        let a = Cell::new(-2, 7);
        let b = Cell::new(4, -1);
        assert_eq!(manhattan(a, b), manhattan(b, a));
        assert_eq!(manhattan(a, b), 14);
    }

    #[test]
    fn manhattan_zero_for_same_cell() {
        let a = Cell::new(3, 3);
        assert_eq!(manhattan(a, a), 0);
    }

    #[test]
    fn neighbors_are_all_adjacent() {
        let c = Cell::new(10, -4);
        for n in orthogonal_neighbors(c) {
            assert!(orthogonally_adjacent(c, n));
        }
    }

    #[test]
    fn diagonal_is_not_adjacent() {
        assert!(!orthogonally_adjacent(Cell::new(0, 0), Cell::new(1, 1)));
        assert!(!orthogonally_adjacent(Cell::new(0, 0), Cell::new(0, 0)));
    }

    #[test]
    fn cardinal_opposites_round_trip() {
        for c in Cardinal::ALL {
            assert_eq!(c.opposite().opposite(), c);
        }
    }

    #[test]
    fn cardinal_offsets_are_units() {
        for c in Cardinal::ALL {
            assert_eq!(manhattan(Cell::ZERO, c.offset()), 1);
        }
    }

    #[test]
    fn toward_picks_dominant_axis() {
        let origin = Cell::ZERO;
        assert_eq!(Cardinal::toward(origin, Cell::new(5, 2)), Some(Cardinal::East));
        assert_eq!(Cardinal::toward(origin, Cell::new(-1, -4)), Some(Cardinal::South));
        assert_eq!(Cardinal::toward(origin, Cell::new(0, 3)), Some(Cardinal::North));
        assert_eq!(Cardinal::toward(origin, origin), None);
    }

    #[test]
    fn toward_breaks_diagonal_ties_horizontally() {
        assert_eq!(
            Cardinal::toward(Cell::ZERO, Cell::new(3, 3)),
            Some(Cardinal::East)
        );
        assert_eq!(
            Cardinal::toward(Cell::ZERO, Cell::new(-3, 3)),
            Some(Cardinal::West)
        );
    }

    #[test]
    fn cardinal_serialization_roundtrip() {
        for c in Cardinal::ALL {
            let json = serde_json::to_string(&c).unwrap();
            let back: Cardinal = serde_json::from_str(&json).unwrap();
            assert_eq!(c, back);
        }
    }
}
