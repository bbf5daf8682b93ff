//! Rectangular battle maps with impassable terrain.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::Cell;

/// A rectangular grid with a set of terrain-blocked cells.
///
/// The map answers bounds and passability questions; it knows nothing about
/// units. Occupancy is the simulation's concern and is passed into queries
/// as a predicate where needed.
///
/// # Note on `HashSet` Usage
///
/// Blocked cells live in a `HashSet` because the map only ever answers
/// membership queries; its iteration order is never observed, so the
/// non-deterministic ordering of `HashSet` cannot leak into simulation
/// state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMap {
    width: i32,
    height: i32,
    blocked: HashSet<Cell>,
}

impl GridMap {
    /// Creates an open map of `width` x `height` cells.
    ///
    /// Valid coordinates run from `(0, 0)` inclusive to
    /// `(width - 1, height - 1)` inclusive.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            blocked: HashSet::new(),
        }
    }

    /// Marks a cell as impassable terrain.
    pub fn block(&mut self, cell: Cell) {
        self.blocked.insert(cell);
    }

    /// Returns true if the cell lies inside the map bounds.
    #[must_use]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    /// Returns true if the cell is terrain-blocked.
    #[must_use]
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.blocked.contains(&cell)
    }

    /// Returns true if the cell can be entered: in bounds and not blocked.
    #[must_use]
    pub fn passable(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && !self.is_blocked(cell)
    }

    /// Map width in cells.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Map height in cells.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }
}
