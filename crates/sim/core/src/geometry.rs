//! Board geometry: coordinates and cardinal directions.
//!
//! The board is a fixed 8x8 grid. `Coordinate` is a plain integer pair so
//! that off-board destinations can be represented and rejected by the
//! board rather than wrapping or panicking in arithmetic.

use crate::config::BoardConfig;

/// Identifies one of the 64 board squares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether this coordinate lies on the 8x8 board.
    pub const fn in_bounds(self) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < BoardConfig::BOARD_SIZE as i32
            && self.y < BoardConfig::BOARD_SIZE as i32
    }

    /// The coordinate one step in `direction`. May be off-board.
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The coordinate `distance` steps in `direction`. May be off-board.
    pub const fn step_by(self, direction: Direction, distance: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx * distance,
            y: self.y + dy * distance,
        }
    }

    /// The four on-board orthogonal neighbours.
    pub fn neighbours(self) -> impl Iterator<Item = Coordinate> {
        Direction::ALL
            .into_iter()
            .map(move |d| self.step(d))
            .filter(|c| c.in_bounds())
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::ORIGIN
    }
}

/// Cardinal push/shot direction.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::South => (0, -1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }

    /// The mirror direction, used when a queued shot is flipped.
    pub const fn mirror(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }
}
