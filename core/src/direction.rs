//! Grid coordinates, compass directions and movement restrictions.

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Compass directions available to grid movement.
///
/// Each direction maps to a `(dx, dy)` delta in `{-1, 0, 1}²`, with `dx`
/// advancing columns and `dy` advancing rows. [`Direction::Unknown`] is the
/// zero delta and means "no direction".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// No direction.
    #[default]
    Unknown,
    /// Towards decreasing column indices.
    Left,
    /// Towards increasing column indices.
    Right,
    /// Towards decreasing row indices.
    Up,
    /// Towards increasing row indices.
    Down,
    /// Up and to the left.
    UpLeft,
    /// Up and to the right.
    UpRight,
    /// Down and to the left.
    DownLeft,
    /// Down and to the right.
    DownRight,
}

impl Direction {
    /// All eight movement directions, cardinal directions first.
    pub const ALL: [Direction; 8] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    /// The four cardinal directions.
    pub const CARDINAL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Column/row delta of the direction.
    #[must_use]
    pub const fn delta(self) -> IVec2 {
        match self {
            Direction::Unknown => IVec2::new(0, 0),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::UpLeft => IVec2::new(-1, -1),
            Direction::UpRight => IVec2::new(1, -1),
            Direction::DownLeft => IVec2::new(-1, 1),
            Direction::DownRight => IVec2::new(1, 1),
        }
    }

    /// Direction whose delta has the same signs as the provided components.
    #[must_use]
    pub fn from_delta(dx: i32, dy: i32) -> Self {
        match (dx.signum(), dy.signum()) {
            (-1, 0) => Direction::Left,
            (1, 0) => Direction::Right,
            (0, -1) => Direction::Up,
            (0, 1) => Direction::Down,
            (-1, -1) => Direction::UpLeft,
            (1, -1) => Direction::UpRight,
            (-1, 1) => Direction::DownLeft,
            (1, 1) => Direction::DownRight,
            _ => Direction::Unknown,
        }
    }

    /// Reports whether this is the zero direction.
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Direction::Unknown)
    }

    /// Reports whether both components of the delta are non-zero.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::UpLeft | Direction::UpRight | Direction::DownLeft | Direction::DownRight
        )
    }

    /// Reports whether the direction only moves along columns.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Reports whether the direction only moves along rows.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Unknown => Direction::Unknown,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::UpLeft => Direction::DownRight,
            Direction::UpRight => Direction::DownLeft,
            Direction::DownLeft => Direction::UpRight,
            Direction::DownRight => Direction::UpLeft,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let delta = self.delta();
        write!(f, "{self:?}({}, {})", delta.x, delta.y)
    }
}

/// Limits the directions a grid mover accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRestriction {
    /// All eight directions are accepted.
    #[default]
    None,
    /// No direction is accepted.
    All,
    /// Only left and right are accepted.
    Horizontal,
    /// Only up and down are accepted.
    Vertical,
    /// Only the four diagonal directions are accepted.
    Diagonal,
    /// Only the four cardinal directions are accepted.
    NonDiagonal,
}

impl MoveRestriction {
    /// Reports whether a move in `direction` is allowed under this restriction.
    #[must_use]
    pub const fn permits(self, direction: Direction) -> bool {
        if direction.is_unknown() {
            return false;
        }

        match self {
            MoveRestriction::None => true,
            MoveRestriction::All => false,
            MoveRestriction::Horizontal => direction.is_horizontal(),
            MoveRestriction::Vertical => direction.is_vertical(),
            MoveRestriction::Diagonal => direction.is_diagonal(),
            MoveRestriction::NonDiagonal => !direction.is_diagonal(),
        }
    }

    /// Reports whether diagonal travel is possible, which requires equal
    /// horizontal and vertical speeds.
    #[must_use]
    pub const fn allows_diagonal(self) -> bool {
        matches!(self, MoveRestriction::None | MoveRestriction::Diagonal)
    }
}

/// Row/column position of a tile inside a grid.
///
/// `(-1, -1)` is the sentinel for "no tile".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Index {
    /// Zero-based row.
    pub row: i32,
    /// Zero-based column.
    pub col: i32,
}

impl Index {
    /// Sentinel index that never belongs to a grid.
    pub const INVALID: Index = Index::new(-1, -1);

    /// Creates a new index.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Reports whether this is the sentinel index.
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        self.row == -1 && self.col == -1
    }

    /// Index one step away in `direction`.
    #[must_use]
    pub fn neighbour(self, direction: Direction) -> Self {
        let delta = direction.delta();
        Self::new(self.row + delta.y, self.col + delta.x)
    }

    /// Direction of a single step from `self` to `other`, if they are adjacent.
    #[must_use]
    pub fn direction_to(self, other: Index) -> Direction {
        let dx = other.col - self.col;
        let dy = other.row - self.row;
        if dx.abs() > 1 || dy.abs() > 1 {
            return Direction::Unknown;
        }
        Direction::from_delta(dx, dy)
    }

    /// Number of orthogonal steps between two indices.
    #[must_use]
    pub fn manhattan_distance(self, other: Index) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_round_trip_through_from_delta() {
        for direction in Direction::ALL {
            let delta = direction.delta();
            assert_eq!(Direction::from_delta(delta.x, delta.y), direction);
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }

    #[test]
    fn restrictions_filter_directions() {
        assert!(Direction::ALL
            .iter()
            .all(|direction| MoveRestriction::None.permits(*direction)));
        assert!(!Direction::ALL
            .iter()
            .any(|direction| MoveRestriction::All.permits(*direction)));
        assert!(MoveRestriction::Horizontal.permits(Direction::Left));
        assert!(!MoveRestriction::Horizontal.permits(Direction::Up));
        assert!(MoveRestriction::Vertical.permits(Direction::Down));
        assert!(!MoveRestriction::Vertical.permits(Direction::Right));
        assert!(MoveRestriction::Diagonal.permits(Direction::UpLeft));
        assert!(!MoveRestriction::Diagonal.permits(Direction::Up));
        assert!(MoveRestriction::NonDiagonal.permits(Direction::Up));
        assert!(!MoveRestriction::NonDiagonal.permits(Direction::DownRight));
        assert!(!MoveRestriction::None.permits(Direction::Unknown));
    }

    #[test]
    fn neighbour_follows_column_and_row_axes() {
        let origin = Index::new(1, 1);
        assert_eq!(origin.neighbour(Direction::Right), Index::new(1, 2));
        assert_eq!(origin.neighbour(Direction::Up), Index::new(0, 1));
        assert_eq!(origin.neighbour(Direction::DownLeft), Index::new(2, 0));
        assert_eq!(origin.direction_to(Index::new(1, 2)), Direction::Right);
        assert_eq!(origin.direction_to(Index::new(3, 3)), Direction::Unknown);
    }
}
