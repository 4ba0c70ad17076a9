/// Actions, directions, and the per-turn sensor record.

use super::cell::CellKind;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// Neighbor enumeration order for every search. Callers may rely on
    /// path lengths being minimal, never on which minimal path wins.
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Left, Dir::Down, Dir::Right];

    /// Grid delta (dx, dy); y grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// One action token per turn. Movement requests a single-cell step;
/// PickUp and Drop act on the troll's current cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move(Dir),
    PickUp,
    Drop,
}

/// What the sensor reports about a single cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CellView {
    pub kind: CellKind,
    pub height: i32,
}

/// Per-turn sensor record: the troll's cell plus its four orthogonal
/// neighbors. Always well-formed by the environment contract.
#[derive(Clone, Copy, Debug)]
pub struct Observation {
    pub here: CellView,
    pub up: CellView,
    pub down: CellView,
    pub left: CellView,
    pub right: CellView,
}

impl Observation {
    pub fn neighbor(&self, dir: Dir) -> CellView {
        match dir {
            Dir::Up => self.up,
            Dir::Down => self.down,
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }
}
