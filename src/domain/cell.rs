/// Cell kinds and the partially-known cell record.
/// Kind semantics are queried via methods, not stored as flags,
/// so they stay centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellKind {
    Empty,
    Wall,
    Block,
    Goal,
}

impl CellKind {
    /// Can the troll ever occupy a cell of this kind?
    /// (Height rules apply on top; see `GridKnowledge::is_traversable`.)
    pub fn is_enterable(self) -> bool {
        !matches!(self, CellKind::Wall)
    }

    /// Is this a movable block (or stack of blocks)?
    pub fn is_block(self) -> bool {
        matches!(self, CellKind::Block)
    }

    /// Is this the tower / treasure cell?
    pub fn is_goal(self) -> bool {
        matches!(self, CellKind::Goal)
    }
}

/// One cell of the knowledge grid. `height` stays `None` until the cell
/// has been observed at least once.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub kind: CellKind,
    pub height: Option<i32>,
}

impl Default for Cell {
    /// Unobserved cells are walls. The troll must never plan a route
    /// through territory it has not seen.
    fn default() -> Self {
        Cell { kind: CellKind::Wall, height: None }
    }
}
