/// GridKnowledge: the troll's partial picture of the maze.
///
/// A dense side×side grid of `Cell` plus a parallel visited grid. The grid
/// is sized generously (side ≈ 2× the largest expected maze dimension, with
/// margin) and the troll starts at its center, so the unknown offset between
/// map coordinates and true maze coordinates can never push an observation
/// out of bounds.
///
/// Unobserved cells read as `Wall` with unknown height; observations
/// overwrite them in place and later observations always win.

use super::action::{Dir, Observation};
use super::cell::{Cell, CellKind};

/// Map coordinate: (x, y), y growing downward.
pub type Pos = (usize, usize);

pub struct GridKnowledge {
    cells: Vec<Vec<Cell>>,
    visited: Vec<Vec<bool>>,
    side: usize,
}

impl GridKnowledge {
    pub fn new(side: usize) -> Self {
        GridKnowledge {
            cells: vec![vec![Cell::default(); side]; side],
            visited: vec![vec![false; side]; side],
            side,
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// The troll's starting coordinate: the grid center.
    pub fn center(&self) -> Pos {
        (self.side / 2, self.side / 2)
    }

    /// Recorded knowledge at (x, y). Out of bounds reads as an unobserved
    /// wall, same as in-bounds cells never seen.
    pub fn cell(&self, (x, y): Pos) -> Cell {
        if x < self.side && y < self.side {
            self.cells[y][x]
        } else {
            Cell::default()
        }
    }

    pub fn is_visited(&self, (x, y): Pos) -> bool {
        x < self.side && y < self.side && self.visited[y][x]
    }

    /// Record that the troll physically occupies `pos`.
    pub fn mark_visited(&mut self, (x, y): Pos) {
        if x < self.side && y < self.side {
            self.visited[y][x] = true;
        }
    }

    /// Fold one sensor record into the grid: the troll's cell plus its four
    /// orthogonal neighbors, overwriting whatever was recorded before.
    pub fn observe(&mut self, pos: Pos, obs: &Observation) {
        self.record(pos, obs.here.kind, obs.here.height);
        for dir in Dir::ALL {
            if let Some(next) = self.neighbor(pos, dir) {
                let view = obs.neighbor(dir);
                self.record(next, view.kind, view.height);
            }
        }
    }

    fn record(&mut self, (x, y): Pos, kind: CellKind, height: i32) {
        if x < self.side && y < self.side {
            self.cells[y][x] = Cell { kind, height: Some(height) };
        }
    }

    /// Bounds-checked single step from `pos`.
    pub fn neighbor(&self, (x, y): Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = x as i32 + dx;
        let ny = y as i32 + dy;
        if nx < 0 || ny < 0 || nx >= self.side as i32 || ny >= self.side as i32 {
            return None;
        }
        Some((nx as usize, ny as usize))
    }

    /// Single point of truth for movement legality: the destination is in
    /// bounds and not a wall, both heights are known, and the step is at
    /// most one unit up or down. Unobserved cells fail both tests.
    pub fn is_traversable(&self, from: Pos, to: Pos) -> bool {
        let (x, y) = to;
        if x >= self.side || y >= self.side {
            return false;
        }
        let dest = self.cells[y][x];
        if !dest.kind.is_enterable() {
            return false;
        }
        match (self.cell(from).height, dest.height) {
            (Some(a), Some(b)) => (a - b).abs() <= 1,
            _ => false,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::CellView;

    fn view(kind: CellKind, height: i32) -> CellView {
        CellView { kind, height }
    }

    fn flat_obs(kind: CellKind) -> Observation {
        Observation {
            here: view(kind, 0),
            up: view(CellKind::Empty, 0),
            down: view(CellKind::Empty, 0),
            left: view(CellKind::Empty, 0),
            right: view(CellKind::Empty, 0),
        }
    }

    #[test]
    fn unobserved_cells_default_to_wall() {
        let map = GridKnowledge::new(9);
        let cell = map.cell((4, 4));
        assert_eq!(cell.kind, CellKind::Wall);
        assert_eq!(cell.height, None);
        // Out of bounds reads the same way.
        assert_eq!(map.cell((99, 99)).kind, CellKind::Wall);
    }

    #[test]
    fn observe_records_all_five_cells() {
        let mut map = GridKnowledge::new(9);
        let obs = Observation {
            here: view(CellKind::Empty, 0),
            up: view(CellKind::Wall, 0),
            down: view(CellKind::Block, 1),
            left: view(CellKind::Goal, 8),
            right: view(CellKind::Empty, 0),
        };
        map.observe((4, 4), &obs);

        assert_eq!(map.cell((4, 4)).kind, CellKind::Empty);
        assert_eq!(map.cell((4, 3)).kind, CellKind::Wall);
        assert_eq!(map.cell((4, 3)).height, Some(0));
        assert_eq!(map.cell((4, 5)).kind, CellKind::Block);
        assert_eq!(map.cell((4, 5)).height, Some(1));
        assert_eq!(map.cell((3, 4)).kind, CellKind::Goal);
        assert_eq!(map.cell((5, 4)).kind, CellKind::Empty);
    }

    #[test]
    fn later_observations_overwrite_earlier_ones() {
        let mut map = GridKnowledge::new(9);
        map.observe((4, 4), &flat_obs(CellKind::Empty));
        assert_eq!(map.cell((4, 4)).height, Some(0));

        // A block was dropped here since we last looked.
        let mut obs = flat_obs(CellKind::Block);
        obs.here.height = 1;
        map.observe((4, 4), &obs);
        assert_eq!(map.cell((4, 4)).kind, CellKind::Block);
        assert_eq!(map.cell((4, 4)).height, Some(1));
    }

    #[test]
    fn traversal_requires_known_heights() {
        let mut map = GridKnowledge::new(9);
        map.observe((4, 4), &flat_obs(CellKind::Empty));
        // (4, 3) is known Empty at height 0; (6, 6) was never observed.
        assert!(map.is_traversable((4, 4), (4, 3)));
        assert!(!map.is_traversable((4, 4), (6, 6)));
    }

    #[test]
    fn traversal_blocks_walls_and_tall_steps() {
        let mut map = GridKnowledge::new(9);
        let obs = Observation {
            here: view(CellKind::Empty, 0),
            up: view(CellKind::Wall, 0),
            down: view(CellKind::Block, 2),
            left: view(CellKind::Block, 1),
            right: view(CellKind::Goal, 1),
        };
        map.observe((4, 4), &obs);

        assert!(!map.is_traversable((4, 4), (4, 3))); // wall
        assert!(!map.is_traversable((4, 4), (4, 5))); // two-block step
        assert!(map.is_traversable((4, 4), (3, 4))); // one-block step
        assert!(map.is_traversable((4, 4), (5, 4))); // goal within reach
    }

    #[test]
    fn visited_tracks_only_marked_cells() {
        let mut map = GridKnowledge::new(9);
        assert!(!map.is_visited((4, 4)));
        map.mark_visited((4, 4));
        assert!(map.is_visited((4, 4)));
        assert!(!map.is_visited((4, 5)));
    }
}
