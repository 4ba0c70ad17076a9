/// World: the complete snapshot of a running simulation.
///
/// ## Cell Architecture
///
/// Two cell layers, composed at restart time:
///   - `base_cells` — the maze as loaded. **Never mutated** after load.
///   - `cells`      — the effective ground (base + picked/dropped blocks).
///
/// All cell mutations go through `apply()`; `restart` resets
/// `cells = base_cells.clone()`.
///
/// ## Ground model
///
/// Every cell has a kind and a stack height. Floors are height 0, a block
/// stack of N is height N, the tower is a fixed column of `TOWER_HEIGHT`.
/// A move succeeds when the destination is enterable and the height
/// difference is at most one. Pick up and drop act on the cell underfoot.

use crate::domain::action::{Action, CellView, Dir, Observation};
use crate::domain::cell::CellKind;
use crate::sim::event::SimEvent;

/// Height of the treasure tower. A full staircase tops out one below it.
pub const TOWER_HEIGHT: i32 = 8;

#[derive(Clone, Copy, Debug)]
pub struct GroundCell {
    pub kind: CellKind,
    pub height: i32,
}

impl GroundCell {
    pub const WALL: GroundCell = GroundCell { kind: CellKind::Wall, height: 0 };

    pub fn empty() -> Self {
        GroundCell { kind: CellKind::Empty, height: 0 }
    }
}

pub struct World {
    // ── Cell layers ──
    /// Original maze data. Never mutated after load.
    pub base_cells: Vec<Vec<GroundCell>>,
    /// Effective ground = base + runtime changes.
    pub cells: Vec<Vec<GroundCell>>,
    pub width: usize,
    pub height: usize,

    // ── The troll ──
    pub troll: (usize, usize),
    pub spawn: (usize, usize),
    pub carrying: bool,

    // ── Tracking ──
    pub tower: Option<(usize, usize)>,
    pub turn: u32,
    pub complete: bool,
}

impl World {
    pub fn from_cells(
        cells: Vec<Vec<GroundCell>>,
        spawn: (usize, usize),
        tower: Option<(usize, usize)>,
    ) -> Self {
        let height = cells.len();
        let width = cells.first().map_or(0, |row| row.len());
        World {
            base_cells: cells.clone(),
            cells,
            width,
            height,
            troll: spawn,
            spawn,
            carrying: false,
            tower,
            turn: 0,
            complete: false,
        }
    }

    /// Reset the run: ground to base, troll to spawn, hands empty.
    pub fn restart(&mut self) {
        self.cells = self.base_cells.clone();
        self.troll = self.spawn;
        self.carrying = false;
        self.turn = 0;
        self.complete = false;
    }

    // ── Ground queries ──

    /// Ground at (x, y); out of bounds reads as wall.
    #[inline]
    pub fn cell_at(&self, x: i32, y: i32) -> GroundCell {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize][x as usize]
        } else {
            GroundCell::WALL
        }
    }

    fn view_at(&self, x: i32, y: i32) -> CellView {
        let cell = self.cell_at(x, y);
        CellView { kind: cell.kind, height: cell.height }
    }

    /// What the troll senses this turn: its own cell plus the four
    /// orthogonal neighbors.
    pub fn observe(&self) -> Observation {
        let (x, y) = (self.troll.0 as i32, self.troll.1 as i32);
        Observation {
            here: self.view_at(x, y),
            up: self.view_at(x, y - 1),
            down: self.view_at(x, y + 1),
            left: self.view_at(x - 1, y),
            right: self.view_at(x + 1, y),
        }
    }

    // ── Action resolution ──

    /// Resolve one action against the ground. Illegal actions are rejected
    /// with an event and change nothing.
    pub fn apply(&mut self, action: Action) -> Vec<SimEvent> {
        self.turn += 1;
        match action {
            Action::Move(dir) => self.apply_move(dir),
            Action::PickUp => self.apply_pickup(),
            Action::Drop => self.apply_drop(),
        }
    }

    fn apply_move(&mut self, dir: Dir) -> Vec<SimEvent> {
        let (dx, dy) = dir.delta();
        let (nx, ny) = (self.troll.0 as i32 + dx, self.troll.1 as i32 + dy);
        let from = self.cell_at(self.troll.0 as i32, self.troll.1 as i32);
        let to = self.cell_at(nx, ny);

        if !to.kind.is_enterable() || (from.height - to.height).abs() > 1 {
            return vec![SimEvent::MoveBlocked { dir }];
        }

        self.troll = (nx as usize, ny as usize);
        if to.kind.is_goal() {
            self.complete = true;
            return vec![SimEvent::GoalReached { turn: self.turn }];
        }
        vec![]
    }

    fn apply_pickup(&mut self) -> Vec<SimEvent> {
        let (x, y) = self.troll;
        let cell = &mut self.cells[y][x];
        if self.carrying || !cell.kind.is_block() || cell.height < 1 {
            return vec![SimEvent::PickUpFailed];
        }
        cell.height -= 1;
        if cell.height == 0 {
            cell.kind = CellKind::Empty;
        }
        self.carrying = true;
        vec![SimEvent::BlockPicked { x, y }]
    }

    fn apply_drop(&mut self) -> Vec<SimEvent> {
        let (x, y) = self.troll;
        let cell = &mut self.cells[y][x];
        if !self.carrying || cell.kind.is_goal() {
            return vec![SimEvent::DropFailed];
        }
        cell.height += 1;
        cell.kind = CellKind::Block;
        self.carrying = false;
        vec![SimEvent::BlockDropped { x, y, height: cell.height }]
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
