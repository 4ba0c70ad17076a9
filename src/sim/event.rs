/// Events emitted while applying an action.
/// The presentation layer consumes these for the status line.

use crate::domain::action::Dir;

#[derive(Clone, Copy, Debug)]
pub enum SimEvent {
    MoveBlocked { dir: Dir },
    BlockPicked { x: usize, y: usize },
    BlockDropped { x: usize, y: usize, height: i32 },
    PickUpFailed,
    DropFailed,
    GoalReached { turn: u32 },
}
