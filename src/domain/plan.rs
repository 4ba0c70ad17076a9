/// Staircase geometry around the tower.
///
/// The ring is 6 of the 8 cells surrounding the tower, listed from the cell
/// on the troll's entry side and proceeding around one flank; the two cells
/// at the far end of the cycle are left out. The first element doubles as
/// the final ascent cell. Dropping the tail element per layer tapers each
/// level by one cell, which is exactly the profile the |Δheight| ≤ 1
/// movement rule needs for the troll to climb its own construction.

use super::action::Dir;
use super::map::Pos;

/// The eight cells around the tower in clockwise order (y grows downward),
/// starting from the right-hand neighbor.
const RING_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

fn offset_index(entry: Dir) -> usize {
    match entry {
        Dir::Right => 0,
        Dir::Down => 2,
        Dir::Left => 4,
        Dir::Up => 6,
    }
}

/// Ring of 6 staircase target cells. `entry` is the side of the tower the
/// troll first approached from; the ring starts there so the staircase tops
/// out next to where the troll makes its final step.
pub fn ring_around(tower: Pos, entry: Dir) -> Vec<Pos> {
    let first = offset_index(entry);
    (0..6)
        .map(|i| {
            let (dx, dy) = RING_OFFSETS[(first + i) % 8];
            ((tower.0 as i32 + dx) as usize, (tower.1 as i32 + dy) as usize)
        })
        .collect()
}

/// Shrink the master ring by its tail cell and hand back a fresh working
/// copy for the next layer. Applied once per completed layer; after
/// `ring.len()` applications the ring is empty and construction is done.
pub fn next_layer(ring: &mut Vec<Pos>) -> Vec<Pos> {
    ring.pop();
    ring.clone()
}

/// Cells whose blocks are part of (or under) the staircase and must never
/// be harvested as building material: the tower plus the full ring.
pub fn reserved_cells(tower: Pos, ring: &[Pos]) -> Vec<Pos> {
    let mut cells = Vec::with_capacity(ring.len() + 1);
    cells.push(tower);
    cells.extend_from_slice(ring);
    cells
}

/// Fixed 6-move scouting loop around the tower, keyed by the direction the
/// tower was sighted in. Walking it puts every ring cell's kind and height
/// on the map before the first delivery is planned.
pub fn encircle_moves(toward: Dir) -> [Dir; 6] {
    use Dir::*;
    match toward {
        Down => [Right, Down, Down, Left, Left, Up],
        Up => [Right, Up, Up, Left, Left, Down],
        Left => [Up, Left, Left, Down, Down, Right],
        Right => [Down, Right, Right, Up, Up, Left],
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
