/// BFS pathfinding over the knowledge grid.
///
/// Three passes share the one traversal-legality rule
/// (`GridKnowledge::is_traversable`):
///   1. `shortest_path` — exact shortest move sequence between two cells.
///   2. `nearest_unvisited` — first reachable cell the troll never stood on.
///   3. `nearest_free_block` — first reachable spare block outside the
///      excluded set (cells committed to the staircase).
///
/// The grid is unweighted, so breadth-first order gives minimal move
/// counts. Each search keeps its own visited set, independent of the global
/// visited record. Three separate loops instead of one generalized search
/// keep each predicate auditable on its own.

use std::collections::VecDeque;

use super::action::{Action, Dir};
use super::map::{GridKnowledge, Pos};

/// Shortest legal move sequence from `start` to `goal`.
/// Empty when `goal` is unreachable with current knowledge, or when
/// `start == goal`. Callers treat empty-as-unreachable as "retry next turn
/// with a fresher map", never as an error.
pub fn shortest_path(map: &GridKnowledge, start: Pos, goal: Pos) -> Vec<Action> {
    let side = map.side();
    let mut seen = vec![vec![false; side]; side];
    // Predecessor cell and the move that left it, for path reconstruction.
    let mut parent: Vec<Vec<Option<(Pos, Dir)>>> = vec![vec![None; side]; side];
    let mut queue: VecDeque<Pos> = VecDeque::with_capacity(64);

    seen[start.1][start.0] = true;
    queue.push_back(start);

    while let Some(cur) = queue.pop_front() {
        if cur == goal {
            return reconstruct(&parent, goal);
        }
        for dir in Dir::ALL {
            if let Some(next) = map.neighbor(cur, dir) {
                if !seen[next.1][next.0] && map.is_traversable(cur, next) {
                    seen[next.1][next.0] = true;
                    parent[next.1][next.0] = Some((cur, dir));
                    queue.push_back(next);
                }
            }
        }
    }
    vec![]
}

/// Walk the parent chain back from `goal`; the start cell has no parent,
/// which terminates the chain.
fn reconstruct(parent: &[Vec<Option<(Pos, Dir)>>], goal: Pos) -> Vec<Action> {
    let mut moves = vec![];
    let mut cur = goal;
    while let Some((prev, dir)) = parent[cur.1][cur.0] {
        moves.push(Action::Move(dir));
        cur = prev;
    }
    moves.reverse();
    moves
}

/// Nearest cell (in move count) the troll has never occupied, or None once
/// every reachable cell has been visited. The result is always reachable:
/// the frontier only ever holds cells entered via legal moves.
pub fn nearest_unvisited(map: &GridKnowledge, start: Pos) -> Option<Pos> {
    let side = map.side();
    let mut seen = vec![vec![false; side]; side];
    let mut queue: VecDeque<Pos> = VecDeque::with_capacity(64);

    seen[start.1][start.0] = true;
    queue.push_back(start);

    while let Some(cur) = queue.pop_front() {
        if !map.is_visited(cur) {
            return Some(cur);
        }
        for dir in Dir::ALL {
            if let Some(next) = map.neighbor(cur, dir) {
                if !seen[next.1][next.0] && map.is_traversable(cur, next) {
                    seen[next.1][next.0] = true;
                    queue.push_back(next);
                }
            }
        }
    }
    None
}

/// Nearest spare block: a Block cell outside `excluded` (the tower
/// vicinity). The coordinate is a destination for `shortest_path`, not
/// itself vetted here beyond being reached by the frontier.
pub fn nearest_free_block(map: &GridKnowledge, start: Pos, excluded: &[Pos]) -> Option<Pos> {
    let side = map.side();
    let mut seen = vec![vec![false; side]; side];
    let mut queue: VecDeque<Pos> = VecDeque::with_capacity(64);

    seen[start.1][start.0] = true;
    queue.push_back(start);

    while let Some(cur) = queue.pop_front() {
        if map.cell(cur).kind.is_block() && !excluded.contains(&cur) {
            return Some(cur);
        }
        for dir in Dir::ALL {
            if let Some(next) = map.neighbor(cur, dir) {
                if !seen[next.1][next.0] && map.is_traversable(cur, next) {
                    seen[next.1][next.0] = true;
                    queue.push_back(next);
                }
            }
        }
    }
    None
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
