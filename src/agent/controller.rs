/// The staircase troll: a turn-based planner over partial map knowledge.
///
/// Stages:
///   Exploring           — hunt for the tower via nearest-unvisited sweeps.
///   BuildingLayer1      — lay the 6-cell foundation ring.
///   BuildingUpperLayers — add one-shorter layers until the ring is spent.
///   Ascending           — carry one last block up and step onto the tower.
///   Done                — goal reached; keeps answering with legal moves.
///
/// One call to `turn` consumes one observation and returns exactly one
/// action, every turn, no exceptions. Plans are queued move sequences,
/// recomputed only when the queue runs dry. Position and the carrying flag
/// are updated optimistically as actions are handed out; the environment is
/// trusted to accept them.

use std::collections::VecDeque;

use crate::domain::action::{Action, Dir, Observation};
use crate::domain::map::{GridKnowledge, Pos};
use crate::domain::path;
use crate::domain::plan;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stage {
    Exploring,
    BuildingLayer1,
    BuildingUpperLayers,
    Ascending,
    Done,
}

pub struct Agent {
    map: GridKnowledge,
    pos: Pos,
    carrying: bool,
    stage: Stage,
    queue: VecDeque<Action>,
    tower: Option<Pos>,
    /// Side of the tower the ring starts on (tower + entry = ascent cell).
    entry: Dir,
    /// Master ring; tapered from the tail as layers complete.
    ring: Vec<Pos>,
    /// Working copy of the ring for the layer under construction.
    layer: VecDeque<Pos>,
    /// Height the current layer builds up to (1 = foundation).
    layer_height: i32,
    /// Tower vicinity: blocks here are construction, not material.
    reserved: Vec<Pos>,
}

impl Agent {
    pub fn new(map_side: usize) -> Self {
        let map = GridKnowledge::new(map_side);
        let pos = map.center();
        Agent {
            map,
            pos,
            carrying: false,
            stage: Stage::Exploring,
            queue: VecDeque::new(),
            tower: None,
            entry: Dir::Right,
            ring: vec![],
            layer: VecDeque::new(),
            layer_height: 0,
            reserved: vec![],
        }
    }

    // ── Read-only views for the presentation layer ──

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn carrying(&self) -> bool {
        self.carrying
    }

    pub fn knowledge(&self) -> &GridKnowledge {
        &self.map
    }

    pub fn tower(&self) -> Option<Pos> {
        self.tower
    }

    // ── The per-turn decision step ──

    /// Fold in one observation and answer with the next action.
    pub fn turn(&mut self, obs: &Observation) -> Action {
        self.map.mark_visited(self.pos);
        self.map.observe(self.pos, obs);

        if self.stage == Stage::Exploring {
            self.check_for_tower(obs);
        }

        if self.queue.is_empty() {
            self.plan();
        }

        let action = match self.queue.pop_front() {
            Some(a) => a,
            None => self.stuck_action(),
        };
        self.advance(action);
        action
    }

    /// The first Goal sighting fixes the tower, queues the scouting loop
    /// and seeds the construction ring.
    fn check_for_tower(&mut self, obs: &Observation) {
        for toward in Dir::ALL {
            if !obs.neighbor(toward).kind.is_goal() {
                continue;
            }
            if let Some(tower) = self.map.neighbor(self.pos, toward) {
                self.tower = Some(tower);
                self.entry = toward.opposite();
                self.queue = plan::encircle_moves(toward)
                    .into_iter()
                    .map(Action::Move)
                    .collect();
                self.ring = plan::ring_around(tower, self.entry);
                self.layer = self.ring.iter().copied().collect();
                self.layer_height = 1;
                self.reserved = plan::reserved_cells(tower, &self.ring);
                self.stage = Stage::BuildingLayer1;
            }
            return;
        }
    }

    // ── Planning ──

    /// Compute a fresh action queue for the current stage. May leave the
    /// queue empty when every search comes back dry; `turn` then falls
    /// back to a holding action.
    fn plan(&mut self) {
        match self.stage {
            Stage::Exploring | Stage::Done => self.plan_explore(),
            Stage::BuildingLayer1 | Stage::BuildingUpperLayers => self.plan_build(),
            Stage::Ascending => self.plan_ascend(),
        }
    }

    /// Head for the nearest cell the troll has never stood on.
    fn plan_explore(&mut self) {
        if let Some(target) = path::nearest_unvisited(&self.map, self.pos) {
            self.queue
                .extend(path::shortest_path(&self.map, self.pos, target));
        }
    }

    fn plan_build(&mut self) {
        // Layer bookkeeping first: a drained working copy means the layer
        // is finished (or was satisfied from the start).
        if self.layer.is_empty() {
            if self.stage == Stage::BuildingLayer1 {
                self.stage = Stage::BuildingUpperLayers;
            }
            if self.ring.is_empty() {
                self.stage = Stage::Ascending;
                self.plan_ascend();
                return;
            }
            self.layer = plan::next_layer(&mut self.ring).into_iter().collect();
            self.layer_height += 1;
            if self.layer.is_empty() {
                // That was the last taper step; the ring is spent.
                self.stage = Stage::Ascending;
                self.plan_ascend();
                return;
            }
        }

        if self.carrying {
            self.plan_delivery();
        } else {
            self.plan_fetch();
        }
    }

    /// Deliver the held block to the next ring target still below the
    /// current layer height. Targets unreachable today rotate to the back
    /// of the layer and the turn is spent exploring so the map can improve.
    fn plan_delivery(&mut self) {
        for _ in 0..self.layer.len() {
            let target = match self.layer.pop_front() {
                Some(t) => t,
                None => break,
            };
            if self.delivered(target) {
                continue;
            }
            if target == self.pos {
                self.queue.push_back(Action::Drop);
                return;
            }
            let route = path::shortest_path(&self.map, self.pos, target);
            if route.is_empty() {
                self.layer.push_back(target);
                continue;
            }
            self.queue.extend(route);
            self.queue.push_back(Action::Drop);
            return;
        }
        self.plan_explore();
    }

    /// Has this ring cell already reached the height the current layer
    /// calls for? Covers pre-existing blocks on the foundation ring as
    /// well as re-entrant planning after partial progress.
    fn delivered(&self, target: Pos) -> bool {
        match self.map.cell(target).height {
            Some(h) => h >= self.layer_height,
            None => false,
        }
    }

    /// Shared retrieval policy: weigh the nearest spare block against the
    /// nearest unexplored cell. Fetch only when the block is strictly
    /// closer; ties keep exploring.
    fn plan_fetch(&mut self) {
        let block = path::nearest_free_block(&self.map, self.pos, &self.reserved);
        let unvisited = path::nearest_unvisited(&self.map, self.pos);

        let to_block = block.and_then(|b| {
            if b == self.pos {
                // Already standing on it.
                return Some(vec![]);
            }
            let route = path::shortest_path(&self.map, self.pos, b);
            if route.is_empty() {
                None
            } else {
                Some(route)
            }
        });
        let to_unvisited = unvisited.map(|u| path::shortest_path(&self.map, self.pos, u));

        match (to_block, to_unvisited) {
            (Some(fetch), Some(explore)) => {
                if fetch.len() < explore.len() {
                    self.queue.extend(fetch);
                    self.queue.push_back(Action::PickUp);
                } else {
                    self.queue.extend(explore);
                }
            }
            (Some(fetch), None) => {
                self.queue.extend(fetch);
                self.queue.push_back(Action::PickUp);
            }
            (None, Some(explore)) => {
                self.queue.extend(explore);
            }
            (None, None) => {
                // Nothing to fetch, nowhere to explore; fall back.
            }
        }
    }

    /// Final step: haul one more block to the top of the staircase, drop
    /// it underfoot, and step across onto the tower.
    fn plan_ascend(&mut self) {
        if !self.carrying {
            self.plan_fetch();
            return;
        }
        let tower = match self.tower {
            Some(t) => t,
            None => return, // unreachable past Exploring; hold still
        };
        let top = match self.map.neighbor(tower, self.entry) {
            Some(p) => p,
            None => return,
        };
        if top != self.pos {
            let route = path::shortest_path(&self.map, self.pos, top);
            if route.is_empty() {
                self.plan_explore();
                return;
            }
            self.queue.extend(route);
        }
        self.queue.push_back(Action::Drop);
        self.queue.push_back(Action::Move(self.entry.opposite()));
    }

    // ── Bookkeeping ──

    /// Optimistic update for the action just handed out.
    fn advance(&mut self, action: Action) {
        match action {
            Action::Move(dir) => {
                if let Some(next) = self.map.neighbor(self.pos, dir) {
                    self.pos = next;
                }
            }
            Action::PickUp => self.carrying = true,
            Action::Drop => self.carrying = false,
        }
        if self.stage == Stage::Ascending && Some(self.pos) == self.tower {
            self.stage = Stage::Done;
        }
    }

    /// Every turn must answer with a real token, even with nowhere to go.
    /// Prefer a legal sidestep; failing that, Drop is harmless whether or
    /// not a block is held.
    fn stuck_action(&self) -> Action {
        for dir in Dir::ALL {
            if let Some(next) = self.map.neighbor(self.pos, dir) {
                if self.map.is_traversable(self.pos, next) {
                    return Action::Move(dir);
                }
            }
        }
        Action::Drop
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::CellView;
    use crate::domain::cell::CellKind;
    use crate::sim::event::SimEvent;
    use crate::sim::level::parse_maze;

    fn view(kind: CellKind, height: i32) -> CellView {
        CellView { kind, height }
    }

    fn open_obs() -> Observation {
        Observation {
            here: view(CellKind::Empty, 0),
            up: view(CellKind::Empty, 0),
            down: view(CellKind::Empty, 0),
            left: view(CellKind::Empty, 0),
            right: view(CellKind::Empty, 0),
        }
    }

    // ── Tower discovery ──

    #[test]
    fn goal_sighting_queues_the_six_move_scouting_loop() {
        let mut agent = Agent::new(35);
        let mut obs = open_obs();
        obs.down = view(CellKind::Goal, 8);

        let start = agent.pos();
        let first = agent.turn(&obs);

        assert_eq!(agent.stage(), Stage::BuildingLayer1);
        assert_eq!(agent.tower(), Some((start.0, start.1 + 1)));
        let expected: Vec<Action> = plan::encircle_moves(Dir::Down)
            .into_iter()
            .map(Action::Move)
            .collect();
        let mut emitted = vec![first];
        emitted.extend(agent.queue.iter().copied());
        assert_eq!(emitted, expected);
        assert_eq!(agent.ring.len(), 6);
        assert_eq!(agent.layer.len(), 6);
        assert_eq!(agent.reserved.len(), 7);
    }

    #[test]
    fn ring_entry_side_faces_the_discovery_cell() {
        let mut agent = Agent::new(35);
        let discovery = agent.pos();
        let mut obs = open_obs();
        obs.right = view(CellKind::Goal, 8);
        agent.turn(&obs);

        let tower = agent.tower().expect("tower recorded");
        assert_eq!(tower, (discovery.0 + 1, discovery.1));
        // The ascent cell is the discovery-side neighbor of the tower.
        assert_eq!(agent.ring[0], discovery);
    }

    // ── Liveness ──

    #[test]
    fn exhausted_world_still_yields_actions() {
        // A 3×3 open pocket, no tower, no blocks: once everything is
        // visited, every search comes back empty and the troll must keep
        // producing legal moves anyway.
        let rows = ["#####", "#...#", "#.S.#", "#...#", "#####"];
        let mut world = parse_maze(&rows.join("\n")).expect("maze parses");
        let mut agent = Agent::new(16);
        for _ in 0..60 {
            let obs = world.observe();
            let action = agent.turn(&obs);
            let events = world.apply(action);
            for e in events {
                assert!(
                    !matches!(e, SimEvent::MoveBlocked { .. }),
                    "planner emitted an illegal move",
                );
            }
        }
        assert_eq!(agent.stage(), Stage::Exploring);
    }

    #[test]
    fn blockless_world_with_tower_keeps_cycling() {
        // Tower found but no material anywhere: the troll must not panic
        // or stall, just keep re-querying its searches.
        let rows = [
            "#########",
            "#S......#",
            "#.......#",
            "#...T...#",
            "#.......#",
            "#.......#",
            "#########",
        ];
        let mut world = parse_maze(&rows.join("\n")).expect("maze parses");
        let mut agent = Agent::new(20);
        for _ in 0..300 {
            let obs = world.observe();
            let action = agent.turn(&obs);
            world.apply(action);
        }
        // It got as far as the build stages but can never finish.
        assert!(matches!(
            agent.stage(),
            Stage::BuildingLayer1 | Stage::BuildingUpperLayers
        ));
        assert!(!world.complete);
    }

    // ── Retrieval tie-break ──

    /// Teach the agent an open corridor world and mark most of it visited,
    /// leaving chosen frontier cells.
    fn fetch_fixture(rows: &[&str], visited: &[(usize, usize)]) -> Agent {
        let mut agent = Agent::new(rows.len().max(rows[0].len()));
        let view_at = |x: i32, y: i32| -> CellView {
            if x < 0 || y < 0 {
                return view(CellKind::Wall, 0);
            }
            match rows
                .get(y as usize)
                .and_then(|r| r.as_bytes().get(x as usize))
            {
                Some(b'.') => view(CellKind::Empty, 0),
                Some(b'1') => view(CellKind::Block, 1),
                _ => view(CellKind::Wall, 0),
            }
        };
        for y in 0..rows.len() {
            for x in 0..rows[y].len() {
                let obs = Observation {
                    here: view_at(x as i32, y as i32),
                    up: view_at(x as i32, y as i32 - 1),
                    down: view_at(x as i32, y as i32 + 1),
                    left: view_at(x as i32 - 1, y as i32),
                    right: view_at(x as i32 + 1, y as i32),
                };
                agent.map.observe((x, y), &obs);
            }
        }
        for &pos in visited {
            agent.map.mark_visited(pos);
        }
        agent
    }

    #[test]
    fn strictly_closer_unvisited_cell_beats_the_block() {
        // Block at distance 3, frontier at distance 2.
        let mut agent = fetch_fixture(
            &["......1"],
            &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (6, 0)],
        );
        agent.pos = (3, 0);
        agent.plan_fetch();
        assert_eq!(agent.queue.len(), 2);
        assert!(agent.queue.iter().all(|a| matches!(a, Action::Move(_))));
    }

    #[test]
    fn equal_distances_keep_exploring() {
        // Block and frontier both at distance 2: the tie goes to exploring.
        let mut agent = fetch_fixture(
            &["....1"],
            &[(1, 0), (2, 0), (3, 0), (4, 0)],
        );
        agent.pos = (2, 0);
        agent.plan_fetch();
        assert_eq!(agent.queue.len(), 2);
        assert!(agent.queue.iter().all(|a| matches!(a, Action::Move(_))));
    }

    #[test]
    fn strictly_closer_block_wins_the_fetch() {
        // Block at distance 1, frontier at distance 2.
        let mut agent = fetch_fixture(
            &["...1.."],
            &[(1, 0), (2, 0), (3, 0), (4, 0), (5, 0)],
        );
        agent.pos = (2, 0);
        agent.plan_fetch();
        assert_eq!(agent.queue.len(), 2);
        assert_eq!(agent.queue.back(), Some(&Action::PickUp));
    }

    // ── Full run ──

    /// An open training yard with ample single blocks. The troll should
    /// complete the whole job without a single rejected action.
    const YARD: &str = "\
###############
#S..1..1..1..1#
#....1........#
#..1..1.....1.#
#........1....#
#.1....1....1.#
#.1...........#
#.1........T..#
#..1..........#
#......1......#
#..1........1.#
#.....1...1...#
#....1.....1..#
#..1....1...1.#
###############";

    #[test]
    fn full_run_builds_the_staircase_and_reaches_the_goal() {
        let mut world = parse_maze(YARD).expect("maze parses");
        let mut agent = Agent::new(35);

        let mut drops = 0u32;
        let mut picks = 0u32;
        let mut was_carrying = false;

        for _ in 0..5000 {
            if world.complete {
                break;
            }
            let obs = world.observe();
            let stage_before = agent.stage();
            let action = agent.turn(&obs);

            // Carry-state toggling: no double pickup, no empty drop.
            match action {
                Action::PickUp => {
                    assert!(!was_carrying, "picked up while already carrying");
                    picks += 1;
                    was_carrying = true;
                }
                Action::Drop => {
                    assert!(was_carrying, "dropped without a block in hand");
                    drops += 1;
                    was_carrying = false;

                    // Layer-1 lasts through its sixth delivery, not past it.
                    if drops <= 6 {
                        assert_eq!(stage_before, Stage::BuildingLayer1);
                    } else if drops < 22 {
                        assert_eq!(stage_before, Stage::BuildingUpperLayers);
                    } else {
                        assert_eq!(stage_before, Stage::Ascending);
                    }
                }
                Action::Move(_) => {}
            }

            for event in world.apply(action) {
                assert!(
                    !matches!(
                        event,
                        SimEvent::MoveBlocked { .. }
                            | SimEvent::PickUpFailed
                            | SimEvent::DropFailed
                    ),
                    "environment rejected a planned action: {event:?}",
                );
            }
        }

        assert!(world.complete, "troll never reached the treasure");
        assert_eq!(agent.stage(), Stage::Done);
        // 6+5+4+3+2+1 ring deliveries plus the final carried block.
        assert_eq!(drops, 22);
        assert_eq!(picks, 22);

        // The finished staircase tapers 6 down to 1 around the tower.
        let tower = agent.tower().expect("tower recorded");
        let ring = plan::ring_around(tower, agent.entry);
        // Map coordinates equal world coordinates shifted by the start
        // offset; recover the world-side heights through the agent's map.
        for (i, cell) in ring.iter().enumerate() {
            let expected = if i == 0 { 7 } else { 6 - i as i32 };
            assert_eq!(
                agent.map.cell(*cell).height,
                Some(expected),
                "ring cell {i} has the wrong height",
            );
        }
    }
}
