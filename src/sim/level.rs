/// Maze loader.
///
/// ## Sources (priority order):
///   1. `maze_file` from config (plain text)
///   2. Built-in embedded maze
///
/// ## Maze legend:
///   '#' = wall (never enterable)   '.' / ' ' = open floor
///   '1'-'9' = block stack of that height
///   'T' = treasure tower           'S' = troll spawn
///
/// Rows may be ragged; short rows are padded with wall on the right.

use crate::config::SimConfig;
use crate::domain::cell::CellKind;
use crate::sim::world::{GroundCell, World, TOWER_HEIGHT};

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Build the starting world from config: the configured maze file when one
/// is set and readable, the embedded maze otherwise.
pub fn load_world(config: &SimConfig) -> Result<World, String> {
    if let Some(path) = &config.maze_file {
        match std::fs::read_to_string(path) {
            Ok(content) => match parse_maze(&content) {
                Ok(world) => return Ok(world),
                Err(e) => {
                    eprintln!(
                        "Warning: bad maze file {}: {} (using built-in maze)",
                        path.display(),
                        e,
                    );
                }
            },
            Err(e) => {
                eprintln!(
                    "Warning: cannot read maze file {}: {} (using built-in maze)",
                    path.display(),
                    e,
                );
            }
        }
    }
    parse_maze(EMBEDDED_MAZE)
}

/// Parse a maze from text content.
pub fn parse_maze(content: &str) -> Result<World, String> {
    let rows: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    if rows.is_empty() {
        return Err("maze is empty".to_string());
    }
    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);

    let mut cells = vec![vec![GroundCell::WALL; width]; rows.len()];
    let mut spawn = None;
    let mut tower = None;

    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            cells[y][x] = match ch {
                '#' => GroundCell::WALL,
                '.' | ' ' => GroundCell::empty(),
                '1'..='9' => GroundCell {
                    kind: CellKind::Block,
                    height: ch as i32 - '0' as i32,
                },
                'T' => {
                    if tower.replace((x, y)).is_some() {
                        return Err("maze has more than one tower".to_string());
                    }
                    GroundCell { kind: CellKind::Goal, height: TOWER_HEIGHT }
                }
                'S' => {
                    if spawn.replace((x, y)).is_some() {
                        return Err("maze has more than one spawn".to_string());
                    }
                    GroundCell::empty()
                }
                other => {
                    return Err(format!(
                        "unknown maze character {:?} at ({}, {})",
                        other, x, y,
                    ));
                }
            };
        }
    }

    let spawn = spawn.ok_or("maze has no spawn cell 'S'")?;
    Ok(World::from_cells(cells, spawn, tower))
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback maze
// ══════════════════════════════════════════════════════════════

/// A 15×15 training ground: enough loose blocks for the full staircase
/// with spares, and a clear apron around the tower.
const EMBEDDED_MAZE: &str = "\
###############
#S..1..#..1..1#
#....1.#.1....#
#..1...#..1...#
#...1..#......#
#.1....####...#
#..1..........#
#.1.......T...#
#...1.........#
#.1.......1...#
#...####...1..#
#.....1...1.1.#
#.1...1....1..#
#..1....1..1..#
###############";

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend_round_trip() {
        let world = parse_maze("#S.\n#3T").expect("maze parses");
        assert_eq!(world.width, 3);
        assert_eq!(world.height, 2);
        assert_eq!(world.spawn, (1, 0));
        assert_eq!(world.tower, Some((2, 1)));
        assert_eq!(world.cell_at(0, 0).kind, CellKind::Wall);
        assert_eq!(world.cell_at(2, 0).kind, CellKind::Empty);
        let stack = world.cell_at(1, 1);
        assert_eq!(stack.kind, CellKind::Block);
        assert_eq!(stack.height, 3);
        assert_eq!(world.cell_at(2, 1).height, TOWER_HEIGHT);
    }

    #[test]
    fn short_rows_pad_with_wall() {
        let world = parse_maze("S....\n..").expect("maze parses");
        assert_eq!(world.width, 5);
        assert_eq!(world.cell_at(4, 1).kind, CellKind::Wall);
    }

    #[test]
    fn spawn_is_mandatory_tower_is_not() {
        assert!(parse_maze("...\n...").is_err());
        assert!(parse_maze("S..\n...").is_ok());
    }

    #[test]
    fn duplicates_and_strays_are_rejected() {
        assert!(parse_maze("S.S").is_err());
        assert!(parse_maze("ST.T").is_err());
        assert!(parse_maze("S.x").is_err());
        assert!(parse_maze("").is_err());
    }

    #[test]
    fn embedded_maze_supports_a_full_build() {
        let world = parse_maze(EMBEDDED_MAZE).expect("embedded maze parses");
        assert_eq!(world.width, 15);
        assert_eq!(world.height, 15);
        let tower = world.tower.expect("embedded maze has a tower");

        // The staircase needs 21 ring deliveries plus one carried block.
        let mut blocks = 0;
        for y in 0..world.height {
            for x in 0..world.width {
                let cell = world.cell_at(x as i32, y as i32);
                if cell.kind.is_block() {
                    // Stacks above 1 cannot be climbed from open floor.
                    assert_eq!(cell.height, 1, "unclimbable stack at ({x}, {y})");
                    blocks += cell.height;
                }
            }
        }
        assert!(blocks >= 22, "only {blocks} blocks for a 22-block staircase");

        // The full apron around the tower is open floor.
        for dy in -1..=1i32 {
            for dx in -1..=1i32 {
                if (dx, dy) == (0, 0) {
                    continue;
                }
                let cell = world.cell_at(tower.0 as i32 + dx, tower.1 as i32 + dy);
                assert_eq!(cell.kind, CellKind::Empty);
            }
        }
    }
}
