/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// Layout: the true maze on the left, the troll's knowledge panel on the
/// right (optional), HUD on top, status and help lines at the bottom.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::agent::{Agent, Stage};
use crate::domain::cell::CellKind;
use crate::sim::world::World;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells. Using the
    /// same RGB for `Clear` and every cell keeps the inter-row gap pixels
    /// from showing as horizontal lines on VTE-based terminals.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 20, b: 28 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
    }
}

// ── Renderer ──

/// Each maze cell is drawn 2 terminal columns wide.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

/// Gap between the true maze and the knowledge panel.
const PANEL_GAP: usize = 3;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(
        &mut self,
        world: &World,
        agent: &Agent,
        show_knowledge: bool,
        paused: bool,
        message: &str,
    ) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Build front buffer
        self.front.clear();
        self.compose_hud(world, agent, paused);
        self.compose_maze(world);
        if show_knowledge {
            self.compose_knowledge(world, agent);
        }
        self.compose_footer(world, message);

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame. Not ResetColor: that
        // falls back to the terminal default, which may differ from BASE_BG.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, world: &World, agent: &Agent, paused: bool) {
        let hud = format!(
            " Turn {:<5} {:<12} {:<9} {}",
            world.turn,
            stage_label(agent.stage()),
            if agent.carrying() { "carrying" } else { "" },
            if paused { "• PAUSED" } else { "" },
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, Cell::BASE_BG);
    }

    fn compose_maze(&mut self, world: &World) {
        for y in 0..world.height {
            for x in 0..world.width {
                let (glyphs, fg, bg) = if (x, y) == world.troll {
                    ("@ ", Color::Rgb { r: 120, g: 255, b: 120 }, Cell::BASE_BG)
                } else {
                    ground_glyphs(world, x, y)
                };
                self.front
                    .put_str(x * CELL_W, MAP_ROW + y, glyphs, fg, bg);
            }
        }
    }

    /// The troll's private map, aligned with the true maze: the troll
    /// spawned at the center of its knowledge grid, so world (x, y) sits
    /// at knowledge (x + cx - sx, y + cy - sy).
    fn compose_knowledge(&mut self, world: &World, agent: &Agent) {
        let panel_x = world.width * CELL_W + PANEL_GAP;
        self.front.put_str(
            panel_x,
            MAP_ROW - 1,
            "KNOWN",
            Color::DarkGrey,
            Cell::BASE_BG,
        );

        let map = agent.knowledge();
        let center = map.center();
        let (ox, oy) = (
            center.0 as i32 - world.spawn.0 as i32,
            center.1 as i32 - world.spawn.1 as i32,
        );

        for y in 0..world.height {
            for x in 0..world.width {
                let mx = x as i32 + ox;
                let my = y as i32 + oy;
                if mx < 0 || my < 0 {
                    continue;
                }
                let pos = (mx as usize, my as usize);
                let cell = map.cell(pos);
                let (g0, g1, fg) = if (x, y) == world.troll {
                    ('@', ' ', Color::Rgb { r: 120, g: 255, b: 120 })
                } else {
                    match cell.height {
                        // Never sensed: keep the panel dark.
                        None => (' ', ' ', Color::DarkGrey),
                        Some(h) => match cell.kind {
                            CellKind::Wall => ('█', '█', Color::Rgb { r: 70, g: 74, b: 90 }),
                            CellKind::Goal => ('T', ' ', Color::Rgb { r: 255, g: 200, b: 60 }),
                            CellKind::Block => (
                                (b'0' + h.clamp(0, 9) as u8) as char,
                                ' ',
                                Color::Rgb { r: 220, g: 170, b: 90 },
                            ),
                            CellKind::Empty if map.is_visited(pos) => {
                                ('·', ' ', Color::Rgb { r: 110, g: 120, b: 140 })
                            }
                            CellKind::Empty => ('·', ' ', Color::Rgb { r: 60, g: 66, b: 80 }),
                        },
                    }
                };
                let px = panel_x + x * CELL_W;
                self.front.set(px, MAP_ROW + y, Cell::new(g0, fg, Cell::BASE_BG));
                self.front.set(px + 1, MAP_ROW + y, Cell::new(g1, fg, Cell::BASE_BG));
            }
        }
    }

    fn compose_footer(&mut self, world: &World, message: &str) {
        let msg_row = MAP_ROW + world.height + 1;
        if !message.is_empty() {
            self.front.put_str(
                1,
                msg_row,
                message,
                Color::Rgb { r: 255, g: 220, b: 120 },
                Cell::BASE_BG,
            );
        }
        self.front.put_str(
            1,
            msg_row + 1,
            "[Space] Pause  [.] Step  [R] Restart  [+/-] Speed  [Q] Quit",
            Color::DarkGrey,
            Cell::BASE_BG,
        );
    }
}

// ── Glyph tables ──

fn ground_glyphs(world: &World, x: usize, y: usize) -> (&'static str, Color, Color) {
    let cell = world.cell_at(x as i32, y as i32);
    match cell.kind {
        CellKind::Wall => ("██", Color::Rgb { r: 82, g: 86, b: 104 }, Cell::BASE_BG),
        CellKind::Goal => ("TT", Color::Rgb { r: 255, g: 200, b: 60 }, Cell::BASE_BG),
        CellKind::Block => (
            height_glyphs(cell.height),
            Color::Rgb { r: 220, g: 170, b: 90 },
            Cell::BASE_BG,
        ),
        CellKind::Empty => ("· ", Color::Rgb { r: 70, g: 78, b: 96 }, Cell::BASE_BG),
    }
}

/// Stack heights as fixed two-column glyphs, avoiding per-frame formatting.
fn height_glyphs(height: i32) -> &'static str {
    match height {
        1 => "1 ",
        2 => "2 ",
        3 => "3 ",
        4 => "4 ",
        5 => "5 ",
        6 => "6 ",
        7 => "7 ",
        8 => "8 ",
        _ => "9 ",
    }
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Exploring => "exploring",
        Stage::BuildingLayer1 => "foundation",
        Stage::BuildingUpperLayers => "building up",
        Stage::Ascending => "ascending",
        Stage::Done => "done",
    }
}
