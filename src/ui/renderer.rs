/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` (a grid of Cells)
///   2. Compare each cell with `back` (the previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. Batch everything with `queue!`, flush once at the end
///   5. Swap front/back
///
/// One game cell spans two terminal columns so the maze reads roughly
/// square. The renderer also owns the terminal→grid mapping that mouse
/// steering needs (`grid_cell_at`).

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::tile::Tile;
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 16, g: 16, b: 28 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel that differs from any real cell, so every position
    /// diffs dirty after init/resize.
    const INVALID: Cell = Cell {
        ch: '\0',
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    fn new(ch: char, fg: Color) -> Self {
        Cell { ch, fg, bg: Cell::BASE_BG }
    }
}

// ── FrameBuffer ──

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

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg));
            cx += 1;
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let len = s.chars().count();
        let x = self.width.saturating_sub(len) / 2;
        self.put_str(x, y, s, fg);
    }
}

// ── Renderer ──

/// Each game cell = 2 terminal columns.
const CELL_W: usize = 2;
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    /// Top-left terminal cell of the maze, set during compose.
    map_origin: (usize, usize),
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            map_origin: (0, MAP_ROW),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            DisableMouseCapture,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Map a terminal position (from mouse events) to a grid cell.
    pub fn grid_cell_at(
        &self,
        term_x: u16,
        term_y: u16,
        world: &WorldState,
    ) -> Option<(usize, usize)> {
        let (ox, oy) = self.map_origin;
        let x = (term_x as usize).checked_sub(ox)?;
        let y = (term_y as usize).checked_sub(oy)?;
        let (row, col) = (y, x / CELL_W);
        if row < world.rows && col < world.cols {
            Some((row, col))
        } else {
            None
        }
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(
                self.writer,
                SetBackgroundColor(Cell::BASE_BG),
                Clear(ClearType::All)
            )?;
        }

        // Phase change → full repaint for a clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(
                self.writer,
                SetBackgroundColor(Cell::BASE_BG),
                Clear(ClearType::All)
            )?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        match world.phase {
            Phase::Title => self.compose_title(world),
            Phase::Playing => self.compose_game(world),
            Phase::Won | Phase::Lost => {
                self.compose_game(world);
                self.compose_banner(world);
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Compose: title ──

    fn compose_title(&mut self, world: &WorldState) {
        let art = [
            "█ █ █▀▀ █ █   █▀▄▀█ █▀█ ▀▀█ █▀▀",
            "█▀▄ █▀▀ █▀█   █ ▀ █ █▀█ ▄▀  █▀▀",
            "▀ ▀ ▀▀▀ ▀ ▀   ▀   ▀ ▀ ▀ ▀▀▀ ▀▀▀",
        ];
        let top = self.term_h / 4;
        for (i, line) in art.iter().enumerate() {
            self.front.put_centered(top + i, line, Color::Yellow);
        }
        self.front.put_centered(
            top + 4,
            "grab the key, unlock the gate, dodge the chasers",
            Color::Grey,
        );

        for (i, name) in world.level_names.iter().enumerate() {
            let line = format!("[{}] {}", i + 1, name);
            self.front
                .put_centered(top + 6 + i, &line, Color::Cyan);
        }

        self.front.put_centered(
            top + 7 + world.level_names.len(),
            "[1-3] play   [q] quit",
            Color::DarkGrey,
        );

        if !world.message.is_empty() {
            self.front
                .put_centered(top + 9 + world.level_names.len(), &world.message, Color::Red);
        }
    }

    // ── Compose: game ──

    fn compose_game(&mut self, world: &WorldState) {
        self.compose_hud(world);

        let map_w = world.cols * CELL_W;
        let ox = self.term_w.saturating_sub(map_w) / 2;
        self.map_origin = (ox, MAP_ROW);

        for row in 0..world.rows {
            for col in 0..world.cols {
                let x = ox + col * CELL_W;
                let y = MAP_ROW + row;
                match world.tiles[row][col] {
                    Tile::Wall => {
                        let c = Cell::new('█', Color::DarkBlue);
                        self.front.set(x, y, c);
                        self.front.set(x + 1, y, c);
                    }
                    Tile::Pellet => {
                        self.front.set(x, y, Cell::new('•', Color::White));
                    }
                    Tile::Key => {
                        self.front.set(x, y, Cell::new('k', Color::Yellow));
                    }
                    Tile::Gate => {
                        let fg = if world.player.has_key {
                            Color::Green
                        } else {
                            Color::DarkMagenta
                        };
                        self.front.set(x, y, Cell::new('∩', fg));
                        self.front.set(x + 1, y, Cell::new(' ', fg));
                    }
                    Tile::Empty => {}
                }
            }
        }

        // Entities over terrain. A caught/finished player has no token.
        const CHASER_COLORS: [Color; 3] = [Color::Red, Color::Magenta, Color::Cyan];
        for chaser in &world.chasers {
            let x = ox + chaser.col * CELL_W;
            let y = MAP_ROW + chaser.row;
            let fg = CHASER_COLORS[chaser.id % CHASER_COLORS.len()];
            self.front.set(x, y, Cell::new('Ψ', fg));
        }
        if world.player.alive {
            let x = ox + world.player.col * CELL_W;
            let y = MAP_ROW + world.player.row;
            self.front.set(x, y, Cell::new('@', Color::Yellow));
        }

        // Message + help under the maze
        let msg_row = MAP_ROW + world.rows + 1;
        if !world.message.is_empty() {
            self.front.put_centered(msg_row, &world.message, Color::Yellow);
        }
        self.front.put_centered(
            msg_row + 1,
            "[arrows/wasd] steer  [mouse] aim  [+/-] speed  [1-3] level  [Esc] title",
            Color::DarkGrey,
        );
    }

    fn compose_hud(&mut self, world: &WorldState) {
        let key = if world.player.has_key { "KEY ⚿" } else { "key –" };
        let hud = format!(
            "SCORE {:>4}   {}   STEP {}ms",
            world.player.score, key, world.speed.player_step_ms
        );
        self.front.put_str(2, HUD_ROW, &hud, Color::White);

        let name = world
            .level_names
            .get(world.current_level)
            .map(String::as_str)
            .unwrap_or("");
        let x = self.term_w.saturating_sub(name.chars().count() + 2);
        self.front.put_str(x, HUD_ROW, name, Color::Cyan);
    }

    // ── Compose: win/loss banner ──

    fn compose_banner(&mut self, world: &WorldState) {
        let (headline, fg) = match world.phase {
            Phase::Won => ("YOU WIN!", Color::Green),
            Phase::Lost => ("YOU DIED!", Color::Red),
            _ => return,
        };
        let detail = format!("final score {}", world.player.score);
        let hint = "[Enter] replay   [1-3] level   [Esc] title";

        let width = hint.chars().count() + 6;
        let x0 = self.term_w.saturating_sub(width) / 2;
        let y0 = (MAP_ROW + world.rows / 2).saturating_sub(2);

        for y in y0..y0 + 5 {
            for x in x0..x0 + width {
                self.front.set(x, y, Cell::BLANK);
            }
        }
        self.front.put_centered(y0, &"─".repeat(width), Color::DarkGrey);
        self.front.put_centered(y0 + 1, headline, fg);
        self.front.put_centered(y0 + 2, &detail, Color::White);
        self.front.put_centered(y0 + 3, hint, Color::DarkGrey);
        self.front.put_centered(y0 + 4, &"─".repeat(width), Color::DarkGrey);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(
            self.writer,
            SetForegroundColor(last_fg),
            SetBackgroundColor(last_bg),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
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
}
