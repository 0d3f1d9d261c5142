/// WorldState: the complete snapshot of a running game.
///
/// The tile grid is owned here and mutated only through `set_tile`;
/// rules and AI see it through a read-only `MapView` (`map_view()`).
/// Entities (player, chasers) live beside the grid, not inside it.

use crate::config::SpeedConfig;
use crate::domain::entity::{Chaser, Player};
use crate::domain::rules::MapView;
use crate::domain::tile::Tile;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    Won,  // terminal: no resume without a fresh level load
    Lost, // terminal
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Won | Phase::Lost)
    }
}

pub struct WorldState {
    // ── Grid (single mutation authority) ──
    pub tiles: Vec<Vec<Tile>>,
    pub rows: usize,
    pub cols: usize,

    // ── Entities ──
    pub player: Player,
    pub chasers: Vec<Chaser>,

    // ── Speed config ──
    pub speed: SpeedConfig,

    // ── Meta ──
    pub phase: Phase,
    pub current_level: usize,
    pub level_names: Vec<String>,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

impl WorldState {
    pub fn new(speed: SpeedConfig) -> Self {
        WorldState {
            tiles: vec![],
            rows: 0,
            cols: 0,
            player: Player::new(0, 0),
            chasers: vec![],
            speed,
            phase: Phase::Title,
            current_level: 0,
            level_names: vec![],
            message: String::new(),
            message_timer: 0,
        }
    }

    /// Read-only view of the grid for rules/AI queries.
    pub fn map_view(&self) -> MapView {
        MapView {
            tiles: &self.tiles,
            rows: self.rows,
            cols: self.cols,
        }
    }

    pub fn tile_at(&self, row: usize, col: usize) -> Tile {
        if row < self.rows && col < self.cols {
            self.tiles[row][col]
        } else {
            Tile::Wall // out of bounds = wall
        }
    }

    pub fn set_tile(&mut self, row: usize, col: usize, tile: Tile) {
        if row < self.rows && col < self.cols {
            self.tiles[row][col] = tile;
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Tick down the HUD message timer; clears the message on expiry.
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }
}
