/// Movement rules: pure legality queries, no side effects.
///
/// The grid is owned by the world; rules receive a read-only `MapView`
/// and answer "may this step happen", never "perform this step".
///
/// ## Enterability
///
/// ┌──────────────────────────────┬─────────┬────────┐
/// │ Condition                     │ Player  │ Chaser │
/// ├──────────────────────────────┼─────────┼────────┤
/// │ Out of bounds                 │ DENY    │ DENY   │
/// │ Wall                          │ DENY    │ DENY   │
/// │ Gate, key not held            │ DENY    │ allow  │
/// │ Gate, key held                │ allow   │ allow  │
/// │ Pellet / Key / Empty          │ allow   │ allow  │
/// └──────────────────────────────┴─────────┴────────┘
///
/// Chasers never consume what they stand on; occupancy does not
/// mutate the grid.

use super::tile::Tile;

/// Immutable view of the tile grid for rule and AI queries.
pub struct MapView<'a> {
    pub tiles: &'a [Vec<Tile>],
    pub rows: usize,
    pub cols: usize,
}

impl<'a> MapView<'a> {
    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    /// Tile at (row, col); out of bounds reads as a wall.
    pub fn tile_at(&self, row: i32, col: i32) -> Tile {
        if self.in_bounds(row, col) {
            self.tiles[row as usize][col as usize]
        } else {
            Tile::Wall
        }
    }

    /// May the player enter (row, col)?
    pub fn can_enter(&self, row: i32, col: i32, has_key: bool) -> bool {
        self.in_bounds(row, col) && !self.tile_at(row, col).blocks(has_key)
    }

    /// May a chaser enter (row, col)? Terrain only; other-chaser
    /// occupancy is the AI's concern.
    pub fn chaser_can_enter(&self, row: i32, col: i32) -> bool {
        self.in_bounds(row, col) && !self.tile_at(row, col).blocks_chaser()
    }
}
