/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,
    Wall,
    Pellet, // collectible point
    Key,    // unlocks the gate
    Gate,   // win cell, passable only while holding the key
}

impl Tile {
    pub fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }

    #[allow(dead_code)]
    pub fn is_pellet(self) -> bool {
        matches!(self, Tile::Pellet)
    }

    #[allow(dead_code)]
    pub fn is_key(self) -> bool {
        matches!(self, Tile::Key)
    }

    #[allow(dead_code)]
    pub fn is_gate(self) -> bool {
        matches!(self, Tile::Gate)
    }

    /// Does this tile block the player? The gate blocks only while
    /// the key has not been collected.
    pub fn blocks(self, has_key: bool) -> bool {
        match self {
            Tile::Wall => true,
            Tile::Gate => !has_key,
            _ => false,
        }
    }

    /// Does this tile block a chaser? Chasers ignore collectibles and
    /// the gate's lock; only walls stop them.
    pub fn blocks_chaser(self) -> bool {
        self.is_wall()
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}
