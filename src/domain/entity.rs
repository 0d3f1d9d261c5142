/// Entities: Player and Chaser. The grid stores terrain only;
/// entities are drawn over it and carry their own positions.

/// Desired movement as a unit vector. Keyboard input produces cardinal
/// headings; pointer input may produce diagonals when the hovered cell
/// sits on the exact diagonal, so both components are kept.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Heading {
    pub dr: i32,
    pub dc: i32,
}

impl Heading {
    pub const STOP: Heading = Heading { dr: 0, dc: 0 };

    pub fn new(dr: i32, dc: i32) -> Self {
        Heading { dr: dr.signum(), dc: dc.signum() }
    }

    pub fn is_stopped(self) -> bool {
        self.dr == 0 && self.dc == 0
    }

    /// Heading toward a target cell, normalized to unit steps.
    /// The larger axis wins; an exact diagonal keeps both components.
    pub fn toward(from: (usize, usize), to: (usize, usize)) -> Self {
        let dr = to.0 as i32 - from.0 as i32;
        let dc = to.1 as i32 - from.1 as i32;
        if dr.abs() > dc.abs() {
            Heading { dr: dr.signum(), dc: 0 }
        } else if dc.abs() > dr.abs() {
            Heading { dr: 0, dc: dc.signum() }
        } else {
            Heading { dr: dr.signum(), dc: dc.signum() }
        }
    }
}

/// Four-way keyboard direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub fn heading(self) -> Heading {
        match self {
            Dir::Up => Heading::new(-1, 0),
            Dir::Down => Heading::new(1, 0),
            Dir::Left => Heading::new(0, -1),
            Dir::Right => Heading::new(0, 1),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub row: usize,
    pub col: usize,
    pub heading: Heading,
    pub has_key: bool,
    pub score: u32,
    pub alive: bool,
}

impl Player {
    pub fn new(row: usize, col: usize) -> Self {
        Player {
            row,
            col,
            heading: Heading::STOP,
            has_key: false,
            score: 0,
            alive: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Chaser {
    pub id: usize,
    pub row: usize,
    pub col: usize,
}

impl Chaser {
    pub fn new(id: usize, row: usize, col: usize) -> Self {
        Chaser { id, row, col }
    }
}
