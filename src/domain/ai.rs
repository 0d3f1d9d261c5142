/// Chaser AI: greedy single-axis pursuit with a fixed fallback order.
///
/// Each tick, a chaser steps one cell toward the player along whichever
/// axis has the larger absolute distance; equal distances favor the
/// COLUMN axis (behaviorally significant, do not flip). If the primary
/// step is blocked (out of bounds, wall, or another chaser), it probes
/// north, south, west, east in that fixed order and takes the first
/// valid step. If nothing is valid the chaser stays put this tick.
///
/// Terrain = what the cell IS (wall or not).
/// Occupancy = who is there (another chaser blocks entry).

use super::entity::Chaser;
use super::rules::MapView;

/// Probe order when the primary step is blocked: N, S, W, E.
const PROBES: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Pick the chaser's step for this tick. Returns the target cell, or
/// `None` when every candidate is blocked.
pub fn chase_step(
    map: &MapView,
    chasers: &[Chaser],
    self_idx: usize,
    player_row: usize,
    player_col: usize,
) -> Option<(usize, usize)> {
    let me = &chasers[self_idx];
    let d_row = player_row as i32 - me.row as i32;
    let d_col = player_col as i32 - me.col as i32;
    if d_row == 0 && d_col == 0 {
        return None; // already on the player
    }

    // Primary: the axis with larger distance; ties go to the column axis.
    let primary = if d_row.abs() > d_col.abs() {
        (d_row.signum(), 0)
    } else {
        (0, d_col.signum())
    };

    if let Some(cell) = try_step(map, chasers, self_idx, primary) {
        return Some(cell);
    }

    for &probe in &PROBES {
        if let Some(cell) = try_step(map, chasers, self_idx, probe) {
            return Some(cell);
        }
    }

    None
}

/// Validate one signed unit step: in bounds, not a wall, and not
/// occupied by another chaser.
fn try_step(
    map: &MapView,
    chasers: &[Chaser],
    self_idx: usize,
    (dr, dc): (i32, i32),
) -> Option<(usize, usize)> {
    let me = &chasers[self_idx];
    let nr = me.row as i32 + dr;
    let nc = me.col as i32 + dc;

    if !map.chaser_can_enter(nr, nc) {
        return None;
    }

    let (nr, nc) = (nr as usize, nc as usize);
    let occupied = chasers
        .iter()
        .enumerate()
        .any(|(j, other)| j != self_idx && other.row == nr && other.col == nc);
    if occupied {
        return None;
    }

    Some((nr, nc))
}
