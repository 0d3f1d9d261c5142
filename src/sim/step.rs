/// Tick functions: advance the world by one player step or one chaser
/// batch.
///
/// Processing order per player tick:
///   1. Heading applied (silent no-op when blocked)
///   2. Cell effect (pellet, key, gate)
///
/// Per chaser tick:
///   1. Every chaser picks and applies its step independently
///   2. Collision pass over the whole batch
///
/// Collision checking belongs to the loop, not the chasers: chasers are
/// plain data and never hold a reference back into the world. The pass
/// runs only after chaser movement; a player stepping onto a chaser's
/// cell is caught on the next chaser tick.

use crate::domain::ai;
use crate::domain::tile::Tile;
use crate::sim::event::GameEvent;
use crate::sim::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Player tick
// ══════════════════════════════════════════════════════════════

pub fn player_step(world: &mut WorldState) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if world.phase != Phase::Playing {
        return events;
    }

    let heading = world.player.heading;
    if heading.is_stopped() {
        return events;
    }

    let target_row = world.player.row as i32 + heading.dr;
    let target_col = world.player.col as i32 + heading.dc;

    // Wall, locked gate, or out of bounds: stay put, no error.
    if !world
        .map_view()
        .can_enter(target_row, target_col, world.player.has_key)
    {
        return events;
    }
    let (row, col) = (target_row as usize, target_col as usize);

    match world.tile_at(row, col) {
        Tile::Pellet => {
            world.player.score += 1;
            world.set_tile(row, col, Tile::Empty);
            events.push(GameEvent::PelletPicked { row, col });
        }
        Tile::Key => {
            world.player.has_key = true;
            world.set_tile(row, col, Tile::Empty);
            events.push(GameEvent::KeyPicked);
        }
        Tile::Gate => {
            // can_enter already proved the key is held: the level is won.
            // The player token disappears; position stays at its last
            // valid cell.
            world.player.alive = false;
            world.phase = Phase::Won;
            events.push(GameEvent::LevelWon);
            return events;
        }
        _ => {}
    }

    world.player.row = row;
    world.player.col = col;
    events
}

// ══════════════════════════════════════════════════════════════
// Chaser tick
// ══════════════════════════════════════════════════════════════

pub fn chaser_step(world: &mut WorldState) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if world.phase != Phase::Playing {
        return events;
    }

    let (player_row, player_col) = (world.player.row, world.player.col);
    for i in 0..world.chasers.len() {
        let step = {
            let map = world.map_view();
            ai::chase_step(&map, &world.chasers, i, player_row, player_col)
        };
        if let Some((row, col)) = step {
            world.chasers[i].row = row;
            world.chasers[i].col = col;
        }
        // A blocked chaser simply skips this tick.
    }

    check_collisions(world, &mut events);
    events
}

// ══════════════════════════════════════════════════════════════
// Collision pass
// ══════════════════════════════════════════════════════════════

/// Loss check: any chaser on the player's cell ends the game. Driven
/// by chaser movement, so a player stepping onto a chaser's cell stays
/// alive until the next chaser tick.
fn check_collisions(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if !world.player.alive {
        return;
    }
    let caught = world
        .chasers
        .iter()
        .any(|c| c.row == world.player.row && c.col == world.player.col);
    if caught {
        world.player.alive = false;
        world.player.heading = crate::domain::entity::Heading::STOP;
        world.phase = Phase::Lost;
        events.push(GameEvent::PlayerCaught);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::{Chaser, Heading, Player};
    use crate::domain::rules::test_support::grid_from;

    /// Build a world from a string diagram; 'P' places the player,
    /// 'C' places chasers (terrain under both reads as Empty).
    fn world_from(rows: &[&str]) -> WorldState {
        let (tiles, height, width) = grid_from(rows);
        let mut world = WorldState::new(GameConfig::default_for_tests().speed);
        world.tiles = tiles;
        world.rows = height;
        world.cols = width;
        let mut chaser_id = 0;
        for (r, row) in rows.iter().enumerate() {
            for (c, ch) in row.chars().enumerate() {
                match ch {
                    'P' => world.player = Player::new(r, c),
                    'C' => {
                        world.chasers.push(Chaser::new(chaser_id, r, c));
                        chaser_id += 1;
                    }
                    _ => {}
                }
            }
        }
        world.phase = Phase::Playing;
        world
    }

    #[test]
    fn zero_heading_is_a_no_op() {
        let mut w = world_from(&[
            "WWWW", //
            "WP.W", //
            "WWWW",
        ]);
        let events = player_step(&mut w);
        assert!(events.is_empty());
        assert_eq!((w.player.row, w.player.col), (1, 1));
    }

    #[test]
    fn wall_blocks_silently() {
        let mut w = world_from(&[
            "WWWW", //
            "WP.W", //
            "WWWW",
        ]);
        w.player.heading = Heading::new(-1, 0);
        assert!(player_step(&mut w).is_empty());
        assert_eq!((w.player.row, w.player.col), (1, 1));
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn pellet_scores_and_clears_cell() {
        // Player (1,1) heading east onto a pellet.
        let mut w = world_from(&[
            "WWWW", //
            "WPoW", //
            "WWWW",
        ]);
        w.player.heading = Heading::new(0, 1);
        let events = player_step(&mut w);
        assert_eq!(events, vec![GameEvent::PelletPicked { row: 1, col: 2 }]);
        assert_eq!(w.player.score, 1);
        assert_eq!((w.player.row, w.player.col), (1, 2));
        assert_eq!(w.tile_at(1, 2), Tile::Empty);
    }

    #[test]
    fn score_never_decreases() {
        let mut w = world_from(&[
            "WWWWW", //
            "WPooW", //
            "WWWWW",
        ]);
        w.player.heading = Heading::new(0, 1);
        player_step(&mut w);
        player_step(&mut w);
        assert_eq!(w.player.score, 2);
        // Walking back over the cleared cells collects nothing.
        w.player.heading = Heading::new(0, -1);
        player_step(&mut w);
        player_step(&mut w);
        assert_eq!(w.player.score, 2);
    }

    #[test]
    fn key_sets_flag_and_clears_cell() {
        let mut w = world_from(&[
            "WWWW", //
            "WPKW", //
            "WWWW",
        ]);
        w.player.heading = Heading::new(0, 1);
        let events = player_step(&mut w);
        assert_eq!(events, vec![GameEvent::KeyPicked]);
        assert!(w.player.has_key);
        assert_eq!(w.tile_at(1, 2), Tile::Empty);
    }

    #[test]
    fn gate_blocked_without_key() {
        let mut w = world_from(&[
            "WWWW", //
            "WPGW", //
            "WWWW",
        ]);
        w.player.heading = Heading::new(0, 1);
        assert!(player_step(&mut w).is_empty());
        assert_eq!((w.player.row, w.player.col), (1, 1));
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn gate_with_key_wins() {
        let mut w = world_from(&[
            "WWWW", //
            "WPGW", //
            "WWWW",
        ]);
        w.player.has_key = true;
        w.player.heading = Heading::new(0, 1);
        let events = player_step(&mut w);
        assert_eq!(events, vec![GameEvent::LevelWon]);
        assert_eq!(w.phase, Phase::Won);
        assert!(!w.player.alive);
        // Player never occupies the gate cell.
        assert_eq!((w.player.row, w.player.col), (1, 1));
    }

    #[test]
    fn terminal_phase_ticks_mutate_nothing() {
        let mut w = world_from(&[
            "WWWWW", //
            "WPoCW", //
            "WWWWW",
        ]);
        w.phase = Phase::Won;
        w.player.heading = Heading::new(0, 1);
        assert!(player_step(&mut w).is_empty());
        assert!(chaser_step(&mut w).is_empty());
        assert_eq!(w.player.score, 0);
        assert_eq!((w.chasers[0].row, w.chasers[0].col), (1, 3));
    }

    #[test]
    fn chaser_batch_then_collision_loses() {
        let mut w = world_from(&[
            "WWWWW", //
            "WP.CW", //
            "WWWWW",
        ]);
        // Chaser closes in; second tick lands on the player.
        assert!(chaser_step(&mut w).is_empty());
        assert_eq!((w.chasers[0].row, w.chasers[0].col), (1, 2));
        let events = chaser_step(&mut w);
        assert_eq!(events, vec![GameEvent::PlayerCaught]);
        assert_eq!(w.phase, Phase::Lost);
        assert!(!w.player.alive);
        assert!(w.player.heading.is_stopped());
    }

    #[test]
    fn player_step_never_drives_the_collision_check() {
        let mut w = world_from(&[
            "WWWW", //
            "WPCW", //
            "WWWW",
        ]);
        // Stepping onto the chaser's cell is not a loss by itself; the
        // check runs on chaser movement.
        w.player.heading = Heading::new(0, 1);
        assert!(player_step(&mut w).is_empty());
        assert_eq!(w.phase, Phase::Playing);
        assert!(w.player.alive);
        // The next chaser tick catches the shared cell.
        let events = chaser_step(&mut w);
        assert_eq!(events, vec![GameEvent::PlayerCaught]);
        assert_eq!(w.phase, Phase::Lost);
    }

    #[test]
    fn chasers_never_share_a_cell() {
        let mut w = world_from(&[
            "WWWWWW", //
            "WP.CCW", //
            "W....W", //
            "WWWWWW",
        ]);
        for _ in 0..20 {
            chaser_step(&mut w);
            for i in 0..w.chasers.len() {
                for j in (i + 1)..w.chasers.len() {
                    assert!(
                        (w.chasers[i].row, w.chasers[i].col)
                            != (w.chasers[j].row, w.chasers[j].col)
                    );
                }
            }
            if w.phase.is_terminal() {
                break;
            }
        }
    }

    #[test]
    fn player_never_on_wall_or_locked_gate() {
        let mut w = world_from(&[
            "WWWWW", //
            "WP.GW", //
            "W.o.W", //
            "WWWWW",
        ]);
        let headings = [
            Heading::new(0, 1),
            Heading::new(1, 0),
            Heading::new(0, 1),
            Heading::new(-1, 0),
            Heading::new(0, 1),
            Heading::new(0, 1),
        ];
        for h in headings {
            w.player.heading = h;
            player_step(&mut w);
            let tile = w.tile_at(w.player.row, w.player.col);
            assert!(!tile.is_wall());
            assert!(!(tile.is_gate() && !w.player.has_key));
        }
    }

    #[test]
    fn diagonal_heading_moves_diagonally() {
        let mut w = world_from(&[
            "WWWW", //
            "WP.W", //
            "W.oW", //
            "WWWW",
        ]);
        w.player.heading = Heading::new(1, 1);
        let events = player_step(&mut w);
        assert_eq!(events, vec![GameEvent::PelletPicked { row: 2, col: 2 }]);
        assert_eq!((w.player.row, w.player.col), (2, 2));
    }
}
