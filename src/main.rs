/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::entity::{Dir, Heading};
use sim::event::GameEvent;
use sim::level;
use sim::scheduler::{TickScheduler, TickSource};
use sim::step;
use sim::world::{Phase, WorldState};
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Speed keys change the player step interval by this much. The scale
/// is inverted: a smaller interval is a faster game.
const SPEED_STEP_MS: u64 = 25;

fn main() {
    let config = GameConfig::load();

    let mut world = WorldState::new(config.speed.clone());
    world.level_names = level::level_names();

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Key Maze!");
    println!("Final score: {}", world.player.score);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut scheduler =
        TickScheduler::new(world.speed.player_step_ms, world.speed.chaser_step_ms);

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &kb, &mut scheduler, config) {
            break;
        }

        if world.phase == Phase::Playing {
            steer(world, &kb, renderer);
            drain_ticks(world, &mut scheduler);
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Drain every due tick, in deadline order, on this one thread, so a
/// player step and a chaser batch can never interleave mid-step.
fn drain_ticks(world: &mut WorldState, scheduler: &mut TickScheduler) {
    while let Some(source) = scheduler.poll(Instant::now()) {
        let events = match source {
            TickSource::Player => {
                world.tick_message();
                step::player_step(world)
            }
            TickSource::Chaser => step::chaser_step(world),
        };
        process_events(world, &events);

        if world.phase.is_terminal() {
            scheduler.pause();
            break;
        }
    }
}

fn process_events(world: &mut WorldState, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::KeyPicked => {
                world.set_message("Key collected! The gate is open.", 30);
            }
            GameEvent::LevelWon | GameEvent::PlayerCaught => {
                world.message.clear();
                world.message_timer = 0;
            }
            GameEvent::PelletPicked { .. } => {} // score shows in the HUD
        }
    }
}

// ── Key Constants ──

const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_FASTER: &[KeyCode] = &[KeyCode::Char('+'), KeyCode::Char('='), KeyCode::Char(']')];
const KEYS_SLOWER: &[KeyCode] = &[KeyCode::Char('-'), KeyCode::Char('_'), KeyCode::Char('[')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];

/// Update the player's heading from this frame's input. Pointer motion
/// aims toward the hovered cell; a fresh key press overrides it. The
/// heading persists until the next input.
fn steer(world: &mut WorldState, kb: &InputState, renderer: &Renderer) {
    if let Some((tx, ty)) = kb.mouse_cell() {
        if let Some(cell) = renderer.grid_cell_at(tx, ty, world) {
            world.player.heading =
                Heading::toward((world.player.row, world.player.col), cell);
        }
    }

    let dir = if kb.any_pressed(KEYS_UP) {
        Some(Dir::Up)
    } else if kb.any_pressed(KEYS_DOWN) {
        Some(Dir::Down)
    } else if kb.any_pressed(KEYS_LEFT) {
        Some(Dir::Left)
    } else if kb.any_pressed(KEYS_RIGHT) {
        Some(Dir::Right)
    } else {
        None
    };
    if let Some(dir) = dir {
        world.player.heading = dir.heading();
    }
}

/// Meta controls: level select, speed, title/quit. Returns true to quit.
fn handle_meta(
    world: &mut WorldState,
    kb: &InputState,
    scheduler: &mut TickScheduler,
    config: &GameConfig,
) -> bool {
    // Level keys work from any phase.
    for idx in 0..level::LEVEL_COUNT {
        let key = KeyCode::Char(char::from(b'1' + idx as u8));
        if kb.was_pressed(key) {
            try_load(world, idx, scheduler, config);
            return false;
        }
    }

    let esc = kb.was_pressed(KeyCode::Esc);

    match world.phase {
        Phase::Title => {
            if esc || kb.was_pressed(KeyCode::Char('q')) || kb.was_pressed(KeyCode::Char('Q')) {
                return true;
            }
        }

        Phase::Playing => {
            if esc {
                return_to_title(world, scheduler);
                return false;
            }
            if kb.any_pressed(KEYS_FASTER) {
                adjust_speed(world, scheduler, -(SPEED_STEP_MS as i64));
            } else if kb.any_pressed(KEYS_SLOWER) {
                adjust_speed(world, scheduler, SPEED_STEP_MS as i64);
            }
        }

        Phase::Won | Phase::Lost => {
            if kb.any_pressed(KEYS_CONFIRM) {
                let idx = world.current_level;
                try_load(world, idx, scheduler, config);
            } else if esc {
                return_to_title(world, scheduler);
            }
        }
    }

    false
}

/// Retune the player step interval, clamped to the configured bounds.
/// The chaser interval is deliberately untouched.
fn adjust_speed(world: &mut WorldState, scheduler: &mut TickScheduler, delta_ms: i64) {
    let current = world.speed.player_step_ms as i64;
    let new = (current + delta_ms).clamp(
        world.speed.min_player_step_ms as i64,
        world.speed.max_player_step_ms as i64,
    ) as u64;
    if new != world.speed.player_step_ms {
        world.speed.player_step_ms = new;
        scheduler.set_interval(TickSource::Player, new, Instant::now());
    }
}

/// Load a level; on failure the running level (if any) is untouched
/// and the error is surfaced without retry.
fn try_load(
    world: &mut WorldState,
    idx: usize,
    scheduler: &mut TickScheduler,
    config: &GameConfig,
) {
    match level::load_level(world, idx, config) {
        Ok(()) => {
            scheduler.set_interval(
                TickSource::Chaser,
                world.speed.chaser_step_ms,
                Instant::now(),
            );
            scheduler.set_interval(
                TickSource::Player,
                world.speed.player_step_ms,
                Instant::now(),
            );
            scheduler.resume(Instant::now());
        }
        Err(e) => {
            eprintln!("Warning: level {} load failed: {e}", idx + 1);
            world.set_message(&format!("Level {} load failed: {e}", idx + 1), 60);
        }
    }
}

fn return_to_title(world: &mut WorldState, scheduler: &mut TickScheduler) {
    scheduler.pause();
    world.phase = Phase::Title;
    world.message.clear();
    world.message_timer = 0;
}
