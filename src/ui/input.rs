/// Input state tracker.
///
/// Tracks key presses and pointer motion for one frame:
///   - Edge-triggered key presses (direction changes, level select)
///   - Pointer position, used to steer toward the hovered grid cell
///
/// Uses crossterm's keyboard enhancement for Release events when
/// available; falls back to timeout-based release detection on
/// terminals that don't report them.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, MouseEventKind};

/// After this duration without a Press/Repeat event, consider the key
/// released. Only matters on terminals without Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned "not held" → "held" during the most
    /// recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Terminal cell the pointer moved over this frame, if any.
    mouse_moved_to: Option<(u16, u16)>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            mouse_moved_to: None,
        }
    }

    /// Drain all pending terminal events and update state.
    /// Call once per frame, before the simulation ticks.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.mouse_moved_to = None;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    self.raw_events.push(key);
                    match key.kind {
                        KeyEventKind::Release => {
                            self.last_active.remove(&key.code);
                        }
                        _ => {
                            let was_held = self.is_held(key.code);
                            self.last_active.insert(key.code, Instant::now());
                            if !was_held {
                                self.fresh_presses.push(key.code);
                            }
                        }
                    }
                }
                Ok(Event::Mouse(mouse)) => {
                    if matches!(
                        mouse.kind,
                        MouseEventKind::Moved | MouseEventKind::Drag(_)
                    ) {
                        self.mouse_moved_to = Some((mouse.column, mouse.row));
                    }
                }
                _ => {}
            }
        }

        // Expire keys that have timed out.
        let now = Instant::now();
        self.last_active
            .retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Terminal cell hovered this frame, if the pointer moved.
    pub fn mouse_cell(&self) -> Option<(u16, u16)> {
        self.mouse_moved_to
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        use crossterm::event::KeyModifiers;
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
