/// Keyboard intake for the viewer.
///
/// The troll runs itself; keys only drive meta controls (pause, step,
/// restart, speed, quit). All that needs is the set of key codes seen
/// since the previous drain. Repeat events from a held key are kept on
/// purpose: holding `.` keeps single-stepping and holding `-` keeps
/// slowing the tick.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};

pub struct InputState {
    /// Codes seen during the most recent `drain_events` call.
    pressed: Vec<KeyCode>,
    ctrl_c: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            pressed: Vec::with_capacity(8),
            ctrl_c: false,
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.pressed.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.accept(key);
            }
        }
    }

    /// Was this key pressed since the last drain?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(&code)
    }

    /// Convenience: was any of these keys pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }

    // ── Internal ──

    /// Fold one key event into the frame's pressed set. Release events
    /// (reported by terminals with the keyboard enhancement active) carry
    /// no press intent and are skipped.
    fn accept(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            self.ctrl_c = true;
        }
        self.pressed.push(key.code);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_presses_are_queryable() {
        let mut kb = InputState::new();
        kb.accept(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        assert!(kb.was_pressed(KeyCode::Char(' ')));
        assert!(kb.any_pressed(&[KeyCode::Char('q'), KeyCode::Char(' ')]));
        assert!(!kb.was_pressed(KeyCode::Char('q')));
        assert!(!kb.ctrl_c_pressed());
    }

    #[test]
    fn release_events_are_skipped() {
        let mut kb = InputState::new();
        let mut key = KeyEvent::new(KeyCode::Char('.'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        kb.accept(key);
        assert!(!kb.was_pressed(KeyCode::Char('.')));
    }

    #[test]
    fn ctrl_c_is_flagged() {
        let mut kb = InputState::new();
        kb.accept(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(kb.ctrl_c_pressed());
        // Plain 'c' is not a quit request.
        let mut kb = InputState::new();
        kb.accept(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE));
        assert!(!kb.ctrl_c_pressed());
    }
}
