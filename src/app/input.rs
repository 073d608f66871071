//! Platform-agnostic input state
//!
//! Holds the keys and mouse buttons the editor reacts to, independent of the
//! windowing library. The winit adapter translates platform events into
//! [`Input::inject_key`] and friends.

use std::collections::HashSet;

use glam::Vec2;

/// Keys the editor binds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    // Camera
    W,
    A,
    S,
    D,
    ControlLeft,
    ControlRight,

    // Commands
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    B,
    C,
    H,
    L,
    M,
    O,
    T,
    Tab,
    Delete,
    Backspace,
    Plus,
    Minus,
    Escape,
}

/// Mouse buttons the editor binds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Per-frame input state.
#[derive(Debug, Clone, Default)]
pub struct Input {
    pressed_keys: HashSet<Key>,
    just_pressed_keys: Vec<Key>,

    pressed_mouse: HashSet<MouseButton>,

    mouse_position: Option<Vec2>,
    mouse_delta: Vec2,
    scroll_delta: f32,

    screen_size: Vec2,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== System API (called by the platform adapter) ==========

    /// Clears transient state (just-pressed keys and deltas).
    pub fn end_frame(&mut self) {
        self.just_pressed_keys.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    pub fn inject_key(&mut self, key: Key, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                // Auto-repeat presses are ignored.
                if self.pressed_keys.insert(key) {
                    self.just_pressed_keys.push(key);
                }
            }
            ButtonState::Released => {
                self.pressed_keys.remove(&key);
            }
        }
    }

    pub fn inject_mouse_button(&mut self, button: MouseButton, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                self.pressed_mouse.insert(button);
            }
            ButtonState::Released => {
                self.pressed_mouse.remove(&button);
            }
        }
    }

    /// Records a cursor position. The first position after start-up produces
    /// no delta.
    pub fn inject_mouse_position(&mut self, x: f32, y: f32) {
        let new_pos = Vec2::new(x, y);
        if let Some(old) = self.mouse_position {
            self.mouse_delta += new_pos - old;
        }
        self.mouse_position = Some(new_pos);
    }

    pub fn inject_scroll(&mut self, delta: f32) {
        self.scroll_delta += delta;
    }

    pub fn inject_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    // ========== Queries ==========

    #[must_use]
    pub fn key(&self, key: Key) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Keys pressed since the last [`end_frame`](Self::end_frame), in press order.
    #[must_use]
    pub fn keys_down(&self) -> &[Key] {
        &self.just_pressed_keys
    }

    #[must_use]
    pub fn ctrl(&self) -> bool {
        self.key(Key::ControlLeft) || self.key(Key::ControlRight)
    }

    #[must_use]
    pub fn mouse_button(&self, button: MouseButton) -> bool {
        self.pressed_mouse.contains(&button)
    }

    #[must_use]
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    #[must_use]
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    #[must_use]
    pub fn screen_size(&self) -> Vec2 {
        self.screen_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_press_is_reported_once() {
        let mut input = Input::new();
        input.inject_key(Key::M, ButtonState::Pressed);
        input.inject_key(Key::M, ButtonState::Pressed);
        assert_eq!(input.keys_down(), &[Key::M]);

        input.end_frame();
        assert!(input.keys_down().is_empty());
        assert!(input.key(Key::M));

        input.inject_key(Key::M, ButtonState::Released);
        assert!(!input.key(Key::M));
    }

    #[test]
    fn first_cursor_position_has_no_delta() {
        let mut input = Input::new();
        input.inject_mouse_position(100.0, 100.0);
        assert_eq!(input.mouse_delta(), Vec2::ZERO);

        input.inject_mouse_position(110.0, 95.0);
        assert_eq!(input.mouse_delta(), Vec2::new(10.0, -5.0));

        input.end_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }
}
