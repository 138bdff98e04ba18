use std::collections::HashSet;

/// Re-exported key and mouse enums from `winit` for convenience.
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

/// Keyboard and mouse state as seen by the 3D canvas.
///
/// The host event loop feeds `winit` events in; the canvas queries the
/// snapshot.  Call [`end_frame`](Self::end_frame) once per frame so the
/// edge-triggered queries only fire once.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    mouse_buttons: HashSet<MouseButton>,
    mouse_pos: (f64, f64),
    /// movement accumulated since the last `consume_mouse_delta`
    mouse_delta: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn update_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            if self.keys_down.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else {
            self.keys_down.remove(&key);
        }
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// True only during the frame the key went down (auto-repeat ignored).
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn update_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.mouse_buttons.insert(button);
        } else {
            self.mouse_buttons.remove(&button);
        }
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    /// Update the cursor position (window pixels) and accumulate the motion.
    pub fn set_mouse_position(&mut self, x: f64, y: f64) {
        let (px, py) = self.mouse_pos;
        self.mouse_pos = (x, y);
        self.mouse_delta.0 += (x - px) as f32;
        self.mouse_delta.1 += (y - py) as f32;
    }

    pub fn mouse_position(&self) -> (f64, f64) {
        self.mouse_pos
    }

    /// Retrieve and reset the accumulated mouse motion in pixels.
    pub fn consume_mouse_delta(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.mouse_delta)
    }

    /// Forget edge-triggered state.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_tracking() {
        let mut state = InputState::new();
        assert!(!state.is_key_pressed(KeyCode::KeyT));
        state.update_key(KeyCode::KeyT, true);
        assert!(state.is_key_pressed(KeyCode::KeyT));
        state.update_key(KeyCode::KeyT, false);
        assert!(!state.is_key_pressed(KeyCode::KeyT));
    }

    #[test]
    fn just_pressed_lasts_one_frame() {
        let mut state = InputState::new();
        state.update_key(KeyCode::KeyR, true);
        assert!(state.just_pressed(KeyCode::KeyR));
        state.end_frame();
        // auto-repeat while held
        state.update_key(KeyCode::KeyR, true);
        assert!(!state.just_pressed(KeyCode::KeyR));
        assert!(state.is_key_pressed(KeyCode::KeyR));
    }

    #[test]
    fn mouse_tracking() {
        let mut state = InputState::new();
        assert!(!state.is_button_down(MouseButton::Left));
        state.update_mouse_button(MouseButton::Left, true);
        assert!(state.is_button_down(MouseButton::Left));
        state.update_mouse_button(MouseButton::Left, false);
        assert!(!state.is_button_down(MouseButton::Left));

        state.set_mouse_position(10.0, 20.0);
        state.consume_mouse_delta();
        state.set_mouse_position(15.0, 25.0);
        state.set_mouse_position(16.0, 23.0);
        assert_eq!(state.mouse_position(), (16.0, 23.0));
        assert_eq!(state.consume_mouse_delta(), (6.0, 3.0));
        assert_eq!(state.consume_mouse_delta(), (0.0, 0.0));
    }
}
