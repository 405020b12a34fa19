use winit::event::{ElementState, VirtualKeyCode};

/// Keyboard state the frame loop cares about: whether Escape is held.
#[derive(Debug, Default)]
pub struct InputState {
    escape: bool,
}

impl InputState {
    pub fn key(&mut self, key: VirtualKeyCode, state: ElementState) {
        if key == VirtualKeyCode::Escape {
            self.escape = state == ElementState::Pressed;
        }
    }

    pub fn escape_pressed(&self) -> bool {
        self.escape
    }
}
