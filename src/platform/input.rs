//! Pointer input
//!
//! Tracks the cursor and the primary button between frames; `sample` turns
//! that into the simulation's per-frame input.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};

use crate::sim::{TickInput, window_to_world};

/// Cursor position (physical window pixels, origin top-left) and button state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub cursor: Option<Vec2>,
    pub primary_down: bool,
}

impl PointerState {
    /// Fold a window event into the state
    pub fn apply(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.move_to(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.set_primary(*state == ElementState::Pressed),
            // The release may never arrive once focus is gone
            WindowEvent::Focused(false) => self.set_primary(false),
            _ => {}
        }
    }

    pub fn move_to(&mut self, cursor: Vec2) {
        self.cursor = Some(cursor);
    }

    pub fn set_primary(&mut self, down: bool) {
        self.primary_down = down;
    }

    /// Input for this frame; steering only while the button is held
    pub fn sample(&self, window_size: Vec2, world_size: Vec2) -> TickInput {
        match (self.primary_down, self.cursor) {
            (true, Some(cursor)) => {
                TickInput::steering(window_to_world(cursor, window_size, world_size))
            }
            _ => TickInput::default(),
        }
    }
}
