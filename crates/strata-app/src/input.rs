//! Frame-coherent input state.
//!
//! Window events update this struct as they arrive; the simulation reads a
//! consistent snapshot per tick. Mouse motion and clicks are edge-consumed
//! with `take_*` so one physical event drives exactly one action.

use glam::{Vec2, Vec3};
use rustc_hash::FxHashSet;
use winit::event::{ElementState, KeyEvent, MouseButton};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Default)]
pub struct InputState {
    held: FxHashSet<KeyCode>,
    mouse_delta: Vec2,
    dig_clicked: bool,
    place_clicked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_key(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        match event.state {
            ElementState::Pressed => {
                self.held.insert(code);
            }
            ElementState::Released => {
                self.held.remove(&code);
            }
        }
    }

    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }
        match button {
            MouseButton::Left => self.dig_clicked = true,
            MouseButton::Right => self.place_clicked = true,
            _ => {}
        }
    }

    pub fn accumulate_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.mouse_delta += Vec2::new(dx as f32, dy as f32);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.contains(&code)
    }

    /// Movement axes from WASD / Space / Shift: x strafe, y vertical,
    /// z forward.
    pub fn movement_axes(&self) -> Vec3 {
        let axis = |pos, neg| (self.is_held(pos) as i32 - self.is_held(neg) as i32) as f32;
        Vec3::new(
            axis(KeyCode::KeyD, KeyCode::KeyA),
            axis(KeyCode::Space, KeyCode::ShiftLeft),
            axis(KeyCode::KeyW, KeyCode::KeyS),
        )
    }

    /// Consumes the accumulated mouse motion.
    pub fn take_mouse_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.mouse_delta)
    }

    /// Consumes a pending left click.
    pub fn take_dig(&mut self) -> bool {
        std::mem::take(&mut self.dig_clicked)
    }

    /// Consumes a pending right click.
    pub fn take_place(&mut self) -> bool {
        std::mem::take(&mut self.place_clicked)
    }

    /// Drops transient state when the pointer grab is released, so stale
    /// clicks and motion never fire on regrab.
    pub fn clear_transient(&mut self) {
        self.mouse_delta = Vec2::ZERO;
        self.dig_clicked = false;
        self.place_clicked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_axes_cancel() {
        let mut input = InputState::new();
        input.held.insert(KeyCode::KeyW);
        input.held.insert(KeyCode::KeyS);
        input.held.insert(KeyCode::KeyD);
        let axes = input.movement_axes();
        assert_eq!(axes, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_mouse_delta_is_consumed() {
        let mut input = InputState::new();
        input.accumulate_mouse_motion(3.0, -2.0);
        input.accumulate_mouse_motion(1.0, 1.0);
        assert_eq!(input.take_mouse_delta(), Vec2::new(4.0, -1.0));
        assert_eq!(input.take_mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn test_clicks_are_edge_triggered() {
        let mut input = InputState::new();
        input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        input.process_mouse_button(MouseButton::Left, ElementState::Released);
        assert!(input.take_dig());
        assert!(!input.take_dig());
    }

    #[test]
    fn test_clear_transient_drops_pending_actions() {
        let mut input = InputState::new();
        input.process_mouse_button(MouseButton::Right, ElementState::Pressed);
        input.accumulate_mouse_motion(10.0, 10.0);
        input.clear_transient();
        assert!(!input.take_place());
        assert_eq!(input.take_mouse_delta(), Vec2::ZERO);
    }
}
