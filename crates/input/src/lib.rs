#![warn(missing_docs)]
//! Input handling for the mouse cursor and tracked hand controllers.

use glam::Vec2;
use raypoint_core::Pose;
use std::collections::HashSet;
use winit::event::{DeviceEvent, ElementState, WindowEvent};

pub use winit::event::MouseButton;

/// Input state tracking for a single frame.
#[derive(Debug)]
pub struct InputState {
    /// Cursor position in physical pixels, `None` while outside the window.
    cursor_position: Option<(f64, f64)>,
    /// Window inner size in physical pixels.
    viewport: (u32, u32),

    /// Mouse buttons currently pressed.
    mouse_buttons: HashSet<MouseButton>,
    /// Mouse buttons pressed this frame.
    mouse_just_pressed: HashSet<MouseButton>,
    /// Mouse buttons released this frame.
    mouse_just_released: HashSet<MouseButton>,

    /// Mouse delta since last frame (for camera rotation).
    pub mouse_delta: (f64, f64),
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            cursor_position: None,
            viewport: (1280, 720),
            mouse_buttons: HashSet::new(),
            mouse_just_pressed: HashSet::new(),
            mouse_just_released: HashSet::new(),
            mouse_delta: (0.0, 0.0),
        }
    }
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input state for a viewport of the given size.
    pub fn with_viewport(width: u32, height: u32) -> Self {
        let mut state = Self::default();
        state.set_viewport(width, height);
        state
    }

    /// Process a window event to update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => self.set_viewport(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                self.set_cursor_position(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => self.cursor_position = None,
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.press_button(*button),
                ElementState::Released => self.release_button(*button),
            },
            _ => {}
        }
    }

    /// Handle device event (for mouse movement).
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.add_mouse_delta(delta.0, delta.1);
        }
    }

    /// Reset per-frame state (call at the start of each frame).
    pub fn begin_frame(&mut self) {
        self.mouse_just_pressed.clear();
        self.mouse_just_released.clear();
        self.mouse_delta = (0.0, 0.0);
    }

    /// Record a button press.
    pub fn press_button(&mut self, button: MouseButton) {
        if self.mouse_buttons.insert(button) {
            self.mouse_just_pressed.insert(button);
        }
    }

    /// Record a button release.
    pub fn release_button(&mut self, button: MouseButton) {
        self.mouse_buttons.remove(&button);
        self.mouse_just_released.insert(button);
    }

    /// Move the cursor to a pixel position inside the viewport.
    pub fn set_cursor_position(&mut self, x: f64, y: f64) {
        self.cursor_position = Some((x, y));
    }

    /// Place the cursor using normalized device coordinates (+Y up).
    pub fn set_cursor_ndc(&mut self, ndc: Vec2) {
        let (width, height) = self.viewport;
        let x = (f64::from(ndc.x) + 1.0) * 0.5 * f64::from(width);
        let y = (1.0 - f64::from(ndc.y)) * 0.5 * f64::from(height);
        self.cursor_position = Some((x, y));
    }

    /// Accumulate relative mouse motion.
    pub fn add_mouse_delta(&mut self, dx: f64, dy: f64) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    /// Update the viewport size; zero-sized viewports are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.viewport = (width, height);
        }
    }

    /// Viewport size in physical pixels.
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Cursor position in physical pixels, if known.
    pub fn cursor_position(&self) -> Option<(f64, f64)> {
        self.cursor_position
    }

    /// Cursor in normalized device coordinates (-1 to 1, +Y up).
    ///
    /// An unknown cursor reads as the screen center.
    pub fn cursor_ndc(&self) -> Vec2 {
        let Some((x, y)) = self.cursor_position else {
            return Vec2::ZERO;
        };
        let (width, height) = self.viewport;
        let ndc_x = (2.0 * x) / f64::from(width) - 1.0;
        let ndc_y = 1.0 - (2.0 * y) / f64::from(height); // Flip Y
        Vec2::new(ndc_x as f32, ndc_y as f32).clamp(Vec2::NEG_ONE, Vec2::ONE)
    }

    /// Check if a mouse button is currently pressed.
    pub fn mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    /// Check if a mouse button was just pressed this frame.
    pub fn mouse_button_just_pressed(&self, button: MouseButton) -> bool {
        self.mouse_just_pressed.contains(&button)
    }

    /// Check if a mouse button was just released this frame.
    pub fn mouse_button_just_released(&self, button: MouseButton) -> bool {
        self.mouse_just_released.contains(&button)
    }

    /// Whether `button` counts as held for this frame.
    ///
    /// A press and release that both land inside one frame still reads as
    /// active so that quick clicks are not lost between samples.
    pub fn mouse_button_active(&self, button: MouseButton) -> bool {
        self.mouse_button_pressed(button) || self.mouse_button_just_pressed(button)
    }
}

/// Snapshot of a tracked hand controller for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerState {
    /// World-space pose of the controller.
    pub pose: Pose,
    /// Whether the trigger is currently held.
    pub trigger_pressed: bool,
}

impl ControllerState {
    /// Controller at `pose` with the trigger released.
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            trigger_pressed: false,
        }
    }

    /// Same controller with the given trigger level.
    pub fn with_trigger(mut self, pressed: bool) -> Self {
        self.trigger_pressed = pressed;
        self
    }
}
