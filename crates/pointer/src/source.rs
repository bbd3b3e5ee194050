//! Input sources: where the pointing ray and the activation signal come from.
//!
//! Three interchangeable backends sit behind [`InputSource`]:
//!
//! - [`ScreenPointer`]: ray from the camera through the mouse cursor.
//! - [`SpatialController`]: ray along a tracked controller's forward axis.
//! - [`SimulatedController`]: a virtual controller posed from the mouse so the
//!   controller code path can be exercised on a desktop.
//!
//! The backend is picked once per session by [`InputMode::select`].

use crate::config::PointerSettings;
use glam::{EulerRot, Quat, Vec2};
use raypoint_camera::Camera;
use raypoint_core::{Pose, Ray};
use raypoint_input::{ControllerState, InputState, MouseButton};
use serde::Serialize;
use tracing::warn;

/// Which backend produces the pointing ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Mouse or touch cursor unprojected through the camera.
    ScreenPointer,
    /// Tracked hand controller.
    SpatialController,
    /// Mouse-driven stand-in for a hand controller.
    SimulatedController,
}

/// Hardware capabilities reported by the host at session start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceCaps {
    /// A tracked hand controller is available.
    pub tracked_controller: bool,
}

impl InputMode {
    /// Pick the backend for a session.
    pub fn select(caps: DeviceCaps, settings: &PointerSettings) -> Self {
        if caps.tracked_controller {
            InputMode::SpatialController
        } else if settings.mouse_simulates_controller {
            InputMode::SimulatedController
        } else {
            InputMode::ScreenPointer
        }
    }

    /// Stable lowercase label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::ScreenPointer => "screen_pointer",
            InputMode::SpatialController => "spatial_controller",
            InputMode::SimulatedController => "simulated_controller",
        }
    }
}

/// Everything the host hands to the pointer for one frame.
#[derive(Debug)]
pub struct Frame<'a> {
    /// Active camera. Mutable because mouse-follow rotates it.
    pub camera: &'a mut Camera,
    /// Mouse state for this frame.
    pub input: &'a InputState,
    /// Tracked controller, when one is connected this frame.
    pub controller: Option<&'a ControllerState>,
}

/// Turns a level signal into rising edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivationEdge {
    active: bool,
}

impl ActivationEdge {
    /// Feed the current level; returns true only on an off → on transition.
    pub fn update(&mut self, level: bool) -> bool {
        let rising = level && !self.active;
        self.active = level;
        rising
    }

    /// Whether the signal was on at the last update.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// A backend that yields a ray and an activation edge each frame.
pub trait InputSource {
    /// Backend kind.
    fn mode(&self) -> InputMode;

    /// Pointing ray for this frame, or `None` when the device is absent.
    fn ray(&self, frame: &Frame<'_>) -> Option<Ray>;

    /// True exactly on the frame the activation signal goes from off to on.
    fn activation_edge(&mut self, frame: &Frame<'_>) -> bool;
}

/// Build the backend for `mode`.
pub fn source_for(mode: InputMode, settings: &PointerSettings) -> Box<dyn InputSource> {
    match mode {
        InputMode::ScreenPointer => Box::new(ScreenPointer::default()),
        InputMode::SpatialController => Box::new(SpatialController::default()),
        InputMode::SimulatedController => Box::new(SimulatedController::from_settings(settings)),
    }
}

/// Ray from the camera through the mouse cursor.
#[derive(Debug)]
pub struct ScreenPointer {
    button: MouseButton,
    edge: ActivationEdge,
}

impl Default for ScreenPointer {
    fn default() -> Self {
        Self {
            button: MouseButton::Left,
            edge: ActivationEdge::default(),
        }
    }
}

impl InputSource for ScreenPointer {
    fn mode(&self) -> InputMode {
        InputMode::ScreenPointer
    }

    fn ray(&self, frame: &Frame<'_>) -> Option<Ray> {
        Some(frame.camera.screen_ray(frame.input.cursor_ndc()))
    }

    fn activation_edge(&mut self, frame: &Frame<'_>) -> bool {
        mouse_edge(&mut self.edge, frame.input, self.button)
    }
}

/// Ray along a tracked controller's forward axis, activated by its trigger.
#[derive(Debug, Default)]
pub struct SpatialController {
    edge: ActivationEdge,
    missing_reported: bool,
}

impl InputSource for SpatialController {
    fn mode(&self) -> InputMode {
        InputMode::SpatialController
    }

    fn ray(&self, frame: &Frame<'_>) -> Option<Ray> {
        frame
            .controller
            .map(|controller| controller.pose.forward_ray())
    }

    fn activation_edge(&mut self, frame: &Frame<'_>) -> bool {
        match frame.controller {
            Some(controller) => {
                self.missing_reported = false;
                self.edge.update(controller.trigger_pressed)
            }
            None => {
                if !self.missing_reported {
                    warn!("Tracked controller not reported this frame; pointer idle");
                    self.missing_reported = true;
                }
                // Forget the trigger level while the device is away.
                self.edge.update(false);
                false
            }
        }
    }
}

/// Virtual controller posed from the mouse cursor.
///
/// The controller sits a fixed distance in front of the camera. Cursor X/Y
/// map linearly to yaw/pitch offsets relative to the camera orientation, so a
/// centered cursor yields the camera's own forward ray.
#[derive(Debug)]
pub struct SimulatedController {
    yaw_range: f32,
    pitch_range: f32,
    forward_offset: f32,
    edge: ActivationEdge,
}

impl SimulatedController {
    /// Build from session settings.
    pub fn from_settings(settings: &PointerSettings) -> Self {
        Self {
            yaw_range: settings.simulated_yaw_range,
            pitch_range: settings.simulated_pitch_range,
            forward_offset: settings.simulated_forward_offset,
            edge: ActivationEdge::default(),
        }
    }

    /// Synthesized controller pose for a cursor at `ndc`.
    pub fn controller_pose(&self, camera: &Camera, ndc: Vec2) -> Pose {
        let offset = Quat::from_euler(
            EulerRot::YXZ,
            -ndc.x * self.yaw_range,
            ndc.y * self.pitch_range,
            0.0,
        );
        Pose::new(
            camera.position + camera.forward() * self.forward_offset,
            (camera.orientation() * offset).normalize(),
        )
    }
}

impl InputSource for SimulatedController {
    fn mode(&self) -> InputMode {
        InputMode::SimulatedController
    }

    fn ray(&self, frame: &Frame<'_>) -> Option<Ray> {
        let pose = self.controller_pose(&*frame.camera, frame.input.cursor_ndc());
        Some(pose.forward_ray())
    }

    fn activation_edge(&mut self, frame: &Frame<'_>) -> bool {
        mouse_edge(&mut self.edge, frame.input, MouseButton::Left)
    }
}

/// Every mouse-down reported this frame is an edge, even when the level
/// never dropped between samples (release and re-press inside one frame).
/// The latch only tracks the held level.
fn mouse_edge(edge: &mut ActivationEdge, input: &InputState, button: MouseButton) -> bool {
    let rising = edge.update(input.mouse_button_active(button));
    rising || input.mouse_button_just_pressed(button)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn edge_fires_once_per_press() {
        let mut edge = ActivationEdge::default();
        assert!(!edge.update(false));
        assert!(edge.update(true));
        assert!(!edge.update(true));
        assert!(!edge.update(true));
        assert!(!edge.update(false));
        assert!(edge.update(true));
        assert!(edge.is_active());
    }

    #[test]
    fn mode_selection_prefers_tracked_hardware() {
        let simulate = PointerSettings {
            mouse_simulates_controller: true,
            ..Default::default()
        };
        let tracked = DeviceCaps {
            tracked_controller: true,
        };

        assert_eq!(
            InputMode::select(tracked, &simulate),
            InputMode::SpatialController
        );
        assert_eq!(
            InputMode::select(DeviceCaps::default(), &simulate),
            InputMode::SimulatedController
        );
        assert_eq!(
            InputMode::select(DeviceCaps::default(), &PointerSettings::default()),
            InputMode::ScreenPointer
        );
    }

    #[test]
    fn simulated_controller_at_center_matches_camera_forward() {
        let mut camera = Camera::new(Vec3::new(0.0, 1.5, 0.0));
        camera.rotate(0.6, 0.2);
        let input = InputState::with_viewport(800, 600);
        let source = SimulatedController::from_settings(&PointerSettings::default());

        let frame = Frame {
            camera: &mut camera,
            input: &input,
            controller: None,
        };
        let ray = source.ray(&frame).unwrap();

        let forward = frame.camera.forward();
        assert!(approx(ray.direction, forward));
        // Origin sits on the camera's forward line.
        let offset = ray.origin - frame.camera.position;
        assert!(approx(offset, forward * 0.3));
    }

    #[test]
    fn simulated_controller_tilts_toward_cursor() {
        let camera = Camera::default();
        let source = SimulatedController::from_settings(&PointerSettings::default());

        let right_up = source.controller_pose(&camera, Vec2::new(1.0, 1.0)).forward();
        assert!(right_up.x > 0.0);
        assert!(right_up.y > 0.0);

        let yaw = right_up.x.atan2(-right_up.z);
        assert!((yaw - 0.5).abs() < 0.05);
    }

    #[test]
    fn spatial_controller_follows_device_pose() {
        let mut camera = Camera::default();
        let input = InputState::new();
        let controller = ControllerState::new(Pose::new(
            Vec3::new(0.2, 1.0, -0.3),
            Quat::from_rotation_x(-0.3),
        ))
        .with_trigger(true);
        let mut source = SpatialController::default();

        let frame = Frame {
            camera: &mut camera,
            input: &input,
            controller: Some(&controller),
        };
        let ray = source.ray(&frame).unwrap();
        assert_eq!(ray.origin, Vec3::new(0.2, 1.0, -0.3));
        assert!(ray.direction.y < 0.0);
        assert!(source.activation_edge(&frame));
        assert!(!source.activation_edge(&frame));
    }

    #[test]
    fn missing_controller_yields_no_ray_and_resets_edge() {
        let mut camera = Camera::default();
        let input = InputState::new();
        let held = ControllerState::new(Pose::default()).with_trigger(true);
        let mut source = SpatialController::default();

        {
            let frame = Frame {
                camera: &mut camera,
                input: &input,
                controller: Some(&held),
            };
            assert!(source.activation_edge(&frame));
        }
        {
            let frame = Frame {
                camera: &mut camera,
                input: &input,
                controller: None,
            };
            assert!(source.ray(&frame).is_none());
            assert!(!source.activation_edge(&frame));
        }
        let frame = Frame {
            camera: &mut camera,
            input: &input,
            controller: Some(&held),
        };
        // Reconnected while held: counts as a fresh press.
        assert!(source.activation_edge(&frame));
    }

    #[test]
    fn screen_pointer_clicks_on_mouse_down_edge() {
        let mut camera = Camera::default();
        let mut input = InputState::new();
        let mut source = ScreenPointer::default();

        input.press_button(MouseButton::Left);
        let frame = Frame {
            camera: &mut camera,
            input: &input,
            controller: None,
        };
        assert!(source.activation_edge(&frame));
        assert_eq!(source.ray(&frame).unwrap().origin, Vec3::ZERO);

        // Still held on the next frame.
        input.begin_frame();
        let frame = Frame {
            camera: &mut camera,
            input: &input,
            controller: None,
        };
        assert!(!source.activation_edge(&frame));
    }

    #[test]
    fn every_mouse_down_is_an_edge() {
        let mut camera = Camera::default();
        let mut input = InputState::new();
        let mut source = ScreenPointer::default();
        let mut edges = Vec::new();

        // Quick clicks on consecutive frames, then a hold that is released
        // and pressed again inside one frame. `true` presses, `false` releases.
        let frames: [&[bool]; 4] = [&[true, false], &[true, false], &[true], &[false, true]];
        for actions in frames {
            for &press in actions {
                if press {
                    input.press_button(MouseButton::Left);
                } else {
                    input.release_button(MouseButton::Left);
                }
            }
            let frame = Frame {
                camera: &mut camera,
                input: &input,
                controller: None,
            };
            edges.push(source.activation_edge(&frame));
            input.begin_frame();
        }
        assert_eq!(edges, vec![true, true, true, true]);
    }
}
