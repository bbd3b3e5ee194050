use glam::{EulerRot, Quat, Vec2, Vec3};
use raypoint_core::Pose;
use raypoint_input::{ControllerState, InputState, MouseButton};
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Deserialize)]
struct ScriptedInputFile {
    steps: Vec<ScriptedStep>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ScriptedStep {
    /// Seconds this step stays active.
    duration: f32,
    /// Cursor in normalized device coordinates.
    #[serde(default)]
    cursor_x: f32,
    #[serde(default)]
    cursor_y: f32,
    #[serde(default)]
    press: bool,
    /// Relative mouse motion applied on every frame of the step.
    #[serde(default)]
    look_x: f32,
    #[serde(default)]
    look_y: f32,
    #[serde(default)]
    controller: Option<ScriptedController>,
}

#[derive(Debug, Clone, Deserialize)]
struct ScriptedController {
    position: [f32; 3],
    #[serde(default)]
    yaw: f32,
    #[serde(default)]
    pitch: f32,
    #[serde(default)]
    trigger: bool,
}

impl ScriptedController {
    fn state(&self) -> ControllerState {
        let orientation = Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0);
        ControllerState::new(Pose::new(Vec3::from_array(self.position), orientation))
            .with_trigger(self.trigger)
    }
}

pub struct ScriptedInputPlayer {
    steps: Vec<ScriptedStep>,
    index: usize,
    time_in_step: f32,
    finished: bool,
}

impl ScriptedInputPlayer {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let file: ScriptedInputFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            anyhow::bail!("scripted input file contains no steps");
        }
        Ok(Self {
            steps: file.steps,
            index: 0,
            time_in_step: 0.0,
            finished: false,
        })
    }

    /// Hover the demo cube, look away, come back and click it, then release.
    pub fn builtin() -> Self {
        let steps = vec![
            ScriptedStep {
                duration: 0.5,
                ..Default::default()
            },
            ScriptedStep {
                duration: 0.5,
                cursor_x: 0.9,
                ..Default::default()
            },
            ScriptedStep {
                duration: 0.25,
                press: true,
                ..Default::default()
            },
            ScriptedStep {
                duration: 0.25,
                ..Default::default()
            },
        ];
        Self {
            steps,
            index: 0,
            time_in_step: 0.0,
            finished: false,
        }
    }

    /// Whether any step reports a tracked controller.
    pub fn uses_controller(&self) -> bool {
        self.steps.iter().any(|step| step.controller.is_some())
    }

    /// True once the last step has run for its full duration.
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Advance by `dt` seconds and apply the active step to `input`.
    ///
    /// Returns the scripted controller for this frame, if the step has one.
    pub fn advance(&mut self, dt: f32, input: &mut InputState) -> Option<ControllerState> {
        self.time_in_step += dt;
        while self.time_in_step >= self.steps[self.index].duration {
            self.time_in_step -= self.steps[self.index].duration;
            if self.index + 1 < self.steps.len() {
                self.index += 1;
            } else {
                self.time_in_step = 0.0;
                self.finished = true;
                break;
            }
        }

        let step = &self.steps[self.index];
        input.set_cursor_ndc(Vec2::new(step.cursor_x, step.cursor_y));
        if step.press {
            input.press_button(MouseButton::Left);
        } else if input.mouse_button_pressed(MouseButton::Left) {
            input.release_button(MouseButton::Left);
        }
        if step.look_x != 0.0 || step.look_y != 0.0 {
            input.add_mouse_delta(f64::from(step.look_x), f64::from(step.look_y));
        }
        step.controller.as_ref().map(ScriptedController::state)
    }
}
