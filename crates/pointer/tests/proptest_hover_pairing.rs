//! Property tests for hover pairing and click edges
//!
//! A scripted scene answers each tick with a chosen hit (or miss) so that
//! arbitrary raycast sequences can be driven through a real session.

use proptest::prelude::*;
use raypoint_camera::Camera;
use raypoint_core::{ObjectId, Ray};
use raypoint_input::{InputState, MouseButton};
use raypoint_pointer::{
    DeviceCaps, Frame, IntersectionFilter, Pointer, PointerConfig, PointerEventKind, SceneIndex,
};
use std::cell::Cell;

const OBJECTS: u64 = 4;

#[derive(Default)]
struct ScriptedScene {
    hit: Cell<Option<ObjectId>>,
}

impl SceneIndex for ScriptedScene {
    fn for_each_candidate(&self, _filter: &IntersectionFilter, visit: &mut dyn FnMut(ObjectId)) {
        for id in 0..OBJECTS {
            visit(ObjectId(id));
        }
    }

    fn contains(&self, id: ObjectId) -> bool {
        id.0 < OBJECTS
    }

    fn intersect(&self, id: ObjectId, _ray: &Ray) -> Option<f32> {
        (self.hit.get() == Some(id)).then_some(1.0)
    }
}

fn hit_strategy() -> impl Strategy<Value = Option<ObjectId>> {
    prop::option::of((0..OBJECTS).prop_map(ObjectId))
}

/// What the mouse button does during one frame.
#[derive(Debug, Clone, Copy)]
enum Button {
    Up,
    Down,
    /// Press and release inside the frame.
    Tap,
    /// Release and press again inside the frame.
    Repress,
}

impl Button {
    fn apply(self, input: &mut InputState) {
        match self {
            Button::Up => input.release_button(MouseButton::Left),
            Button::Down => input.press_button(MouseButton::Left),
            Button::Tap => {
                input.press_button(MouseButton::Left);
                input.release_button(MouseButton::Left);
            }
            Button::Repress => {
                input.release_button(MouseButton::Left);
                input.press_button(MouseButton::Left);
            }
        }
    }

    /// Whether a new mouse-down arrives this frame, given the held level
    /// before it. Returns the new held level alongside.
    fn mouse_down(self, held: bool) -> (bool, bool) {
        match self {
            Button::Up => (false, false),
            Button::Down => (!held, true),
            Button::Tap => (!held, false),
            Button::Repress => (true, true),
        }
    }
}

fn button_strategy() -> impl Strategy<Value = Button> {
    prop_oneof![
        Just(Button::Up),
        Just(Button::Down),
        Just(Button::Tap),
        Just(Button::Repress),
    ]
}

fn run(steps: &[(Option<ObjectId>, Button)]) -> Vec<(PointerEventKind, ObjectId)> {
    let scene = ScriptedScene::default();
    let mut pointer = Pointer::new(PointerConfig::default(), DeviceCaps::default()).unwrap();
    let mut camera = Camera::default();
    let mut input = InputState::new();
    let mut log = Vec::new();

    for (tick, &(hit, button)) in steps.iter().enumerate() {
        scene.hit.set(hit);
        button.apply(&mut input);
        let report = pointer.tick(
            tick as f64 * 16.0,
            &scene,
            Frame {
                camera: &mut camera,
                input: &input,
                controller: None,
            },
        );
        log.extend(report.events.iter().map(|e| (e.kind, e.target)));
        input.begin_frame();
    }
    log
}

proptest! {
    /// Property: enters and exits alternate per object, and only one object
    /// is ever hovered at a time
    #[test]
    fn enter_exit_pairing(steps in prop::collection::vec((hit_strategy(), button_strategy()), 0..64)) {
        let log = run(&steps);
        let mut hovered: Option<ObjectId> = None;
        for (kind, target) in log {
            match kind {
                PointerEventKind::Enter => {
                    prop_assert_eq!(hovered, None, "enter({}) while another is hovered", target);
                    hovered = Some(target);
                }
                PointerEventKind::Exit => {
                    prop_assert_eq!(hovered, Some(target));
                    hovered = None;
                }
                PointerEventKind::Click => {
                    prop_assert_eq!(hovered, Some(target));
                }
            }
        }
        prop_assert_eq!(hovered, steps.last().and_then(|&(hit, _)| hit));
    }

    /// Property: one click per mouse-down that lands on a hovered object
    #[test]
    fn clicks_follow_mouse_downs(steps in prop::collection::vec((hit_strategy(), button_strategy()), 0..64)) {
        let log = run(&steps);
        let mut expected = Vec::new();
        let mut held = false;
        for &(hit, button) in &steps {
            let (down, now_held) = button.mouse_down(held);
            if down {
                if let Some(target) = hit {
                    expected.push(target);
                }
            }
            held = now_held;
        }
        let clicks: Vec<ObjectId> = log
            .into_iter()
            .filter(|(kind, _)| *kind == PointerEventKind::Click)
            .map(|(_, target)| target)
            .collect();
        prop_assert_eq!(clicks, expected);
    }

    /// Property: repeating the same hit emits nothing after the first tick
    #[test]
    fn repeated_hits_are_silent(hit in hit_strategy(), repeats in 2usize..10) {
        let steps = vec![(hit, Button::Up); repeats];
        let log = run(&steps);
        prop_assert_eq!(log.len(), usize::from(hit.is_some()));
    }
}
