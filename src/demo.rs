//! The demo scene: one clickable cube that changes colour on pointer events.

use crate::config::AppConfig;
use glam::{Quat, Vec3};
use raypoint_camera::Camera;
use raypoint_core::ObjectId;
use raypoint_pointer::{
    IntersectionFilter, Pointer, PointerConfig, PointerEventKind, SceneGraph, SceneObject, Shape,
};
use std::cell::Cell;
use std::rc::Rc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeColour {
    White,
    Green,
    Red,
}

impl CubeColour {
    pub fn as_str(&self) -> &'static str {
        match self {
            CubeColour::White => "white",
            CubeColour::Green => "green",
            CubeColour::Red => "red",
        }
    }
}

pub struct DemoScene {
    pub scene: SceneGraph,
    pub cube: ObjectId,
    colour: Rc<Cell<CubeColour>>,
    spin: f32,
}

impl DemoScene {
    pub fn build(config: &AppConfig) -> Self {
        let mut scene = SceneGraph::new();
        // Camera sits at z = 0, so push the cube back to where it can be seen.
        let cube = scene.add(
            SceneObject::new("cube")
                .with_shape(Shape::cube(1.0))
                .with_position(Vec3::new(0.0, 1.5, -5.0))
                .with_flag(config.clickable_flag.clone()),
        );
        scene.add(
            SceneObject::new("floor")
                .with_shape(Shape::Quad {
                    width: 40.0,
                    height: 40.0,
                })
                .with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
        );

        Self {
            scene,
            cube,
            colour: Rc::new(Cell::new(CubeColour::White)),
            spin: config.cube_spin,
        }
    }

    /// Camera at eye height looking down -Z.
    pub fn camera(config: &AppConfig) -> Camera {
        let mut camera = Camera::new(Vec3::new(0.0, config.camera_height, 0.0));
        camera.set_aspect(config.window_width, config.window_height);
        camera
    }

    pub fn pointer_config(config: &AppConfig) -> PointerConfig {
        PointerConfig::new(config.pointer.clone())
            .with_filter(IntersectionFilter::flag(config.clickable_flag.clone()))
    }

    /// Wire the cube's colour changes to the session.
    pub fn attach(&self, pointer: &Pointer) {
        let colour = self.colour.clone();
        pointer.on(self.cube, PointerEventKind::Click, move |_| {
            info!("clicking on the cube");
            colour.set(CubeColour::Red);
            Ok(())
        });
        let colour = self.colour.clone();
        pointer.on(self.cube, PointerEventKind::Enter, move |_| {
            info!("entering the cube");
            colour.set(CubeColour::Green);
            Ok(())
        });
        let colour = self.colour.clone();
        pointer.on(self.cube, PointerEventKind::Exit, move |_| {
            info!("exiting the cube");
            colour.set(CubeColour::White);
            Ok(())
        });
    }

    /// Per-frame animation.
    pub fn animate(&mut self) {
        if let Some(cube) = self.scene.get_mut(self.cube) {
            cube.transform.rotation = Quat::from_rotation_y(self.spin) * cube.transform.rotation;
        }
    }

    pub fn cube_colour(&self) -> CubeColour {
        self.colour.get()
    }

    pub fn name_of(&self, id: ObjectId) -> &str {
        self.scene
            .get(id)
            .map(|object| object.name.as_str())
            .unwrap_or("<removed>")
    }
}
