#![warn(missing_docs)]
//! Device-agnostic pointer interaction over a 3D scene.
//!
//! A [`Pointer`] session turns either a 2D screen cursor or a tracked hand
//! controller into a ray, finds the nearest eligible scene object, and emits
//! three normalized events addressed to that object:
//!
//! - **enter** when it becomes the hovered object,
//! - **exit** when it stops being hovered (including when it disappears from
//!   the scene or the session ends),
//! - **click** when the activation signal rises while it is hovered.
//!
//! # Example
//!
//! ```rust
//! use glam::Vec3;
//! use raypoint_camera::Camera;
//! use raypoint_input::InputState;
//! use raypoint_pointer::{
//!     DeviceCaps, Frame, IntersectionFilter, Pointer, PointerConfig, PointerEventKind,
//!     SceneGraph, SceneObject, Shape,
//! };
//!
//! let mut scene = SceneGraph::new();
//! let cube = scene.add(
//!     SceneObject::new("cube")
//!         .with_shape(Shape::cube(1.0))
//!         .with_position(Vec3::new(0.0, 0.0, -5.0))
//!         .with_flag("clickable"),
//! );
//!
//! let config = PointerConfig::default().with_filter(IntersectionFilter::flag("clickable"));
//! let mut pointer = Pointer::new(config, DeviceCaps::default()).unwrap();
//! pointer.on(cube, PointerEventKind::Enter, |event| {
//!     println!("entered {}", event.target);
//!     Ok(())
//! });
//!
//! let mut camera = Camera::default();
//! let input = InputState::new();
//! let report = pointer.tick(
//!     16.0,
//!     &scene,
//!     Frame { camera: &mut camera, input: &input, controller: None },
//! );
//! assert_eq!(report.events[0].kind, PointerEventKind::Enter);
//! ```

pub mod click;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod hover;
pub mod pointer;
pub mod raycaster;
pub mod scene;
pub mod source;

// Re-export commonly used types
pub use click::ClickTrigger;
pub use config::{IntersectionFilter, PointerConfig, PointerSettings};
pub use error::PointerError;
pub use events::{
    DispatchReport, EventDispatcher, HandlerFailure, ListenerId, PointerEvent, PointerEventKind,
};
pub use geometry::{Shape, Transform};
pub use hover::{HoverEvent, HoverTracker};
pub use pointer::{Pointer, TickReport};
pub use raycaster::{RaycastHit, Raycaster};
pub use scene::{Intersectable, SceneGraph, SceneIndex, SceneObject};
pub use source::{
    ActivationEdge, DeviceCaps, Frame, InputMode, InputSource, ScreenPointer,
    SimulatedController, SpatialController,
};
