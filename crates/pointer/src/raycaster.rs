//! Nearest-hit selection over the scene index.

use crate::config::IntersectionFilter;
use crate::scene::SceneIndex;
use glam::Vec3;
use raypoint_core::{ObjectId, Ray};

/// Result of a successful raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// The filtered candidate that was hit (possibly through a descendant).
    pub object: ObjectId,
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// World-space position of the hit point.
    pub point: Vec3,
}

/// Casts a ray against every filtered candidate and keeps the nearest hit.
#[derive(Debug, Clone, Copy)]
pub struct Raycaster {
    max_distance: f32,
}

impl Default for Raycaster {
    fn default() -> Self {
        Self {
            max_distance: f32::INFINITY,
        }
    }
}

impl Raycaster {
    /// Raycaster that ignores hits beyond `max_distance`.
    pub fn with_max_distance(max_distance: f32) -> Self {
        Self { max_distance }
    }

    /// Nearest hit strictly in front of the ray origin.
    ///
    /// Candidates are visited in scene traversal order and a later candidate
    /// only replaces the current best when it is strictly nearer, so among
    /// equidistant hits the first one enumerated wins.
    pub fn cast<S>(&self, scene: &S, ray: &Ray, filter: &IntersectionFilter) -> Option<RaycastHit>
    where
        S: SceneIndex + ?Sized,
    {
        let mut best: Option<(ObjectId, f32)> = None;
        scene.for_each_candidate(filter, &mut |id| {
            let Some(distance) = scene.intersect(id, ray) else {
                return;
            };
            if !(distance > 0.0 && distance <= self.max_distance) {
                return;
            }
            if best.map_or(true, |(_, nearest)| distance < nearest) {
                best = Some((id, distance));
            }
        });

        best.map(|(object, distance)| RaycastHit {
            object,
            distance,
            point: ray.at(distance),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;
    use crate::scene::{SceneGraph, SceneObject};

    fn cube_at(name: &str, z: f32) -> SceneObject {
        SceneObject::new(name)
            .with_shape(Shape::cube(1.0))
            .with_position(Vec3::new(0.0, 0.0, z))
    }

    fn forward_ray() -> Ray {
        Ray::new(Vec3::ZERO, Vec3::NEG_Z)
    }

    #[test]
    fn empty_scene_has_no_hit() {
        let scene = SceneGraph::new();
        let hit = Raycaster::default().cast(&scene, &forward_ray(), &IntersectionFilter::all());
        assert!(hit.is_none());
    }

    #[test]
    fn nearest_candidate_wins() {
        let mut scene = SceneGraph::new();
        scene.add(cube_at("far", -10.0));
        let near = scene.add(cube_at("near", -4.0));

        let hit = Raycaster::default()
            .cast(&scene, &forward_ray(), &IntersectionFilter::all())
            .unwrap();
        assert_eq!(hit.object, near);
        assert!((hit.distance - 3.5).abs() < 1e-4);
        assert!((hit.point - Vec3::new(0.0, 0.0, -3.5)).length() < 1e-4);
    }

    #[test]
    fn filtered_out_objects_do_not_occlude() {
        let mut scene = SceneGraph::new();
        scene.add(cube_at("wall", -2.0));
        let target = scene.add(cube_at("target", -6.0).with_flag("clickable"));

        let hit = Raycaster::default()
            .cast(&scene, &forward_ray(), &IntersectionFilter::flag("clickable"))
            .unwrap();
        assert_eq!(hit.object, target);
    }

    #[test]
    fn equidistant_hits_resolve_to_traversal_order() {
        let mut scene = SceneGraph::new();
        let first = scene.add(cube_at("first", -5.0));
        scene.add(cube_at("second", -5.0));

        for _ in 0..3 {
            let hit = Raycaster::default()
                .cast(&scene, &forward_ray(), &IntersectionFilter::all())
                .unwrap();
            assert_eq!(hit.object, first);
        }
    }

    #[test]
    fn objects_behind_origin_are_ignored() {
        let mut scene = SceneGraph::new();
        scene.add(cube_at("behind", 5.0));
        let hit = Raycaster::default().cast(&scene, &forward_ray(), &IntersectionFilter::all());
        assert!(hit.is_none());
    }

    #[test]
    fn max_distance_limits_hits() {
        let mut scene = SceneGraph::new();
        scene.add(cube_at("far", -20.0));
        let hit =
            Raycaster::with_max_distance(10.0).cast(&scene, &forward_ray(), &IntersectionFilter::all());
        assert!(hit.is_none());
    }

    #[test]
    fn parent_is_reported_for_descendant_hit() {
        let mut scene = SceneGraph::new();
        let group = scene.add(
            SceneObject::new("group")
                .with_flag("clickable")
                .with_position(Vec3::new(0.0, 0.0, -5.0)),
        );
        scene
            .add_child(group, SceneObject::new("mesh").with_shape(Shape::cube(1.0)))
            .unwrap();

        let hit = Raycaster::default()
            .cast(&scene, &forward_ray(), &IntersectionFilter::flag("clickable"))
            .unwrap();
        assert_eq!(hit.object, group);
    }
}
