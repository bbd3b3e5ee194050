//! Ray intersection against primitive shapes.
//!
//! Shapes live in an object's local space. Callers transform the world ray
//! into local space with the inverse world transform; because the transform
//! is affine, the parameter `t` returned here is the distance along the
//! original unit-length world ray.

use glam::{Affine3A, Quat, Vec3};
use raypoint_core::Ray;

/// Geometry attached to a scene object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned box centered on the origin.
    Cuboid {
        /// Half the size along each axis.
        half_extents: Vec3,
    },
    /// Sphere centered on the origin.
    Sphere {
        /// Sphere radius.
        radius: f32,
    },
    /// Rectangle in the local XY plane, facing +Z.
    Quad {
        /// Extent along X.
        width: f32,
        /// Extent along Y.
        height: f32,
    },
}

impl Shape {
    /// Cube with the given edge length.
    pub fn cube(size: f32) -> Self {
        Self::Cuboid {
            half_extents: Vec3::splat(size * 0.5),
        }
    }

    /// Nearest positive hit parameter for a local-space ray.
    ///
    /// `dir` does not need to be normalized. Hits at or behind the origin are
    /// rejected. Starting inside a solid reports the exit point.
    pub fn intersect_local(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let t = match *self {
            Shape::Cuboid { half_extents } => intersect_box(origin, dir, half_extents)?,
            Shape::Sphere { radius } => intersect_sphere(origin, dir, radius)?,
            Shape::Quad { width, height } => intersect_quad(origin, dir, width, height)?,
        };
        (t > 0.0 && t.is_finite()).then_some(t)
    }

    /// Intersect a world-space ray with this shape placed by `world`.
    pub fn intersect(&self, world: &Affine3A, ray: &Ray) -> Option<f32> {
        if world.matrix3.determinant().abs() <= f32::EPSILON {
            return None;
        }
        let inverse = world.inverse();
        let origin = inverse.transform_point3(ray.origin);
        let dir = inverse.transform_vector3(ray.direction);
        self.intersect_local(origin, dir)
    }
}

fn intersect_box(origin: Vec3, dir: Vec3, half_extents: Vec3) -> Option<f32> {
    let inv_dir = dir.recip();

    let t1 = (-half_extents - origin) * inv_dir;
    let t2 = (half_extents - origin) * inv_dir;

    let tmin = t1.min(t2).max_element();
    let tmax = t1.max(t2).min_element();

    // Entire box behind the origin, or the ray misses it.
    if tmax <= 0.0 || tmin > tmax {
        return None;
    }

    Some(if tmin > 0.0 { tmin } else { tmax })
}

fn intersect_sphere(origin: Vec3, dir: Vec3, radius: f32) -> Option<f32> {
    let a = dir.length_squared();
    if a <= f32::EPSILON {
        return None;
    }
    let half_b = origin.dot(dir);
    let c = origin.length_squared() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let near = (-half_b - root) / a;
    if near > 0.0 {
        return Some(near);
    }
    let far = (-half_b + root) / a;
    (far > 0.0).then_some(far)
}

fn intersect_quad(origin: Vec3, dir: Vec3, width: f32, height: f32) -> Option<f32> {
    // Ray parallel to plane
    if dir.z.abs() < 1e-6 {
        return None;
    }
    let t = -origin.z / dir.z;
    if t <= 0.0 {
        return None;
    }
    let hit = origin + dir * t;
    (hit.x.abs() <= width * 0.5 && hit.y.abs() <= height * 0.5).then_some(t)
}

/// Local placement of a scene object relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Offset from the parent origin.
    pub translation: Vec3,
    /// Rotation relative to the parent.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Transform that only translates.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Affine matrix for this transform.
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_hit_from_outside() {
        let shape = Shape::cube(1.0);

        // Ray pointing at center from positive Z
        let hit = shape.intersect_local(Vec3::new(0.0, 0.0, 2.0), Vec3::NEG_Z);
        assert!((hit.unwrap() - 1.5).abs() < 1e-4);

        // Ray missing the box
        let miss = shape.intersect_local(Vec3::new(2.0, 0.0, 2.0), Vec3::NEG_Z);
        assert!(miss.is_none());
    }

    #[test]
    fn box_behind_origin_is_ignored() {
        let shape = Shape::cube(1.0);
        assert!(shape
            .intersect_local(Vec3::new(0.0, 0.0, 2.0), Vec3::Z)
            .is_none());
    }

    #[test]
    fn box_hit_from_inside_reports_exit() {
        let shape = Shape::cube(2.0);
        let hit = shape.intersect_local(Vec3::ZERO, Vec3::X).unwrap();
        assert!((hit - 1.0).abs() < 1e-4);
    }

    #[test]
    fn sphere_hit_and_miss() {
        let shape = Shape::Sphere { radius: 1.0 };
        let hit = shape.intersect_local(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!((hit.unwrap() - 4.0).abs() < 1e-4);

        let miss = shape.intersect_local(Vec3::new(0.0, 2.0, 5.0), Vec3::NEG_Z);
        assert!(miss.is_none());
    }

    #[test]
    fn quad_hit_respects_extent() {
        let shape = Shape::Quad {
            width: 2.0,
            height: 1.0,
        };
        let hit = shape.intersect_local(Vec3::new(0.9, 0.4, 3.0), Vec3::NEG_Z);
        assert!((hit.unwrap() - 3.0).abs() < 1e-4);

        let miss = shape.intersect_local(Vec3::new(0.0, 0.6, 3.0), Vec3::NEG_Z);
        assert!(miss.is_none());

        let parallel = shape.intersect_local(Vec3::new(0.0, 0.0, 3.0), Vec3::X);
        assert!(parallel.is_none());
    }

    #[test]
    fn world_transform_reports_world_distance() {
        // Unit cube scaled to 2 units and pushed 5 units down -Z.
        let transform = Transform {
            translation: Vec3::new(0.0, 0.0, -5.0),
            rotation: Quat::from_rotation_y(0.7),
            scale: Vec3::splat(2.0),
        };
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hit = Shape::Sphere { radius: 0.5 }
            .intersect(&transform.to_affine(), &ray)
            .unwrap();
        // Scaled radius is 1.0, so the front surface sits at z = -4.
        assert!((hit - 4.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_scale_never_hits() {
        let transform = Transform {
            scale: Vec3::new(1.0, 0.0, 1.0),
            ..Transform::from_translation(Vec3::new(0.0, 0.0, -3.0))
        };
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(Shape::cube(1.0)
            .intersect(&transform.to_affine(), &ray)
            .is_none());
    }
}
